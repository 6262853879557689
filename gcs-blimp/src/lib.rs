//! GCS-Blimp is the ground side of the Blimpduino and runs on Linux or Windows.
//!
//! It is highly recommended to familiarize yourself with the following crates:
//! * [Tokio](https://docs.rs/tokio/latest/tokio)
//! * [Flume](https://docs.rs/flume/latest/flume)
//! * [Serialport](https://docs.rs/serialport/latest/serialport)
//!
//! Commands typed on stdin are tokenized with the same parser the firmware uses, so a typo never
//! reaches the blimp. They are then either written to the XBee/USB serial link ([link]) or handed
//! to a [blimp_internal::flightctl::FlightController] flying a simulated airframe ([sim]).
//!
//! Blocking work (the serial port and the simulation loop) lives on plain threads. It talks to the
//! async side over [flume] channels, which can be used from both worlds.
//!
//! Set `RUST_LOG=debug` to see every command as it is sent.

/// Reads and tokenizes commands from stdin
pub mod console;
/// This module contains the serial link to a real blimp
pub mod link;
/// This module contains the simulated airframe and the loop that flies it
pub mod sim;
