//! Onboard flight control for the Blimpduino, a small indoor blimp built around an
//! [Arduino Uno R3's](https://store-usa.arduino.cc/products/arduino-uno-rev3?selectedStore=us)
//! [Atmega328p](https://www.microchip.com/en-us/product/ATmega328P).
//!
//! It is highly recommended to familiarize yourself with the following crates:
//! * [arduino_hal](https://rahix.github.io/avr-hal/arduino_hal/index.html)
//! * [embedded_hal](https://docs.rs/embedded_hal/latest/embedded_hal)
//! * [ufmt](https://docs.rs/ufmt/latest/ufmt)
//!
//! Every driver in this crate is written against the [embedded_hal] traits so the flight logic can be
//! exercised on a desktop with `cargo test`. The Arduino specific pieces ([timer], the Timer1 servo and
//! [board]) and the `blimpduino` binary only exist with the `arduino` feature enabled.
//!
//! NOTE: The `blimpduino` binary should ONLY EVER BE RUN IN RELEASE MODE.
//! `cargo run --release --features arduino --bin blimpduino`

#![no_std]
#![cfg_attr(feature = "arduino", feature(abi_avr_interrupt))]

/// Top speed a motor can be commanded to. This is also the PWM duty handed to the L293D
pub const MAX_SPEED: u8 = 127;
/// Minimum spacing between two autopilot evaluations
pub const AUTOPILOT_UPDATE_INTERVAL_MS: u32 = 500;
/// Minimum spacing between two MaxSonar measurements
pub const MAXSONAR_REFRESH_INTERVAL_MS: u32 = 500;
/// Rudder deflections at or beyond this angle reverse the inner motor
pub const HARD_TURN_DEFLECTION: u8 = 45;
/// The baud rate of the command link (XBee or USB)
pub const SERIAL_BAUD: u32 = 19200;
/// Autopilot thrust is `MAX_SPEED / AUTOPILOT_THRUST_FACTOR`
#[cfg(feature = "compass")]
pub const AUTOPILOT_THRUST_FACTOR: u8 = 6;
/// Autopilot thrust is `MAX_SPEED / AUTOPILOT_THRUST_FACTOR`
#[cfg(not(feature = "compass"))]
pub const AUTOPILOT_THRUST_FACTOR: u8 = 10;

/// Static configuration of one airframe variant, handed to [flightctl::FlightController::new]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlimpConfig {
    pub thrust_factor: u8,
    pub compass_installed: bool,
    pub autopilot_interval_ms: u32,
}

impl BlimpConfig {
    /// The variant selected by the `compass` feature
    pub const DEFAULT: Self = Self {
        thrust_factor: AUTOPILOT_THRUST_FACTOR,
        compass_installed: cfg!(feature = "compass"),
        autopilot_interval_ms: AUTOPILOT_UPDATE_INTERVAL_MS,
    };
    /// The plain airframe: IR beacon following only
    pub const IR_ONLY: Self = Self {
        thrust_factor: 10,
        compass_installed: false,
        autopilot_interval_ms: AUTOPILOT_UPDATE_INTERVAL_MS,
    };
    /// The airframe carrying an HMC6352
    pub const WITH_COMPASS: Self = Self {
        thrust_factor: 6,
        compass_installed: true,
        autopilot_interval_ms: AUTOPILOT_UPDATE_INTERVAL_MS,
    };

    /// Speed used by the autopilot when it pivots the blimp
    pub fn autopilot_thrust(&self) -> u8 {
        MAX_SPEED / self.thrust_factor.max(1)
    }
}

impl Default for BlimpConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Decoded remote commands and the line tokenizer that produces them
pub mod command;

/// Converts throttle and rudder commands into left and right motor commands
pub mod mixer;

/// Maps elevator commands onto the thrust vectoring servo
pub mod elevator;

/// Classifies the four IR detectors into a single beacon direction
pub mod ir;

/// Pulse width measurement used by the range finder
pub mod pulse;

/// This module contains the driver firmware for the [Maxbotix MaxSonar](https://maxbotix.com) ultrasonic range finder
pub mod maxsonar;

/// This module contains the driver firmware for the Honeywell HMC6352 digital compass
pub mod hmc6352;

/// Aggregates every onboard instrument into a [instruments::SensorSnapshot]
pub mod instruments;

/// The IR follow and compass hold state machine
pub mod autopilot;

/// This module drives one half of a [Texas Instruments L293D](https://www.ti.com/product/L293D) motor controller
pub mod l293;

/// This module provides the thrust vectoring servo seam and, on the Arduino, a Timer1 backed servo
pub mod servo;

/// The flight controller aggregate and its command dispatcher
pub mod flightctl;

/// This module provides a convenience wrapper around the 8 and 16 bit timers in the Atmega328p
#[cfg(feature = "arduino")]
pub mod timer;

/// Pin wiring, the millisecond clock and the battery monitor of the Blimpduino board
#[cfg(feature = "arduino")]
pub mod board;
