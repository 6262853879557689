use embedded_hal::{blocking::delay::DelayMs, digital::v2::OutputPin};

use crate::{pulse::PulseIn, MAXSONAR_REFRESH_INTERVAL_MS};

/// Time the sensor needs after its RX line is cycled before the first reading
pub const MAXSONAR_SETTLE_MS: u16 = 1000;
/// Time between raising RX and the start of the echo pulse
pub const MAXSONAR_PING_DELAY_MS: u16 = 37;
/// Longest we wait for an echo pulse
pub const MAXSONAR_ECHO_TIMEOUT_US: u32 = 200_000;
/// Pulse width scale of the PW output, 147us per inch
pub const MAXSONAR_US_PER_INCH: u32 = 147;

/// A rate limited range source. A distance of 0 means there is no valid reading
pub trait Ranging {
    /// Measures if the last reading is older than the refresh interval. May block
    fn update(&mut self, now_ms: u32);
    /// The last stored distance, never measures
    fn distance(&self) -> u32;
}

/// MaxSonar read through its pulse width output. The RX line doubles as the reset line during
/// initialization and as the ping line for each measurement.
pub struct MaxSonar<P: PulseIn, R: OutputPin, D: DelayMs<u16>> {
    pulse_width: P,
    rx: R,
    delay: D,
    initialized: bool,
    last_reading_ms: u32,
    last_distance: u32,
}

impl<P: PulseIn, R: OutputPin, D: DelayMs<u16>> MaxSonar<P, R, D> {
    pub fn new(pulse_width: P, rx: R, delay: D) -> Self {
        Self {
            pulse_width,
            rx,
            delay,
            initialized: false,
            last_reading_ms: 0,
            last_distance: 0,
        }
    }

    /// Cycles the RX line and waits for the sensor to settle, only the first time it is called.
    /// Returns true if this call did the initialization
    pub fn initialize_once(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.last_distance = 0;
        let _ = self.rx.set_high();
        let _ = self.rx.set_low();
        let _ = self.rx.set_high();
        self.delay.delay_ms(MAXSONAR_SETTLE_MS);
        self.initialized = true;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn last_reading_ms(&self) -> u32 {
        self.last_reading_ms
    }

    /// Pings the sensor and converts the echo to inches. Blocks for up to ~237ms
    fn measure(&mut self) -> u32 {
        let _ = self.rx.set_high();
        self.delay.delay_ms(MAXSONAR_PING_DELAY_MS);
        let pulse_us = self.pulse_width.pulse_in_us(MAXSONAR_ECHO_TIMEOUT_US);
        let _ = self.rx.set_low();
        pulse_us / MAXSONAR_US_PER_INCH
    }
}

impl<P: PulseIn, R: OutputPin, D: DelayMs<u16>> Ranging for MaxSonar<P, R, D> {
    fn update(&mut self, now_ms: u32) {
        self.initialize_once();

        if now_ms.wrapping_sub(self.last_reading_ms) > MAXSONAR_REFRESH_INTERVAL_MS {
            self.last_distance = self.measure();
            self.last_reading_ms = now_ms;
        }
    }

    fn distance(&self) -> u32 {
        self.last_distance
    }
}
