use embedded_hal::digital::v2::InputPin;

/// Free running time since power on. Both counters wrap, compare them with `wrapping_sub`
pub trait Clock {
    fn millis(&self) -> u32;
    fn micros(&self) -> u32;
}

/// Measures the length of a high pulse
pub trait PulseIn {
    /// Width of the next high pulse in microseconds, or 0 if no complete pulse arrived within `timeout_us`
    fn pulse_in_us(&mut self, timeout_us: u32) -> u32;
}

/// [PulseIn] by busy polling an input pin against a microsecond [Clock]
pub struct PolledPulseIn<P: InputPin, C: Clock> {
    pin: P,
    clock: C,
}

impl<P: InputPin, C: Clock> PolledPulseIn<P, C> {
    pub fn new(pin: P, clock: C) -> Self {
        Self { pin, clock }
    }
    fn is_high(&self) -> bool {
        self.pin.is_high().unwrap_or(false)
    }
    /// Spins while the pin reads `level`. False if the deadline passed first
    fn wait_while(&self, level: bool, start: u32, timeout_us: u32) -> bool {
        while self.is_high() == level {
            if self.clock.micros().wrapping_sub(start) > timeout_us {
                return false;
            }
        }
        true
    }
}

impl<P: InputPin, C: Clock> PulseIn for PolledPulseIn<P, C> {
    fn pulse_in_us(&mut self, timeout_us: u32) -> u32 {
        let start = self.clock.micros();
        // A pulse already in progress would be measured short, let it finish
        if !self.wait_while(true, start, timeout_us) {
            return 0;
        }
        if !self.wait_while(false, start, timeout_us) {
            return 0;
        }
        let rising = self.clock.micros();
        if !self.wait_while(true, start, timeout_us) {
            return 0;
        }
        self.clock.micros().wrapping_sub(rising)
    }
}
