mod common;

use blimp_internal::pulse::{PolledPulseIn, PulseIn};
use common::{ScriptedPin, SteppingClock};

fn pulse_source(high: Vec<(u32, u32)>) -> PolledPulseIn<ScriptedPin, SteppingClock> {
    let clock = SteppingClock::new(10);
    let pin = ScriptedPin {
        now_us: clock.now_us.clone(),
        high,
    };
    PolledPulseIn::new(pin, clock)
}

#[test]
pub fn measures_the_next_high_pulse() {
    let mut pulse = pulse_source(vec![(100, 1100)]);
    assert_eq!(pulse.pulse_in_us(10_000), 1000);
}

#[test]
pub fn skips_a_pulse_already_in_progress() {
    let mut pulse = pulse_source(vec![(0, 50), (200, 500)]);
    assert_eq!(pulse.pulse_in_us(10_000), 300);
}

#[test]
pub fn times_out_without_a_pulse() {
    let mut pulse = pulse_source(vec![]);
    assert_eq!(pulse.pulse_in_us(1_000), 0);
}

#[test]
pub fn times_out_on_a_stuck_high_line() {
    let mut pulse = pulse_source(vec![(0, u32::MAX)]);
    assert_eq!(pulse.pulse_in_us(1_000), 0);
}
