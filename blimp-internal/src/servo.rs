use crate::elevator::ServoAngle;

/// Pulse width at 0 degrees
pub const SERVO_MIN_PULSE_US: u32 = 1_000;
/// Pulse width at [SERVO_SWING_DEGREES]
pub const SERVO_MAX_PULSE_US: u32 = 2_000;
/// Mechanical travel covered by the min to max pulse range
pub const SERVO_SWING_DEGREES: u32 = 180;

/// The thrust vectoring servo
pub trait Vectoring {
    fn position(&mut self, angle: ServoAngle);
}

/// Pulse width in microseconds for a servo angle
pub fn angle_to_pulse_us(angle: ServoAngle) -> u32 {
    let degrees = (angle.degrees() as u32).min(SERVO_SWING_DEGREES);
    SERVO_MIN_PULSE_US + degrees * (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US) / SERVO_SWING_DEGREES
}

#[cfg(feature = "arduino")]
pub use self::timer1::Servo;

#[cfg(feature = "arduino")]
mod timer1 {
    use arduino_hal::pac::TC1;

    use super::{angle_to_pulse_us, Vectoring};
    use crate::{
        elevator::ServoAngle,
        timer::{OutputCompare, Prescaler, Timer1, TIMER1_SERVO_TOP, US_PER_TICK},
    };

    /// Up to two servos on the Timer1 outputs, D9 (PB1) and D10 (PB2)
    pub struct Servo {
        timer: Timer1,
        use_pb1: bool,
        use_pb2: bool,
    }

    impl Servo {
        pub fn new(use_pb1: bool, use_pb2: bool, timer: TC1, initial: ServoAngle) -> Servo {
            let mut servo = Self {
                timer: Timer1::fast_pwm(timer, TIMER1_SERVO_TOP),
                use_pb1,
                use_pb2,
            };
            // Load the first pulse width before the pins are driven
            servo.position(initial);
            for output in servo.outputs() {
                servo.timer.connect(output);
            }
            servo.timer.start(Prescaler::DIV64);
            servo
        }

        fn outputs(&self) -> impl Iterator<Item = OutputCompare> {
            [(self.use_pb1, OutputCompare::A), (self.use_pb2, OutputCompare::B)]
                .into_iter()
                .filter_map(|(used, output)| used.then_some(output))
        }

        pub fn dissolve(self) -> TC1 {
            self.timer.release()
        }
    }

    impl Vectoring for Servo {
        fn position(&mut self, angle: ServoAngle) {
            let compare = (angle_to_pulse_us(angle) / US_PER_TICK - 1) as u16;
            for output in self.outputs() {
                self.timer.set_compare(output, compare);
            }
        }
    }
}
