use embedded_hal::{digital::v2::OutputPin, PwmPin};

use crate::mixer::{MotorCommand, MotorDirection};

/// Something that turns a [MotorCommand] into thrust
pub trait Thruster {
    fn send_command(&mut self, cmd: MotorCommand);
}

/// One motor on the L293D: a direction input and a PWM enable input.
/// Direction high spins the prop forward, the PWM duty is the commanded speed
pub struct L293Channel<D: OutputPin, S: PwmPin<Duty = u8>> {
    direction: D,
    speed: S,
}

impl<D: OutputPin, S: PwmPin<Duty = u8>> L293Channel<D, S> {
    /// The motor starts stopped
    pub fn new(direction: D, speed: S) -> Self {
        let mut channel = Self { direction, speed };
        channel.speed.set_duty(0);
        channel.speed.enable();
        let _ = channel.direction.set_high();
        channel
    }

    pub fn dissolve(self) -> (D, S) {
        (self.direction, self.speed)
    }
}

impl<D: OutputPin, S: PwmPin<Duty = u8>> Thruster for L293Channel<D, S> {
    fn send_command(&mut self, cmd: MotorCommand) {
        match cmd.direction() {
            MotorDirection::Forward => {
                let _ = self.direction.set_high();
            }
            MotorDirection::Reverse => {
                let _ = self.direction.set_low();
            }
        }
        self.speed.set_duty(cmd.speed());
    }
}
