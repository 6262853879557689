use embedded_hal::blocking::{
    delay::DelayMs,
    i2c::{Read, Write},
};

use crate::instruments::{Compass, Heading};

/// 7 bit address, the datasheet lists the 8 bit form 0x42
pub const HMC6352_ADDRESS: u8 = 0x21;

/// Single ASCII command bytes understood by the compass
pub struct Hmc6352Command(u8);
impl From<Hmc6352Command> for u8 {
    fn from(cmd: Hmc6352Command) -> Self {
        cmd.0
    }
}
impl From<Hmc6352Command> for [u8; 1] {
    fn from(cmd: Hmc6352Command) -> Self {
        [cmd.0]
    }
}
impl Hmc6352Command {
    /// Wakes the compass from standby, measures and queues the heading
    pub const GET_DATA: Self = Self(b'A');
}

/// Command to response time from the datasheet, rounded up to whole milliseconds
pub const GET_DATA_DELAY_MS: u16 = 6;

pub struct Hmc6352<I: Write + Read, D: DelayMs<u16>> {
    address: u8,
    i2c: I,
    delay: D,
}

impl<I: Write + Read, D: DelayMs<u16>> Hmc6352<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            address: HMC6352_ADDRESS,
            i2c,
            delay,
        }
    }

    fn command(&mut self, cmd: Hmc6352Command) -> bool {
        let cmd: [u8; 1] = cmd.into();
        self.i2c.write(self.address, &cmd).is_ok()
    }

    /// Requests a fresh heading and reads it back in tenths of a degree
    pub fn read_heading_tenths(&mut self) -> Option<u16> {
        if !self.command(Hmc6352Command::GET_DATA) {
            return None;
        }
        self.delay.delay_ms(GET_DATA_DELAY_MS);
        let mut data = [0u8; 2];
        self.i2c.read(self.address, &mut data).ok()?;

        Some(u16::from_be_bytes(data))
    }
}

impl<I: Write + Read, D: DelayMs<u16>> Compass for Hmc6352<I, D> {
    fn read_heading(&mut self) -> Option<Heading> {
        Heading::from_tenths(self.read_heading_tenths()?)
    }
}
