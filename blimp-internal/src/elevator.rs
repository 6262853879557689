use ufmt::derive::uDebug;

use crate::command::ElevatorDirection;

/// Vectoring servo angle in degrees, always within `0..=45`
#[derive(uDebug, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ServoAngle(u8);

impl ServoAngle {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(45);
    /// Thrust pointing straight back
    pub const CENTER: Self = Self(22);

    pub fn new(degrees: i16) -> Self {
        Self(degrees.clamp(Self::MIN.0 as i16, Self::MAX.0 as i16) as u8)
    }
    pub fn degrees(&self) -> u8 {
        self.0
    }
}

impl Default for ServoAngle {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Every four degrees of elevator deflection tilts the thrust one degree away from center
pub fn set_elevator(direction: ElevatorDirection, deflection: u8) -> ServoAngle {
    let offset = (deflection / 4) as i16;
    let center = ServoAngle::CENTER.0 as i16;
    match direction {
        ElevatorDirection::Center => ServoAngle::CENTER,
        ElevatorDirection::Up => ServoAngle::new(center - offset),
        ElevatorDirection::Down => ServoAngle::new(center + offset),
    }
}
