use ufmt::derive::uDebug;

use crate::{
    command::{RudderDirection, ThrottleDirection},
    HARD_TURN_DEFLECTION, MAX_SPEED,
};

#[derive(uDebug, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotorDirection {
    Forward,
    Reverse,
}

impl MotorDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

impl From<ThrottleDirection> for MotorDirection {
    fn from(direction: ThrottleDirection) -> Self {
        match direction {
            ThrottleDirection::Forward => Self::Forward,
            ThrottleDirection::Reverse => Self::Reverse,
        }
    }
}

/// Direction and speed for one motor. The speed never exceeds [MAX_SPEED]
#[derive(uDebug, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotorCommand {
    direction: MotorDirection,
    speed: u8,
}

impl MotorCommand {
    pub const STOP: Self = Self {
        direction: MotorDirection::Forward,
        speed: 0,
    };

    pub fn new(direction: MotorDirection, speed: u8) -> Self {
        Self {
            direction,
            speed: speed.min(MAX_SPEED),
        }
    }
    pub fn forward(speed: u8) -> Self {
        Self::new(MotorDirection::Forward, speed)
    }
    pub fn reverse(speed: u8) -> Self {
        Self::new(MotorDirection::Reverse, speed)
    }
    pub fn direction(&self) -> MotorDirection {
        self.direction
    }
    pub fn speed(&self) -> u8 {
        self.speed
    }
}

impl Default for MotorCommand {
    fn default() -> Self {
        Self::STOP
    }
}

/// `numerator / denominator` rounded half up
fn div_round(numerator: u32, denominator: u32) -> u32 {
    (numerator + denominator / 2) / denominator
}

/// Throttle percentage scaled onto the motor speed range
pub fn base_speed(throttle_pct: u8) -> u8 {
    div_round(throttle_pct as u32 * MAX_SPEED as u32, 100).min(MAX_SPEED as u32) as u8
}

/// Turns throttle and rudder into `(left, right)` motor commands.
///
/// The side the rudder points to is the inner side. Below [HARD_TURN_DEFLECTION] the inner motor slows in
/// proportion to the deflection, at or past it the inner motor reverses and speeds up with the deflection.
/// The deflection must already be clamped to `0..=90`.
pub fn mix(
    throttle: ThrottleDirection,
    throttle_pct: u8,
    rudder: RudderDirection,
    deflection: u8,
) -> (MotorCommand, MotorCommand) {
    let direction = MotorDirection::from(throttle);
    let base = base_speed(throttle_pct);
    let outer = MotorCommand::new(direction, base);
    let deflection = deflection.min(90) as u32;

    let inner = if deflection >= HARD_TURN_DEFLECTION as u32 {
        let speed = div_round(base as u32 * deflection, 90);
        MotorCommand::new(direction.reversed(), speed as u8)
    } else {
        let speed = div_round(base as u32 * (90 - deflection), 90);
        MotorCommand::new(direction, speed as u8)
    };

    match rudder {
        RudderDirection::Center => (outer, outer),
        RudderDirection::Left => (inner, outer),
        RudderDirection::Right => (outer, inner),
    }
}
