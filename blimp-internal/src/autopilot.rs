use ufmt::derive::uDebug;

use crate::{
    instruments::SensorSnapshot,
    ir::IrBeacon,
    mixer::MotorCommand,
    BlimpConfig,
};

/// Heading window, in tenths of a degree, where compass hold only creeps forward
pub const COMPASS_HOLD_DEAD_BAND: core::ops::RangeInclusive<u16> = 1500..=2100;
/// Forward speed while inside the dead band
pub const COMPASS_HOLD_CREEP_SPEED: u8 = 1;

#[derive(uDebug, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AutopilotMode {
    #[default]
    Off,
    IrFollow,
    CompassHold,
}

impl AutopilotMode {
    /// The mode selected by an `a` command
    pub fn from_char(mode: char) -> Option<Self> {
        match mode {
            '0' => Some(Self::Off),
            '1' => Some(Self::IrFollow),
            '2' => Some(Self::CompassHold),
            _ => None,
        }
    }
    pub fn number(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::IrFollow => 1,
            Self::CompassHold => 2,
        }
    }
}

/// Pivot the blimp clockwise in place
fn pivot_right(thrust: u8) -> (MotorCommand, MotorCommand) {
    (MotorCommand::forward(thrust), MotorCommand::reverse(thrust))
}

/// Pivot the blimp counter clockwise in place
fn pivot_left(thrust: u8) -> (MotorCommand, MotorCommand) {
    (MotorCommand::reverse(thrust), MotorCommand::forward(thrust))
}

/// Motor commands for one autopilot evaluation, `(left, right)`
pub fn navigate(
    mode: AutopilotMode,
    snapshot: &SensorSnapshot,
    thrust: u8,
) -> (MotorCommand, MotorCommand) {
    match mode {
        AutopilotMode::Off => (MotorCommand::STOP, MotorCommand::STOP),
        AutopilotMode::IrFollow => match snapshot.ir_beacon {
            IrBeacon::None | IrBeacon::Front => (MotorCommand::STOP, MotorCommand::STOP),
            // A beacon behind us is turned towards the same way as one on the right
            IrBeacon::Right | IrBeacon::Back => pivot_right(thrust),
            IrBeacon::Left => pivot_left(thrust),
        },
        AutopilotMode::CompassHold => match snapshot.heading {
            None => (MotorCommand::STOP, MotorCommand::STOP),
            Some(heading) => {
                let tenths = heading.as_tenths();
                if COMPASS_HOLD_DEAD_BAND.contains(&tenths) {
                    let creep = MotorCommand::forward(COMPASS_HOLD_CREEP_SPEED);
                    (creep, creep)
                } else if tenths < *COMPASS_HOLD_DEAD_BAND.start() {
                    pivot_right(thrust)
                } else {
                    pivot_left(thrust)
                }
            }
        },
    }
}

/// Runs [navigate] no more often than every `interval_ms` while a mode is engaged
pub struct AutopilotController {
    mode: AutopilotMode,
    last_update_ms: u32,
    interval_ms: u32,
    thrust: u8,
}

impl AutopilotController {
    pub fn new(config: &BlimpConfig) -> Self {
        Self {
            mode: AutopilotMode::Off,
            last_update_ms: 0,
            interval_ms: config.autopilot_interval_ms,
            thrust: config.autopilot_thrust(),
        }
    }

    pub fn mode(&self) -> AutopilotMode {
        self.mode
    }

    pub fn is_engaged(&self) -> bool {
        self.mode != AutopilotMode::Off
    }

    pub fn engage(&mut self, mode: AutopilotMode) {
        self.mode = mode;
    }

    pub fn disengage(&mut self) {
        self.mode = AutopilotMode::Off;
    }

    /// True if a mode is engaged and the update interval has passed
    pub fn is_due(&self, now_ms: u32) -> bool {
        self.is_engaged() && now_ms.wrapping_sub(self.last_update_ms) > self.interval_ms
    }

    /// Returns the motor commands to apply if an update was due
    pub fn tick(
        &mut self,
        now_ms: u32,
        snapshot: &SensorSnapshot,
    ) -> Option<(MotorCommand, MotorCommand)> {
        if !self.is_due(now_ms) {
            return None;
        }
        self.last_update_ms = now_ms;
        Some(navigate(self.mode, snapshot, self.thrust))
    }
}
