use ufmt::uWrite;

use crate::{
    autopilot::{AutopilotController, AutopilotMode},
    command::{Command, ElevatorDirection, RudderDirection, ThrottleDirection},
    elevator::{set_elevator, ServoAngle},
    instruments::{SensorSnapshot, Sensors},
    l293::Thruster,
    mixer::{mix, MotorCommand},
    servo::Vectoring,
    BlimpConfig,
};

/// Owns every output line of the blimp and remembers what was last written to them
pub struct Actuators<L: Thruster, R: Thruster, V: Vectoring> {
    left: L,
    right: R,
    vectoring: V,
    motors: (MotorCommand, MotorCommand),
    elevator: ServoAngle,
}

impl<L: Thruster, R: Thruster, V: Vectoring> Actuators<L, R, V> {
    /// Stops both motors and centers the thrust
    pub fn new(left: L, right: R, vectoring: V) -> Self {
        let mut actuators = Self {
            left,
            right,
            vectoring,
            motors: (MotorCommand::STOP, MotorCommand::STOP),
            elevator: ServoAngle::CENTER,
        };
        actuators.drive(MotorCommand::STOP, MotorCommand::STOP);
        actuators.vector(ServoAngle::CENTER);
        actuators
    }
    pub fn drive(&mut self, left: MotorCommand, right: MotorCommand) {
        self.left.send_command(left);
        self.right.send_command(right);
        self.motors = (left, right);
    }
    pub fn vector(&mut self, angle: ServoAngle) {
        self.vectoring.position(angle);
        self.elevator = angle;
    }
    /// Last `(left, right)` commands sent to the motors
    pub fn motors(&self) -> (MotorCommand, MotorCommand) {
        self.motors
    }
    pub fn elevator(&self) -> ServoAngle {
        self.elevator
    }
}

/// Throttle and rudder as last commanded from the ground, already clamped
#[derive(Clone, Copy, Debug)]
struct ManualControl {
    throttle: ThrottleDirection,
    throttle_pct: u8,
    rudder: RudderDirection,
    deflection: u8,
}

impl ManualControl {
    const IDLE: Self = Self {
        throttle: ThrottleDirection::Forward,
        throttle_pct: 0,
        rudder: RudderDirection::Center,
        deflection: 0,
    };
}

fn write_char<W: uWrite>(serial: &mut W, c: char) {
    let mut buf = [0u8; 4];
    let _ = serial.write_str(c.encode_utf8(&mut buf));
}

/// Writes `value / 10` with one decimal
fn write_tenths<W: uWrite>(serial: &mut W, tenths: u32) {
    let _ = ufmt::uwrite!(serial, "{}.{}", tenths / 10, tenths % 10);
}

/// The whole blimp: sensors, actuators, the autopilot and the manual setpoint.
///
/// The caller owns the loop and calls [FlightController::control_cycle] once per iteration with
/// the time and at most one decoded command. Responses are written to `serial`.
pub struct FlightController<L: Thruster, R: Thruster, V: Vectoring, S: Sensors> {
    config: BlimpConfig,
    actuators: Actuators<L, R, V>,
    sensors: S,
    autopilot: AutopilotController,
    manual: ManualControl,
}

impl<L: Thruster, R: Thruster, V: Vectoring, S: Sensors> FlightController<L, R, V, S> {
    pub fn new(config: BlimpConfig, actuators: Actuators<L, R, V>, sensors: S) -> Self {
        Self {
            autopilot: AutopilotController::new(&config),
            config,
            actuators,
            sensors,
            manual: ManualControl::IDLE,
        }
    }

    /// One pass of the control loop. The sonar refresh may block for a few hundred
    /// milliseconds, `now_ms` is the time sampled at the start of the pass
    pub fn control_cycle<W: uWrite>(&mut self, now_ms: u32, command: Option<Command>, serial: &mut W) {
        self.sensors.refresh_cheap();
        self.sensors.refresh_ranging(now_ms);
        self.update_autopilot(now_ms);
        if let Some(command) = command {
            self.dispatch(command, serial);
        }
    }

    /// Lets the autopilot steer if it is engaged and due
    pub fn update_autopilot(&mut self, now_ms: u32) {
        if !self.autopilot.is_due(now_ms) {
            return;
        }
        if self.autopilot.mode() == AutopilotMode::CompassHold {
            self.sensors.refresh_heading();
        }
        if let Some((left, right)) = self.autopilot.tick(now_ms, self.sensors.snapshot()) {
            self.actuators.drive(left, right);
        }
    }

    pub fn dispatch<W: uWrite>(&mut self, command: Command, serial: &mut W) {
        match command {
            Command::Hail => {
                let _ = ufmt::uwriteln!(serial, "Roger");
            }
            Command::Status => self.status(serial),
            Command::Elevators {
                direction,
                deflection,
            } => self.elevators(direction, deflection, serial),
            Command::Rudder {
                direction,
                deflection,
            } => self.rudder(direction, deflection, serial),
            Command::Throttle { direction, speed } => self.throttle(direction, speed, serial),
            Command::Instruments { id } => self.instruments(id, serial),
            Command::Autopilot { mode } => self.autopilot(mode, serial),
        }
    }

    fn status<W: uWrite>(&mut self, serial: &mut W) {
        let _ = ufmt::uwriteln!(serial, "Status: operational");
        self.report_battery(serial);
        self.report_ir(serial);
        self.report_altitude(serial);
        if self.config.compass_installed {
            self.sensors.refresh_heading();
            self.report_compass(serial);
        }
    }

    fn elevators<W: uWrite>(&mut self, direction: ElevatorDirection, deflection: u8, serial: &mut W) {
        let _ = ufmt::uwrite!(serial, "Elevators ");
        write_char(serial, direction.letter());
        let _ = ufmt::uwriteln!(serial, " {}", deflection);

        self.actuators.vector(set_elevator(direction, deflection));
    }

    fn rudder<W: uWrite>(&mut self, direction: RudderDirection, deflection: u8, serial: &mut W) {
        let _ = ufmt::uwrite!(serial, "Rudder ");
        write_char(serial, direction.letter());
        let _ = ufmt::uwriteln!(serial, " {}", deflection);

        self.manual.rudder = direction;
        self.manual.deflection = deflection.min(90);
        self.set_thrusters();
    }

    fn throttle<W: uWrite>(&mut self, direction: ThrottleDirection, speed: u8, serial: &mut W) {
        let _ = ufmt::uwrite!(serial, "Throttle ");
        write_char(serial, direction.letter());
        let _ = ufmt::uwriteln!(serial, " {}", speed);

        self.manual.throttle = direction;
        self.manual.throttle_pct = speed.min(100);
        self.set_thrusters();
    }

    /// Mixes the manual setpoint onto the motors, unless the autopilot has them
    fn set_thrusters(&mut self) {
        if self.autopilot.is_engaged() {
            return;
        }
        let (left, right) = mix(
            self.manual.throttle,
            self.manual.throttle_pct,
            self.manual.rudder,
            self.manual.deflection,
        );
        self.actuators.drive(left, right);
    }

    fn instruments<W: uWrite>(&mut self, id: char, serial: &mut W) {
        match id {
            'b' => self.report_battery(serial),
            'i' => self.report_ir(serial),
            'a' => self.report_altitude(serial),
            'c' if self.config.compass_installed => {
                self.sensors.refresh_heading();
                self.report_compass(serial);
            }
            _ => {
                let _ = ufmt::uwriteln!(serial, "Invalid instrument");
            }
        }
    }

    fn autopilot<W: uWrite>(&mut self, mode: char, serial: &mut W) {
        match AutopilotMode::from_char(mode) {
            Some(AutopilotMode::Off) => {
                self.autopilot.disengage();
                self.manual.throttle = ThrottleDirection::Forward;
                self.manual.throttle_pct = 0;
                self.actuators.drive(MotorCommand::STOP, MotorCommand::STOP);
                let _ = ufmt::uwriteln!(serial, "Autopilot Is Off");
            }
            Some(AutopilotMode::CompassHold) if !self.config.compass_installed => {
                let _ = ufmt::uwriteln!(serial, "Invalid autopilot");
            }
            Some(mode) => {
                self.autopilot.engage(mode);
                let _ = ufmt::uwriteln!(serial, "Autopilot {} On", mode.number());
            }
            None => {
                let _ = ufmt::uwriteln!(serial, "Invalid autopilot");
            }
        }
    }

    fn report_battery<W: uWrite>(&self, serial: &mut W) {
        let volts = self.sensors.snapshot().battery_voltage;
        let _ = ufmt::uwrite!(serial, "Battery: ");
        write_tenths(serial, (volts * 10.0 + 0.5) as u32);
        let _ = serial.write_str("\n");
    }

    fn report_ir<W: uWrite>(&self, serial: &mut W) {
        let _ = ufmt::uwriteln!(serial, "IR: {}", self.sensors.snapshot().ir_beacon.name());
    }

    fn report_altitude<W: uWrite>(&self, serial: &mut W) {
        match self.sensors.snapshot().altitude() {
            Some(inches) => {
                let _ = ufmt::uwriteln!(serial, "Alt: {}", inches);
            }
            None => {
                let _ = ufmt::uwriteln!(serial, "Alt: none");
            }
        }
    }

    fn report_compass<W: uWrite>(&self, serial: &mut W) {
        match self.sensors.snapshot().heading {
            Some(heading) => {
                let _ = ufmt::uwriteln!(serial, "Compass: {}.{}", heading.degrees(), heading.tenths());
            }
            None => {
                let _ = ufmt::uwriteln!(serial, "Compass: none");
            }
        }
    }

    pub fn config(&self) -> &BlimpConfig {
        &self.config
    }
    pub fn autopilot_mode(&self) -> AutopilotMode {
        self.autopilot.mode()
    }
    /// Last `(left, right)` commands sent to the motors
    pub fn motors(&self) -> (MotorCommand, MotorCommand) {
        self.actuators.motors()
    }
    pub fn elevator(&self) -> ServoAngle {
        self.actuators.elevator()
    }
    pub fn snapshot(&self) -> &SensorSnapshot {
        self.sensors.snapshot()
    }
    pub fn sensors(&self) -> &S {
        &self.sensors
    }
    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }
}
