use std::{
    cell::{Ref, RefCell},
    convert::Infallible,
    io,
    rc::Rc,
    thread::{self, JoinHandle},
    time::Duration,
};

use blimp_internal::{
    command::Command,
    elevator::ServoAngle,
    flightctl::{Actuators, FlightController},
    instruments::{BatteryMonitor, Compass, Heading, SensorHub},
    ir::{BeaconSensor, IrBeacon},
    l293::Thruster,
    maxsonar::Ranging,
    mixer::{MotorCommand, MotorDirection},
    servo::Vectoring,
    BlimpConfig,
};
use log::{debug, info};

use crate::console;

/// Length of one simulated control cycle
pub const SIM_STEP_MS: u32 = 50;
/// Yaw rate in degrees per second for each unit of speed difference between the motors
pub const YAW_DEG_PER_SPEED: f32 = 1.0;
pub const SIM_ALTITUDE_IN: u32 = 48;
pub const SIM_BATTERY_VOLTS: f32 = 7.4;

/// The physical state of the simulated blimp. It only yaws
#[derive(Clone, Debug)]
pub struct Airframe {
    pub heading_deg: f32,
    /// Compass bearing from the blimp to the IR beacon
    pub beacon_bearing_deg: f32,
    pub altitude_in: u32,
    pub battery_volts: f32,
    pub left: MotorCommand,
    pub right: MotorCommand,
    pub elevator: ServoAngle,
}

fn signed_speed(cmd: MotorCommand) -> f32 {
    match cmd.direction() {
        MotorDirection::Forward => cmd.speed() as f32,
        MotorDirection::Reverse => -(cmd.speed() as f32),
    }
}

impl Airframe {
    /// Pointing north, motors stopped
    pub fn new(beacon_bearing_deg: f32) -> Self {
        Self {
            heading_deg: 0.0,
            beacon_bearing_deg,
            altitude_in: SIM_ALTITUDE_IN,
            battery_volts: SIM_BATTERY_VOLTS,
            left: MotorCommand::STOP,
            right: MotorCommand::STOP,
            elevator: ServoAngle::CENTER,
        }
    }

    /// A faster left motor turns the nose clockwise
    pub fn advance(&mut self, dt_s: f32) {
        let yaw_rate = (signed_speed(self.left) - signed_speed(self.right)) * YAW_DEG_PER_SPEED;
        self.heading_deg = (self.heading_deg + yaw_rate * dt_s).rem_euclid(360.0);
    }

    /// Bearing of the beacon relative to the nose, in `-180..180`, positive to the right
    pub fn relative_bearing(&self) -> f32 {
        (self.beacon_bearing_deg - self.heading_deg + 180.0).rem_euclid(360.0) - 180.0
    }

    /// Each detector sees a 90 degree wedge
    pub fn beacon(&self) -> IrBeacon {
        let bearing = self.relative_bearing();
        if bearing.abs() < 45.0 {
            IrBeacon::Front
        } else if (45.0..135.0).contains(&bearing) {
            IrBeacon::Right
        } else if (-135.0..=-45.0).contains(&bearing) {
            IrBeacon::Left
        } else {
            IrBeacon::Back
        }
    }

    pub fn heading(&self) -> Option<Heading> {
        Heading::from_tenths((self.heading_deg * 10.0).round() as u16 % 3600)
    }
}

type SharedAirframe = Rc<RefCell<Airframe>>;

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

pub struct SimThruster {
    airframe: SharedAirframe,
    side: Side,
}

impl Thruster for SimThruster {
    fn send_command(&mut self, cmd: MotorCommand) {
        let mut airframe = self.airframe.borrow_mut();
        match self.side {
            Side::Left => airframe.left = cmd,
            Side::Right => airframe.right = cmd,
        }
    }
}

pub struct SimServo {
    airframe: SharedAirframe,
}

impl Vectoring for SimServo {
    fn position(&mut self, angle: ServoAngle) {
        self.airframe.borrow_mut().elevator = angle;
    }
}

/// Every instrument of the simulated blimp, reading straight off the [Airframe]
#[derive(Clone)]
pub struct SimInstruments {
    airframe: SharedAirframe,
}

impl BatteryMonitor for SimInstruments {
    fn voltage(&mut self) -> f32 {
        self.airframe.borrow().battery_volts
    }
}

impl BeaconSensor for SimInstruments {
    fn beacon(&mut self) -> IrBeacon {
        self.airframe.borrow().beacon()
    }
}

impl Ranging for SimInstruments {
    fn update(&mut self, _now_ms: u32) {}

    fn distance(&self) -> u32 {
        self.airframe.borrow().altitude_in
    }
}

impl Compass for SimInstruments {
    fn read_heading(&mut self) -> Option<Heading> {
        self.airframe.borrow().heading()
    }
}

/// Collects the flight controller's responses
#[derive(Default)]
pub struct Console {
    out: String,
}

impl ufmt::uWrite for Console {
    type Error = Infallible;
    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.out.push_str(s);
        Ok(())
    }
}

pub type SimSensors = SensorHub<SimInstruments, SimInstruments, SimInstruments, SimInstruments>;
pub type SimFlightController = FlightController<SimThruster, SimThruster, SimServo, SimSensors>;

/// A [FlightController] wired to an [Airframe] with a simulated clock
pub struct Simulator {
    airframe: SharedAirframe,
    blimp: SimFlightController,
    now_ms: u32,
}

impl Simulator {
    pub fn new(config: BlimpConfig, beacon_bearing_deg: f32) -> Self {
        let airframe = Rc::new(RefCell::new(Airframe::new(beacon_bearing_deg)));
        let actuators = Actuators::new(
            SimThruster {
                airframe: airframe.clone(),
                side: Side::Left,
            },
            SimThruster {
                airframe: airframe.clone(),
                side: Side::Right,
            },
            SimServo {
                airframe: airframe.clone(),
            },
        );
        let instruments = SimInstruments {
            airframe: airframe.clone(),
        };
        let sensors = SensorHub::new(
            instruments.clone(),
            instruments.clone(),
            instruments.clone(),
            instruments,
        );
        Self {
            airframe,
            blimp: FlightController::new(config, actuators, sensors),
            now_ms: 0,
        }
    }

    /// Runs one control cycle then lets the airframe fly for `dt_ms`. Returns the responses
    pub fn step(&mut self, dt_ms: u32, command: Option<Command>) -> String {
        let mut console = Console::default();
        self.blimp.control_cycle(self.now_ms, command, &mut console);
        self.airframe.borrow_mut().advance(dt_ms as f32 / 1000.0);
        self.now_ms = self.now_ms.wrapping_add(dt_ms);
        console.out
    }

    pub fn airframe(&self) -> Ref<'_, Airframe> {
        self.airframe.borrow()
    }

    pub fn blimp(&self) -> &SimFlightController {
        &self.blimp
    }

    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }
}

/// Flies the simulator in real time on its own thread until `commands` disconnects
pub fn spawn(
    config: BlimpConfig,
    beacon_bearing_deg: f32,
    commands: flume::Receiver<Command>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut sim = Simulator::new(config, beacon_bearing_deg);
        loop {
            let command = match commands.try_recv() {
                Ok(command) => Some(command),
                Err(flume::TryRecvError::Empty) => None,
                Err(flume::TryRecvError::Disconnected) => break,
            };
            print!("{}", sim.step(SIM_STEP_MS, command));
            if sim.now_ms() % 1000 == 0 {
                let airframe = sim.airframe();
                debug!(
                    "t={}ms heading={:.1} beacon={:?} motors={:?}/{:?}",
                    sim.now_ms(),
                    airframe.heading_deg,
                    airframe.beacon(),
                    airframe.left,
                    airframe.right
                );
            }
            thread::sleep(Duration::from_millis(SIM_STEP_MS as u64));
        }
        info!("Simulation stopped");
    })
}

/// Flies a simulated blimp from stdin commands until stdin closes
pub async fn run(compass: bool, beacon_bearing_deg: f32) -> io::Result<()> {
    let config = if compass {
        BlimpConfig::WITH_COMPASS
    } else {
        BlimpConfig::IR_ONLY
    };
    info!(
        "Simulating a blimp {} compass, beacon at {} degrees",
        if compass { "with" } else { "without" },
        beacon_bearing_deg
    );
    let (tx, rx) = flume::unbounded();
    let sim = spawn(config, beacon_bearing_deg, rx);
    console::read_commands(tx).await?;
    match tokio::task::spawn_blocking(move || sim.join()).await {
        Ok(Ok(())) => Ok(()),
        _ => Err(io::Error::new(io::ErrorKind::Other, "simulation stopped unexpectedly")),
    }
}
