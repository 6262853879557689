#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    convert::Infallible,
    rc::Rc,
};

use blimp_internal::{
    elevator::ServoAngle,
    flightctl::{Actuators, FlightController},
    instruments::{BatteryMonitor, Compass, Heading, SensorHub},
    ir::{BeaconSensor, IrBeacon},
    l293::Thruster,
    maxsonar::{MaxSonar, MAXSONAR_US_PER_INCH},
    mixer::MotorCommand,
    pulse::{Clock, PulseIn},
    servo::Vectoring,
    BlimpConfig,
};
use embedded_hal::{
    blocking::{
        delay::DelayMs,
        i2c::{Read, Write},
    },
    digital::v2::{InputPin, OutputPin},
    PwmPin,
};

pub type Log<T> = Rc<RefCell<Vec<T>>>;

/// Records every level written to it
#[derive(Clone, Default)]
pub struct MockOutputPin {
    pub levels: Log<bool>,
}
impl OutputPin for MockOutputPin {
    type Error = Infallible;
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}
impl MockOutputPin {
    pub fn last(&self) -> Option<bool> {
        self.levels.borrow().last().copied()
    }
}

#[derive(Clone, Default)]
pub struct MockInputPin {
    pub level: Rc<Cell<bool>>,
}
impl MockInputPin {
    pub fn new(level: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(level)),
        }
    }
    pub fn set(&self, level: bool) {
        self.level.set(level);
    }
}
impl InputPin for MockInputPin {
    type Error = Infallible;
    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.level.get())
    }
    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.level.get())
    }
}

#[derive(Clone, Default)]
pub struct MockPwm {
    pub duty: Rc<Cell<u8>>,
    pub enabled: Rc<Cell<bool>>,
}
impl PwmPin for MockPwm {
    type Duty = u8;
    fn disable(&mut self) {
        self.enabled.set(false);
    }
    fn enable(&mut self) {
        self.enabled.set(true);
    }
    fn get_duty(&self) -> u8 {
        self.duty.get()
    }
    fn get_max_duty(&self) -> u8 {
        u8::MAX
    }
    fn set_duty(&mut self, duty: u8) {
        self.duty.set(duty);
    }
}

/// Records requested delays without sleeping
#[derive(Clone, Default)]
pub struct MockDelay {
    pub delays: Log<u16>,
}
impl DelayMs<u16> for MockDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.delays.borrow_mut().push(ms);
    }
}

/// Returns a fixed echo width and records the timeout of every measurement
#[derive(Clone, Default)]
pub struct MockPulseIn {
    pub width_us: Rc<Cell<u32>>,
    pub count: Rc<Cell<u32>>,
    pub timeouts: Log<u32>,
}
impl MockPulseIn {
    pub fn set_inches(&self, inches: u32) {
        self.width_us.set(inches * MAXSONAR_US_PER_INCH);
    }
}
impl PulseIn for MockPulseIn {
    fn pulse_in_us(&mut self, timeout_us: u32) -> u32 {
        self.count.set(self.count.get() + 1);
        self.timeouts.borrow_mut().push(timeout_us);
        self.width_us.get()
    }
}

/// A clock that moves forward by `step_us` every time micros is read
#[derive(Clone)]
pub struct SteppingClock {
    pub now_us: Rc<Cell<u32>>,
    pub step_us: u32,
}
impl SteppingClock {
    pub fn new(step_us: u32) -> Self {
        Self {
            now_us: Rc::new(Cell::new(0)),
            step_us,
        }
    }
}
impl Clock for SteppingClock {
    fn millis(&self) -> u32 {
        self.now_us.get() / 1000
    }
    fn micros(&self) -> u32 {
        let now = self.now_us.get();
        self.now_us.set(now.wrapping_add(self.step_us));
        now
    }
}

/// High while the shared clock is inside one of the `[start, end)` windows
#[derive(Clone)]
pub struct ScriptedPin {
    pub now_us: Rc<Cell<u32>>,
    pub high: Vec<(u32, u32)>,
}
impl InputPin for ScriptedPin {
    type Error = Infallible;
    fn is_high(&self) -> Result<bool, Self::Error> {
        let now = self.now_us.get();
        Ok(self.high.iter().any(|(start, end)| (*start..*end).contains(&now)))
    }
    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// I2C bus with a single device that answers every read with `response`
#[derive(Clone, Default)]
pub struct MockI2c {
    pub writes: Log<(u8, Vec<u8>)>,
    pub reads: Log<u8>,
    pub response: Rc<Cell<[u8; 2]>>,
    pub fail: Rc<Cell<bool>>,
}
impl Write for MockI2c {
    type Error = ();
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail.get() {
            return Err(());
        }
        self.writes.borrow_mut().push((address, bytes.to_vec()));
        Ok(())
    }
}
impl Read for MockI2c {
    type Error = ();
    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        if self.fail.get() {
            return Err(());
        }
        self.reads.borrow_mut().push(address);
        let response = self.response.get();
        buffer.copy_from_slice(&response[..buffer.len()]);
        Ok(())
    }
}

/// Collects everything written to it
#[derive(Default)]
pub struct MockSerial {
    pub out: String,
}
impl ufmt::uWrite for MockSerial {
    type Error = Infallible;
    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.out.push_str(s);
        Ok(())
    }
}
impl MockSerial {
    /// Hands back the complete lines written so far and clears the buffer
    pub fn take_lines(&mut self) -> Vec<String> {
        let out = std::mem::take(&mut self.out);
        out.lines().map(str::to_owned).collect()
    }
}

#[derive(Clone, Default)]
pub struct MockThruster {
    pub last: Rc<Cell<MotorCommand>>,
    pub sent: Rc<Cell<u32>>,
}
impl Thruster for MockThruster {
    fn send_command(&mut self, cmd: MotorCommand) {
        self.last.set(cmd);
        self.sent.set(self.sent.get() + 1);
    }
}

#[derive(Clone, Default)]
pub struct MockServo {
    pub angle: Rc<Cell<ServoAngle>>,
}
impl Vectoring for MockServo {
    fn position(&mut self, angle: ServoAngle) {
        self.angle.set(angle);
    }
}

#[derive(Clone, Default)]
pub struct MockBattery {
    pub volts: Rc<Cell<f32>>,
}
impl BatteryMonitor for MockBattery {
    fn voltage(&mut self) -> f32 {
        self.volts.get()
    }
}

#[derive(Clone, Default)]
pub struct MockBeacon {
    pub beacon: Rc<Cell<IrBeacon>>,
}
impl BeaconSensor for MockBeacon {
    fn beacon(&mut self) -> IrBeacon {
        self.beacon.get()
    }
}

#[derive(Clone, Default)]
pub struct MockCompass {
    pub heading: Rc<Cell<Option<Heading>>>,
    pub reads: Rc<Cell<u32>>,
}
impl Compass for MockCompass {
    fn read_heading(&mut self) -> Option<Heading> {
        self.reads.set(self.reads.get() + 1);
        self.heading.get()
    }
}

pub type TestSonar = MaxSonar<MockPulseIn, MockOutputPin, MockDelay>;
pub type TestSensors = SensorHub<MockBattery, MockBeacon, TestSonar, MockCompass>;
pub type TestBlimp = FlightController<MockThruster, MockThruster, MockServo, TestSensors>;

/// Handles onto every mock wired into a [TestBlimp]
pub struct Rig {
    pub left: MockThruster,
    pub right: MockThruster,
    pub servo: MockServo,
    pub battery: MockBattery,
    pub beacon: MockBeacon,
    pub echo: MockPulseIn,
    pub sonar_rx: MockOutputPin,
    pub sonar_delay: MockDelay,
    pub compass: MockCompass,
    pub serial: MockSerial,
}

impl Rig {
    pub fn motors(&self) -> (MotorCommand, MotorCommand) {
        (self.left.last.get(), self.right.last.get())
    }
}

pub fn test_sonar() -> (TestSonar, MockPulseIn, MockOutputPin, MockDelay) {
    let echo = MockPulseIn::default();
    let rx = MockOutputPin::default();
    let delay = MockDelay::default();
    let sonar = MaxSonar::new(echo.clone(), rx.clone(), delay.clone());
    (sonar, echo, rx, delay)
}

pub fn test_blimp(config: BlimpConfig) -> (TestBlimp, Rig) {
    let left = MockThruster::default();
    let right = MockThruster::default();
    let servo = MockServo::default();
    let battery = MockBattery::default();
    let beacon = MockBeacon::default();
    let compass = MockCompass::default();
    let (sonar, echo, sonar_rx, sonar_delay) = test_sonar();

    let sensors = SensorHub::new(battery.clone(), beacon.clone(), sonar, compass.clone());
    let actuators = Actuators::new(left.clone(), right.clone(), servo.clone());
    let blimp = FlightController::new(config, actuators, sensors);

    let rig = Rig {
        left,
        right,
        servo,
        battery,
        beacon,
        echo,
        sonar_rx,
        sonar_delay,
        compass,
        serial: MockSerial::default(),
    };
    (blimp, rig)
}
