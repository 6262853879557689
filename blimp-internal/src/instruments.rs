use ufmt::derive::uDebug;

use crate::{
    ir::{BeaconSensor, IrBeacon},
    maxsonar::Ranging,
};

/// Compass heading with the HMC6352's tenth of a degree resolution
#[derive(uDebug, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Heading {
    degrees: u16,
    tenths: u8,
}

impl Heading {
    /// None unless `degrees < 360` and `tenths < 10`
    pub fn new(degrees: u16, tenths: u8) -> Option<Self> {
        if degrees < 360 && tenths < 10 {
            Some(Self { degrees, tenths })
        } else {
            None
        }
    }
    pub fn from_tenths(tenths: u16) -> Option<Self> {
        Self::new(tenths / 10, (tenths % 10) as u8)
    }
    pub fn degrees(&self) -> u16 {
        self.degrees
    }
    pub fn tenths(&self) -> u8 {
        self.tenths
    }
    pub fn as_tenths(&self) -> u16 {
        self.degrees * 10 + self.tenths as u16
    }
}

pub trait BatteryMonitor {
    fn voltage(&mut self) -> f32;
}

pub trait Compass {
    /// One shot reading, None if the compass did not answer
    fn read_heading(&mut self) -> Option<Heading>;
}

/// Stand in for airframes without a compass
pub struct NoCompass;

impl Compass for NoCompass {
    fn read_heading(&mut self) -> Option<Heading> {
        None
    }
}

/// Latest value of every instrument. An altitude of 0 means the range finder had no echo
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SensorSnapshot {
    pub battery_voltage: f32,
    pub ir_beacon: IrBeacon,
    pub altitude: u32,
    pub heading: Option<Heading>,
}

impl SensorSnapshot {
    /// Altitude in inches, None for the no echo sentinel
    pub fn altitude(&self) -> Option<u32> {
        match self.altitude {
            0 => None,
            altitude => Some(altitude),
        }
    }
}

/// What the flight controller needs from the instrument cluster
pub trait Sensors {
    /// Battery and IR, safe to call every cycle
    fn refresh_cheap(&mut self);
    /// Rate limited range reading, may block while the sonar pings
    fn refresh_ranging(&mut self, now_ms: u32);
    /// One shot compass reading, only on demand
    fn refresh_heading(&mut self);
    fn snapshot(&self) -> &SensorSnapshot;
}

pub struct SensorHub<B: BatteryMonitor, I: BeaconSensor, S: Ranging, C: Compass> {
    battery: B,
    ir: I,
    sonar: S,
    compass: C,
    snapshot: SensorSnapshot,
}

impl<B: BatteryMonitor, I: BeaconSensor, S: Ranging, C: Compass> SensorHub<B, I, S, C> {
    pub fn new(battery: B, ir: I, sonar: S, compass: C) -> Self {
        Self {
            battery,
            ir,
            sonar,
            compass,
            snapshot: SensorSnapshot::default(),
        }
    }
    pub fn sonar(&self) -> &S {
        &self.sonar
    }
    pub fn sonar_mut(&mut self) -> &mut S {
        &mut self.sonar
    }
}

impl<B: BatteryMonitor, I: BeaconSensor, S: Ranging, C: Compass> Sensors for SensorHub<B, I, S, C> {
    fn refresh_cheap(&mut self) {
        self.snapshot.battery_voltage = self.battery.voltage();
        self.snapshot.ir_beacon = self.ir.beacon();
    }

    fn refresh_ranging(&mut self, now_ms: u32) {
        self.sonar.update(now_ms);
        self.snapshot.altitude = self.sonar.distance();
    }

    fn refresh_heading(&mut self) {
        self.snapshot.heading = self.compass.read_heading();
    }

    fn snapshot(&self) -> &SensorSnapshot {
        &self.snapshot
    }
}
