use embedded_hal::digital::v2::InputPin;
use ufmt::derive::uDebug;

/// Where the IR beacon was last seen relative to the nose of the blimp
#[derive(uDebug, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IrBeacon {
    #[default]
    None,
    Front,
    Right,
    Back,
    Left,
}

impl IrBeacon {
    /// Picks a single direction out of the four detector states.
    /// When several detectors fire the first of front, right, back, left wins
    pub fn classify(front: bool, right: bool, back: bool, left: bool) -> Self {
        if front {
            Self::Front
        } else if right {
            Self::Right
        } else if back {
            Self::Back
        } else if left {
            Self::Left
        } else {
            Self::None
        }
    }
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Front => "Front",
            Self::Right => "Right",
            Self::Back => "Back",
            Self::Left => "Left",
        }
    }
}

/// Anything that can report the beacon direction without blocking
pub trait BeaconSensor {
    fn beacon(&mut self) -> IrBeacon;
}

/// Four IR receivers facing front, right, back and left
pub struct IrReceiver<F: InputPin, R: InputPin, B: InputPin, L: InputPin> {
    front: F,
    right: R,
    back: B,
    left: L,
    active_low: bool,
}

impl<F: InputPin, R: InputPin, B: InputPin, L: InputPin> IrReceiver<F, R, B, L> {
    /// Demodulating receivers pull their output low while they see the beacon, pass `active_low = true` for those
    pub fn new(front: F, right: R, back: B, left: L, active_low: bool) -> Self {
        Self {
            front,
            right,
            back,
            left,
            active_low,
        }
    }
}

fn detects<P: InputPin>(pin: &P, active_low: bool) -> bool {
    if active_low {
        pin.is_low().unwrap_or(false)
    } else {
        pin.is_high().unwrap_or(false)
    }
}

impl<F: InputPin, R: InputPin, B: InputPin, L: InputPin> BeaconSensor for IrReceiver<F, R, B, L> {
    fn beacon(&mut self) -> IrBeacon {
        IrBeacon::classify(
            detects(&self.front, self.active_low),
            detects(&self.right, self.active_low),
            detects(&self.back, self.active_low),
            detects(&self.left, self.active_low),
        )
    }
}
