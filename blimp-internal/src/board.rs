use core::cell::RefCell;

use arduino_hal::{adc::Channel, pac::USART0, Adc};
use avr_device::interrupt::{self, Mutex};

use crate::instruments::BatteryMonitor;

/// Wiring of the Blimpduino board as `(function, pin)`. The `blimpduino` bootstrap follows it pin for pin
pub const PIN_MAP: [(&str, &str); 13] = [
    ("battery", "A0"),
    ("right motor direction", "D2"),
    ("right motor speed", "D3"),
    ("left motor direction", "D4"),
    ("left motor speed", "D5"),
    ("IR right", "D6"),
    ("IR back", "D7"),
    ("IR front", "D8"),
    ("IR left", "D9"),
    ("vectoring servo", "D10"),
    ("MaxSonar RX", "A1"),
    ("MaxSonar PW", "A2"),
    ("HMC6352 SDA/SCL", "A4/A5"),
];

/// ADC reference voltage, the Uno runs its ADC off the 5V rail
pub const ADC_REFERENCE_VOLTS: f32 = 5.0;
/// Largest value returned by the 10 bit ADC
pub const ADC_MAX: u16 = 1023;

/// Battery divider tap read through the ADC
pub struct AdcBattery {
    adc: Adc,
    channel: Channel,
}

impl AdcBattery {
    pub fn new(adc: Adc, channel: Channel) -> Self {
        Self { adc, channel }
    }
    pub fn dissolve(self) -> (Adc, Channel) {
        (self.adc, self.channel)
    }
}

impl BatteryMonitor for AdcBattery {
    fn voltage(&mut self) -> f32 {
        let raw = self.adc.read_blocking(&self.channel);
        raw as f32 * ADC_REFERENCE_VOLTS / ADC_MAX as f32
    }
}

/// Bytes the receive interrupt can hold while the control loop is busy pinging the sonar
pub const RX_BUFFER_SIZE: usize = 64;

struct RxRing {
    buffer: [u8; RX_BUFFER_SIZE],
    head: usize,
    len: usize,
}

impl RxRing {
    const fn new() -> Self {
        Self {
            buffer: [0u8; RX_BUFFER_SIZE],
            head: 0,
            len: 0,
        }
    }
    /// Drops the byte if the ring is full
    fn push(&mut self, byte: u8) {
        if self.len == RX_BUFFER_SIZE {
            return;
        }
        self.buffer[(self.head + self.len) % RX_BUFFER_SIZE] = byte;
        self.len += 1;
    }
    fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        let byte = self.buffer[self.head];
        self.head = (self.head + 1) % RX_BUFFER_SIZE;
        self.len -= 1;
        Some(byte)
    }
}

static RX_RING: Mutex<RefCell<RxRing>> = Mutex::new(RefCell::new(RxRing::new()));

#[avr_device::interrupt(atmega328p)]
fn USART_RX() {
    interrupt::free(|cs| {
        // SAFETY: reading UDR0 only pops the receive FIFO, the serial driver never reads it once we listen
        let usart = unsafe { &*USART0::ptr() };
        let byte = usart.udr0.read().bits();
        RX_RING.borrow(cs).borrow_mut().push(byte);
    })
}

/// Interrupt driven receive side of the command link. The serial driver keeps the transmit side
pub struct SerialRx {
    _private: (),
}

impl SerialRx {
    /// Enables the receive complete interrupt. Call after the serial driver is set up, it rewrites UCSR0B.
    /// Interrupts still have to be enabled globally
    pub fn listen() -> Self {
        // SAFETY: single read-modify-write at boot, before interrupts are enabled
        let usart = unsafe { &*USART0::ptr() };
        usart.ucsr0b.modify(|_, w| w.rxcie0().set_bit());
        Self { _private: () }
    }

    pub fn read(&mut self) -> Option<u8> {
        interrupt::free(|cs| RX_RING.borrow(cs).borrow_mut().pop())
    }
}
