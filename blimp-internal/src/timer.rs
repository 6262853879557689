use core::cell::Cell;

use arduino_hal::pac::{TC0, TC1};
use avr_device::interrupt::{self, Mutex};

use crate::pulse::Clock;

/// Clock select bits for TCCR1B
#[derive(Clone, Copy)]
pub struct Prescaler(u8);
impl Prescaler {
    /// 4us per tick at 16MHz
    pub const DIV64: Self = Self(0b011);
}

/// Microseconds per timer tick with [Prescaler::DIV64]
pub const US_PER_TICK: u32 = 4;
/// TOP for a 20ms (50hz) servo frame with [Prescaler::DIV64]
pub const TIMER1_SERVO_TOP: u16 = (20_000 / US_PER_TICK - 1) as u16;

/// Timer1 output compare units. A drives D9 (PB1), B drives D10 (PB2)
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OutputCompare {
    A,
    B,
}

/// Timer1 running fast PWM with ICR1 as TOP (waveform mode 14)
pub struct Timer1 {
    timer: TC1,
}

impl Timer1 {
    /// Leaves the timer stopped with every output disconnected
    pub fn fast_pwm(timer: TC1, top: u16) -> Timer1 {
        timer.tccr1b.modify(|_, w| w.cs1().no_clock());
        timer.tcnt1.reset();
        timer.tccr1a.modify(|_, w| w.wgm1().bits(0b10).com1a().bits(0).com1b().bits(0));
        timer.tccr1b.modify(|_, w| w.wgm1().bits(0b11));
        timer.icr1.write(|w| w.bits(top));
        Timer1 { timer }
    }

    /// Non inverting, the pin goes high at BOTTOM and low on compare match
    pub fn connect(&self, output: OutputCompare) {
        match output {
            OutputCompare::A => self.timer.tccr1a.modify(|_, w| w.com1a().bits(0b10)),
            OutputCompare::B => self.timer.tccr1a.modify(|_, w| w.com1b().bits(0b10)),
        }
    }

    pub fn set_compare(&self, output: OutputCompare, ticks: u16) {
        match output {
            OutputCompare::A => self.timer.ocr1a.write(|w| w.bits(ticks)),
            OutputCompare::B => self.timer.ocr1b.write(|w| w.bits(ticks)),
        }
    }

    pub fn start(&self, prescaler: Prescaler) {
        self.timer.tccr1b.modify(|_, w| w.cs1().bits(prescaler.0));
    }

    pub fn stop(&self) {
        self.timer.tccr1b.modify(|_, w| w.cs1().no_clock());
    }

    /// Stops the timer and hands the peripheral back
    pub fn release(self) -> TC1 {
        self.stop();
        self.timer
    }
}

/// Timer0 overflows every 256 ticks, 1024us
const MICROS_PER_OVERFLOW: u32 = 256 * US_PER_TICK;
/// The 24us left over per overflow are kept in units of 8us so they fit a u8
const FRACT_INC: u8 = ((MICROS_PER_OVERFLOW % 1000) >> 3) as u8;
const FRACT_MAX: u8 = (1000 >> 3) as u8;

static TIMER0_OVERFLOWS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));
static TIMER0_MILLIS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));
static TIMER0_FRACT: Mutex<Cell<u8>> = Mutex::new(Cell::new(0));

#[avr_device::interrupt(atmega328p)]
fn TIMER0_OVF() {
    interrupt::free(|cs| {
        let mut millis = TIMER0_MILLIS.borrow(cs).get().wrapping_add(MICROS_PER_OVERFLOW / 1000);
        let mut fract = TIMER0_FRACT.borrow(cs).get() + FRACT_INC;
        if fract >= FRACT_MAX {
            fract -= FRACT_MAX;
            millis = millis.wrapping_add(1);
        }
        TIMER0_MILLIS.borrow(cs).set(millis);
        TIMER0_FRACT.borrow(cs).set(fract);
        let overflows = TIMER0_OVERFLOWS.borrow(cs);
        overflows.set(overflows.get().wrapping_add(1));
    })
}

/// Millisecond and microsecond clock counted from Timer0 overflows.
/// Timer0 keeps running as the PWM timer for D5 and D6, it must be set up with a /64 prescaler
#[derive(Clone, Copy)]
pub struct Timer0Clock {
    _private: (),
}

impl Timer0Clock {
    /// Enables the overflow interrupt. Interrupts still have to be enabled globally
    pub fn start(timer: &TC0) -> Self {
        timer.timsk0.modify(|_, w| w.toie0().set_bit());
        Self { _private: () }
    }
}

impl Clock for Timer0Clock {
    fn millis(&self) -> u32 {
        interrupt::free(|cs| TIMER0_MILLIS.borrow(cs).get())
    }

    fn micros(&self) -> u32 {
        interrupt::free(|cs| {
            // SAFETY: read only access to registers owned by the Timer0 PWM driver
            let tc0 = unsafe { &*TC0::ptr() };
            let mut overflows = TIMER0_OVERFLOWS.borrow(cs).get();
            let ticks = tc0.tcnt0.read().bits();
            // An overflow that happened after interrupts were masked has not been counted yet
            if tc0.tifr0.read().tov0().bit_is_set() && ticks < 255 {
                overflows = overflows.wrapping_add(1);
            }
            ((overflows << 8) | ticks as u32).wrapping_mul(US_PER_TICK)
        })
    }
}
