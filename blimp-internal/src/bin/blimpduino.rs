#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use arduino_hal::{
    simple_pwm::{IntoPwmPin, Prescaler, Timer0Pwm, Timer2Pwm},
    Adc, Delay,
};
#[cfg(feature = "compass")]
use arduino_hal::I2c;
#[cfg(feature = "compass")]
use blimp_internal::hmc6352::Hmc6352;
#[cfg(not(feature = "compass"))]
use blimp_internal::instruments::NoCompass;
use blimp_internal::{
    board::{AdcBattery, SerialRx, PIN_MAP},
    command::CommandParser,
    elevator::ServoAngle,
    flightctl::{Actuators, FlightController},
    instruments::SensorHub,
    ir::IrReceiver,
    l293::L293Channel,
    maxsonar::MaxSonar,
    pulse::{Clock, PolledPulseIn},
    servo::Servo,
    timer::Timer0Clock,
    BlimpConfig, SERIAL_BAUD,
};
use panic_halt as _;

#[arduino_hal::entry]
fn main() -> ! {
    let peripherals = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(peripherals);
    let mut serial = arduino_hal::default_serial!(peripherals, pins, SERIAL_BAUD);
    let mut rx = SerialRx::listen();

    // Timer0 is shared by the left motor PWM and the millisecond clock
    let clock = Timer0Clock::start(&peripherals.TC0);
    let timer0 = Timer0Pwm::new(peripherals.TC0, Prescaler::Prescale64);
    let timer2 = Timer2Pwm::new(peripherals.TC2, Prescaler::Prescale64);
    let left = L293Channel::new(pins.d4.into_output(), pins.d5.into_output().into_pwm(&timer0));
    let right = L293Channel::new(pins.d2.into_output(), pins.d3.into_output().into_pwm(&timer2));

    let servo = Servo::new(false, true, peripherals.TC1, ServoAngle::CENTER);
    pins.d10.into_output();

    let ir = IrReceiver::new(
        pins.d8.into_floating_input(),
        pins.d6.into_floating_input(),
        pins.d7.into_floating_input(),
        pins.d9.into_floating_input(),
        true,
    );
    let mut adc = Adc::new(peripherals.ADC, Default::default());
    let battery_channel = pins.a0.into_analog_input(&mut adc).into_channel();
    let battery = AdcBattery::new(adc, battery_channel);
    let sonar = MaxSonar::new(
        PolledPulseIn::new(pins.a2.into_floating_input(), clock),
        pins.a1.into_output(),
        Delay::new(),
    );
    #[cfg(feature = "compass")]
    let compass = Hmc6352::new(
        I2c::new(
            peripherals.TWI,
            pins.a4.into_pull_up_input(),
            pins.a5.into_pull_up_input(),
            50000,
        ),
        Delay::new(),
    );
    #[cfg(not(feature = "compass"))]
    let compass = NoCompass;

    let sensors = SensorHub::new(battery, ir, sonar, compass);
    let actuators = Actuators::new(left, right, servo);
    let mut blimp = FlightController::new(BlimpConfig::DEFAULT, actuators, sensors);

    // SAFETY: the clock and the receive ring are only touched inside critical sections
    unsafe { avr_device::interrupt::enable() };

    let _ = ufmt::uwriteln!(&mut serial, "Blimpduino starting");
    for (function, pin) in PIN_MAP.iter() {
        let _ = ufmt::uwriteln!(&mut serial, "{}: {}", function, pin);
    }
    if blimp.sensors_mut().sonar_mut().initialize_once() {
        let _ = ufmt::uwriteln!(&mut serial, "MaxSonar ready");
    }
    let _ = ufmt::uwriteln!(&mut serial, "Starting flight control loop");

    let mut parser = CommandParser::new();
    loop {
        // At most one command per pass, the rest waits in the receive ring
        let mut command = None;
        while let Some(byte) = rx.read() {
            match parser.push(byte) {
                Some(Ok(cmd)) => {
                    command = Some(cmd);
                    break;
                }
                Some(Err(_)) => {
                    let _ = ufmt::uwriteln!(&mut serial, "Invalid command");
                }
                None => {}
            }
        }
        blimp.control_cycle(clock.millis(), command, &mut serial);
    }
}
