mod common;

use blimp_internal::maxsonar::{
    Ranging, MAXSONAR_ECHO_TIMEOUT_US, MAXSONAR_PING_DELAY_MS, MAXSONAR_SETTLE_MS,
};
use common::test_sonar;

#[test]
pub fn initializes_exactly_once() {
    let (mut sonar, _echo, rx, delay) = test_sonar();
    assert!(!sonar.is_initialized());
    assert!(sonar.initialize_once());
    assert!(!sonar.initialize_once());
    sonar.update(1000);
    sonar.update(2000);

    let levels = rx.levels.borrow();
    assert_eq!(levels[..3], [true, false, true]);
    let delays = delay.delays.borrow();
    assert_eq!(delays.iter().filter(|ms| **ms == MAXSONAR_SETTLE_MS).count(), 1);
    assert_eq!(delays[0], MAXSONAR_SETTLE_MS);
}

#[test]
pub fn update_initializes_on_first_use() {
    let (mut sonar, _echo, rx, delay) = test_sonar();
    sonar.update(0);
    assert!(sonar.is_initialized());
    assert_eq!(*rx.levels.borrow(), vec![true, false, true]);
    assert_eq!(*delay.delays.borrow(), vec![MAXSONAR_SETTLE_MS]);
}

#[test]
pub fn one_measurement_per_interval() {
    let (mut sonar, echo, _rx, _delay) = test_sonar();
    echo.set_inches(48);
    sonar.update(1000);
    assert_eq!(echo.count.get(), 1);
    assert_eq!(sonar.distance(), 48);
    assert_eq!(sonar.last_reading_ms(), 1000);

    echo.set_inches(12);
    sonar.update(1400);
    assert_eq!(echo.count.get(), 1);
    assert_eq!(sonar.distance(), 48);

    sonar.update(1501);
    assert_eq!(echo.count.get(), 2);
    assert_eq!(sonar.distance(), 12);
}

#[test]
pub fn measurement_pings_through_rx() {
    let (mut sonar, echo, rx, delay) = test_sonar();
    sonar.initialize_once();
    rx.levels.borrow_mut().clear();
    delay.delays.borrow_mut().clear();

    echo.set_inches(20);
    sonar.update(600);
    assert_eq!(*rx.levels.borrow(), vec![true, false]);
    assert_eq!(*delay.delays.borrow(), vec![MAXSONAR_PING_DELAY_MS]);
    // The echo wait is bounded at 200ms
    assert_eq!(*echo.timeouts.borrow(), vec![200_000]);
    assert_eq!(MAXSONAR_ECHO_TIMEOUT_US, 200_000);
}

#[test]
pub fn missing_echo_reads_zero() {
    let (mut sonar, echo, _rx, _delay) = test_sonar();
    echo.set_inches(30);
    sonar.update(1000);
    assert_eq!(sonar.distance(), 30);

    echo.width_us.set(0);
    sonar.update(2000);
    assert_eq!(sonar.distance(), 0);
}

#[test]
pub fn survives_clock_wrap() {
    let (mut sonar, echo, _rx, _delay) = test_sonar();
    echo.set_inches(10);
    sonar.update(u32::MAX - 100);
    assert_eq!(echo.count.get(), 1);
    sonar.update(200);
    assert_eq!(echo.count.get(), 1);
    sonar.update(500);
    assert_eq!(echo.count.get(), 2);
}
