use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

use carafe_hardware::error::HwError;
use carafe_hardware::util::{debounce, wait_until_low_with_timeout};

#[test]
fn wait_until_low_success_path() {
    let high = Arc::new(AtomicBool::new(true));
    let high_bg = high.clone();
    // Line drops shortly after we start waiting
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(3));
        high_bg.store(false, Ordering::Relaxed);
    });

    let res = wait_until_low_with_timeout(
        || high.load(Ordering::Relaxed),
        Duration::from_millis(200),
        Duration::from_micros(200),
    );
    assert!(res.is_ok(), "expected success, got {res:?}");
}

#[test]
fn wait_until_low_timeout_path() {
    let high = Arc::new(AtomicBool::new(true));

    let err = wait_until_low_with_timeout(
        || high.load(Ordering::Relaxed),
        Duration::from_millis(5),
        Duration::from_micros(200),
    )
    .expect_err("expected timeout error");

    match err {
        HwError::DataReadyTimeout => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn debounce_drops_presses_inside_the_window() {
    let t0 = Instant::now();
    let window = Duration::from_millis(50);
    let mut last = None;
    assert!(debounce(&mut last, t0, window));
    assert!(!debounce(&mut last, t0 + Duration::from_millis(20), window));
    assert!(debounce(&mut last, t0 + Duration::from_millis(50), window));
    // The accepted press restarts the window
    assert!(!debounce(&mut last, t0 + Duration::from_millis(90), window));
}
