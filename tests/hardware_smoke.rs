#![cfg(feature = "hardware_tests")]
//! WS2811 hardware smoke test.
//!
//! Drives a real strip through rpi_ws281x. Needs root (for /dev/mem) and a
//! strip wired to the configured pin.
//!
//! Run with:
//! `WS2811_HARDWARE_TEST=1 WS2811_TEST_COUNT=8 cargo test --test hardware_smoke --features hardware_tests -- --nocapture`

use std::time::Duration;

use serial_test::serial;
use ws2811_bridge::raw;
use ws2811_bridge::{DriverStatus, StripSession, StripType, Ws281xDriver};

fn hardware_test_enabled() -> bool {
    std::env::var("WS2811_HARDWARE_TEST")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

fn pixel_count() -> usize {
    std::env::var("WS2811_TEST_COUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8)
}

macro_rules! skip_if_disabled {
    () => {
        if !hardware_test_enabled() {
            eprintln!("WS2811 hardware test skipped (set WS2811_HARDWARE_TEST=1 to enable)");
            return;
        }
    };
}

#[test]
#[serial(ws2811_hardware)]
fn test_session_then_global_surface_on_hardware() {
    skip_if_disabled!();

    let count = pixel_count();
    let mut session = StripSession::new(Ws281xDriver::new().expect("claim hardware"));
    session
        .initialize(StripType::WS2812.code(), count)
        .expect("ws2811_init");

    session.set_brightness(32).unwrap();
    for i in 0..count {
        let mut frame = vec![0u32; count];
        frame[i] = 0x0000_ff00;
        session.push_frame(&frame).unwrap();
        session.wait().unwrap();
        std::thread::sleep(Duration::from_millis(50));
    }

    session.push_frame(&vec![0; count]).unwrap();
    session.wait().unwrap();
    assert!(session.close());
    assert!(!session.close());
    drop(session);

    // The global bridge keeps its claim for the rest of the process, so it
    // must come after every explicitly owned driver.
    let count = count as i32;
    assert!(raw::ws2811_init(StripType::WS2812.code(), count));
    assert!(!raw::ws2811_init(StripType::WS2812.code(), count));
    assert!(raw::ws2811_brightness(16));
    assert!(raw::ws2811_update(&vec![0x0010_0000; count as usize]));
    assert!(!raw::ws2811_update(&vec![0; count as usize + 1]));
    assert!(raw::ws2811_wait());
    assert!(raw::ws2811_update(&vec![0; count as usize]));
    assert!(raw::ws2811_wait());
    assert!(raw::ws2811_close());
    assert!(!raw::ws2811_close());
}

#[test]
fn test_library_describes_statuses() {
    skip_if_disabled!();

    for status in [DriverStatus::Success, DriverStatus::Dma, DriverStatus::IllegalGpio] {
        // SAFETY: the hardware feature links libws2811
        let message = unsafe { status.library_message() };
        println!("{:?}: {}", status, message);
        assert!(!message.is_empty());
    }
}
