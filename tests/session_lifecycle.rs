//! Strip session lifecycle tests against the in-memory driver.
//!
//! Covers the session state machine end to end: the active flag gating
//! frames and waits, the single-session guard, strict frame lengths,
//! brightness validation and idempotent close.

use tracing_test::traced_test;
use ws2811_bridge::mock::MockDriver;
use ws2811_bridge::{DriverStatus, StripError, StripSession, StripType};

// =============================================================================
// End-to-end scenario
// =============================================================================

#[test]
#[traced_test]
fn test_full_scenario() {
    let mut session = StripSession::new(MockDriver::new());

    session.initialize(0x00, 10).unwrap();

    let frame: Vec<u32> = (1..=10).collect();
    session.push_frame(&frame).unwrap();

    let short: Vec<u32> = (1..=9).collect();
    assert!(matches!(
        session.push_frame(&short),
        Err(StripError::LengthMismatch {
            expected: 10,
            actual: 9
        })
    ));

    assert!(session.set_brightness(300).is_err());
    assert!(logs_contain("WS2811 brightness set to 300"));

    session.set_brightness(128).unwrap();
    session.wait().unwrap();

    assert!(session.close());
    assert!(!session.close());

    let driver = session.driver();
    assert_eq!(driver.rendered_frames().len(), 1);
    assert_eq!(driver.rendered_frames()[0].pixels, frame);
    assert_eq!(driver.rendered_frames()[0].brightness, 255);
}

#[test]
fn test_brightness_applies_at_next_render() {
    let mut session = StripSession::new(MockDriver::new());
    session.initialize(StripType::Grb.code(), 2).unwrap();

    session.push_frame(&[1, 2]).unwrap();
    session.set_brightness(40).unwrap();
    session.push_frame(&[3, 4]).unwrap();

    let frames = session.driver().rendered_frames();
    assert_eq!(frames[0].brightness, 255);
    assert_eq!(frames[1].brightness, 40);
    assert_eq!(frames[1].pixels, vec![3, 4]);
}

// =============================================================================
// State machine against a model
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    Init,
    Brightness(i32),
    Push(usize),
    Wait,
    Close,
}

const PIXELS: usize = 4;

const OPS: [Op; 8] = [
    Op::Init,
    Op::Brightness(7),
    Op::Brightness(256),
    Op::Push(PIXELS),
    Op::Push(PIXELS - 1),
    Op::Push(PIXELS + 1),
    Op::Wait,
    Op::Close,
];

/// Apply `op` to both the session and a two-state model; the outcomes must agree.
fn step(session: &mut StripSession<MockDriver>, active: &mut bool, op: Op, tag: u32) {
    match op {
        Op::Init => {
            let expected = !*active;
            assert_eq!(session.initialize(0, PIXELS).is_ok(), expected, "{:?}", op);
            *active = true;
        }
        Op::Brightness(v) => {
            let expected = (0..=255).contains(&v);
            assert_eq!(session.set_brightness(v).is_ok(), expected, "{:?}", op);
        }
        Op::Push(len) => {
            let before = session.pixels().to_vec();
            let frame = vec![tag; len];
            let expected = *active && len == PIXELS;
            assert_eq!(session.push_frame(&frame).is_ok(), expected, "{:?}", op);
            if expected {
                assert_eq!(session.pixels(), frame.as_slice());
            } else {
                assert_eq!(session.pixels(), before.as_slice());
            }
        }
        Op::Wait => {
            assert_eq!(session.wait().is_ok(), *active, "{:?}", op);
        }
        Op::Close => {
            assert_eq!(session.close(), *active, "{:?}", op);
            *active = false;
        }
    }
    assert_eq!(session.is_active(), *active);
}

#[test]
fn test_all_short_sequences_match_model() {
    let n = OPS.len();
    for a in 0..n {
        for b in 0..n {
            for c in 0..n {
                for d in 0..n {
                    let mut session = StripSession::new(MockDriver::new());
                    let mut active = false;
                    for (i, &idx) in [a, b, c, d].iter().enumerate() {
                        step(&mut session, &mut active, OPS[idx], i as u32 + 1);
                    }
                }
            }
        }
    }
}

// =============================================================================
// Driver failures
// =============================================================================

#[test]
fn test_failed_init_does_not_open_session() {
    let mut session = StripSession::new(MockDriver::new());
    session.driver_mut().fail_next_init(DriverStatus::HwNotSupported);

    let err = session.initialize(0, 3).unwrap_err();
    assert!(err.is_driver_error());
    assert!(!session.is_active());
    assert!(session.wait().is_err());
    assert!(!session.close());
}

#[test]
fn test_wait_failure_keeps_session_open() {
    let mut session = StripSession::new(MockDriver::new());
    session.initialize(0, 1).unwrap();
    session.push_frame(&[5]).unwrap();
    session.driver_mut().fail_next_wait(DriverStatus::Dma);

    assert!(matches!(
        session.wait(),
        Err(StripError::Driver {
            operation: "wait",
            status: DriverStatus::Dma
        })
    ));
    assert!(session.is_active());
    session.wait().unwrap();
}

// =============================================================================
// Ownership
// =============================================================================

#[test]
fn test_reopen_after_close_uses_new_length() {
    let mut session = StripSession::new(MockDriver::new());
    session.initialize(StripType::Rgb.code(), 3).unwrap();
    assert!(session.close());

    session.initialize(StripType::Bgr.code(), 5).unwrap();
    assert_eq!(session.pixel_count(), Some(5));
    assert_eq!(session.strip_type(), Some(StripType::Bgr.code()));
    session.push_frame(&[0; 5]).unwrap();
    assert!(session.push_frame(&[0; 3]).is_err());
}

#[test]
fn test_session_moves_between_threads() {
    let mut session = StripSession::new(
        MockDriver::new().with_wait_delay(std::time::Duration::from_millis(5)),
    );
    session.initialize(0, 2).unwrap();

    let handle = std::thread::spawn(move || {
        session.push_frame(&[1, 2]).unwrap();
        session.wait().unwrap();
        session
    });

    let mut session = handle.join().unwrap();
    assert!(!session.driver().render_pending());
    assert!(session.close());
}
