//! Boolean compatibility surface.
//!
//! Existing callers of the native binding see exactly five calls that each
//! answer `true` or `false`:
//!
//! | Call | Returns `false` when |
//! |------|----------------------|
//! | `init(type, length)` | a session is already open, `length` is negative, or the driver fails |
//! | `brightness(level)` | `level` is outside `0..=255` (a diagnostic is logged) |
//! | `update(data)` | no session is open or `data` has the wrong length |
//! | `wait()` | no session is open |
//!
//! A status reported by the driver's render or wait is logged but does not
//! change the answer: `update` is `true` once the frame was handed to the
//! driver, and `wait` is `true` once the driver returned.
//! | `close()` | no session was open (the hardware is released regardless) |
//!
//! [`RawBridge`] provides these over any [`LedDriver`]. The `ws2811_*` free
//! functions drive one process-wide bridge over the real hardware, and the
//! `ws2811_bridge_*` symbols export the same calls through the C ABI.

use std::os::raw::c_int;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::warn;

use crate::driver::{HardwareConfig, LedDriver};
use crate::error::{Result, StripError};
use crate::hardware::Ws281xDriver;
use crate::session::StripSession;

/// A strip session whose results are collapsed to `bool`.
#[derive(Debug)]
pub struct RawBridge<D: LedDriver> {
    session: StripSession<D>,
}

impl<D: LedDriver> RawBridge<D> {
    pub fn new(session: StripSession<D>) -> Self {
        Self { session }
    }

    /// Open the session for `length` LEDs of colour order `strip_type`.
    pub fn init(&mut self, strip_type: i32, length: i32) -> bool {
        let result = usize::try_from(length)
            .map_err(|_| StripError::InvalidLength {
                length: i64::from(length),
            })
            .and_then(|count| self.session.initialize(strip_type, count));
        collapse("init", result)
    }

    /// Set the brightness used by the next update.
    pub fn brightness(&mut self, level: i32) -> bool {
        collapse("brightness", self.session.set_brightness(level))
    }

    /// Push one frame; each `i32` is a packed pixel bit pattern.
    pub fn update(&mut self, data: &[i32]) -> bool {
        let pixels: Vec<u32> = data.iter().map(|&v| v as u32).collect();
        collapse("update", tolerate_driver_status(self.session.push_frame(&pixels)))
    }

    /// Block until the last update has been transmitted.
    pub fn wait(&mut self) -> bool {
        collapse("wait", tolerate_driver_status(self.session.wait()))
    }

    /// Release the hardware; returns whether a session was open.
    pub fn close(&mut self) -> bool {
        self.session.close()
    }

    pub fn session(&self) -> &StripSession<D> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut StripSession<D> {
        &mut self.session
    }
}

/// Accept a frame or wait the driver reported a bad status for.
fn tolerate_driver_status(result: Result<()>) -> Result<()> {
    match result {
        Err(StripError::Driver { operation, status }) => {
            warn!(operation, %status, "Ignoring WS2811 driver status");
            Ok(())
        }
        other => other,
    }
}

fn collapse(call: &'static str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            // brightness already logged its own diagnostic
            if !matches!(err, StripError::BrightnessOutOfRange { .. }) {
                warn!(call, error = %err, "WS2811 call rejected");
            }
            false
        }
    }
}

/// The process-wide bridge; `None` while the hardware could not be claimed.
static GLOBAL: Lazy<Mutex<Option<RawBridge<Ws281xDriver>>>> = Lazy::new(|| Mutex::new(None));

fn with_global<R>(f: impl FnOnce(&mut RawBridge<Ws281xDriver>) -> R, idle: R) -> R {
    let mut guard = GLOBAL.lock();
    if guard.is_none() {
        match Ws281xDriver::new() {
            Ok(driver) => {
                *guard = Some(RawBridge::new(StripSession::with_hardware(
                    driver,
                    HardwareConfig::default(),
                )));
            }
            Err(err) => {
                warn!(error = %err, "Unable to claim WS2811 hardware");
                return idle;
            }
        }
    }
    match guard.as_mut() {
        Some(bridge) => f(bridge),
        None => idle,
    }
}

/// Initialise the strip. Only one session may be open at once.
pub fn ws2811_init(strip_type: i32, length: i32) -> bool {
    with_global(|b| b.init(strip_type, length), false)
}

/// Set the brightness level, `0..=255`.
pub fn ws2811_brightness(level: i32) -> bool {
    with_global(|b| b.brightness(level), false)
}

/// Send one frame; `data` must have the length given to [`ws2811_init`].
pub fn ws2811_update(data: &[i32]) -> bool {
    with_global(|b| b.update(data), false)
}

/// Wait for the DMA transfer of the last frame to finish.
pub fn ws2811_wait() -> bool {
    with_global(|b| b.wait(), false)
}

/// Shut the strip down.
pub fn ws2811_close() -> bool {
    with_global(|b| b.close(), false)
}

/// C ABI for [`ws2811_init`].
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn ws2811_bridge_init(strip_type: c_int, length: c_int) -> bool {
    ws2811_init(strip_type, length)
}

/// C ABI for [`ws2811_brightness`].
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn ws2811_bridge_brightness(level: c_int) -> bool {
    ws2811_brightness(level)
}

/// C ABI for [`ws2811_update`].
///
/// # Safety
///
/// `data` must point to `len` readable `i32` values, or be null with `len == 0`.
#[allow(unsafe_code)]
#[no_mangle]
pub unsafe extern "C" fn ws2811_bridge_update(data: *const i32, len: usize) -> bool {
    if data.is_null() {
        if len != 0 {
            warn!(len, "ws2811_bridge_update called with null data");
            return false;
        }
        return ws2811_update(&[]);
    }
    // SAFETY: caller guarantees data points to len valid values
    let frame = unsafe { std::slice::from_raw_parts(data, len) };
    ws2811_update(frame)
}

/// C ABI for [`ws2811_wait`].
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn ws2811_bridge_wait() -> bool {
    ws2811_wait()
}

/// C ABI for [`ws2811_close`].
#[allow(unsafe_code)]
#[no_mangle]
pub extern "C" fn ws2811_bridge_close() -> bool {
    ws2811_close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;

    fn bridge() -> RawBridge<MockDriver> {
        RawBridge::new(StripSession::new(MockDriver::new()))
    }

    #[test]
    fn test_negative_length_rejected() {
        let mut b = bridge();
        assert!(!b.init(0, -1));
        assert!(!b.session().is_active());
        assert_eq!(b.session().driver().calls().init, 0);
    }

    #[test]
    fn test_update_reinterprets_bits() {
        let mut b = bridge();
        assert!(b.init(0, 2));
        assert!(b.update(&[-1, 0x00ff_00ff]));
        assert_eq!(b.session().pixels(), &[0xffff_ffff, 0x00ff_00ff]);
    }

    #[test]
    fn test_render_status_does_not_fail_update() {
        let mut b = bridge();
        assert!(b.init(0, 2));
        b.session_mut()
            .driver_mut()
            .fail_next_render(crate::error::DriverStatus::Dma);
        assert!(b.update(&[1, 2]));
        assert_eq!(b.session().pixels(), &[1, 2]);
        assert!(b.session().is_active());
    }

    #[test]
    fn test_driver_failure_collapses_to_false() {
        let mut b = bridge();
        b.session_mut()
            .driver_mut()
            .fail_next_init(crate::error::DriverStatus::MemLock);
        assert!(!b.init(0, 4));
        assert!(b.init(0, 4));
    }
}
