//! Strip session: single-owner sequencing of an LED strip driver.
//!
//! A [`StripSession`] owns one [`LedDriver`] and moves between two states:
//!
//! ```text
//!          initialize (ok)
//!   idle ------------------> active
//!     ^                        |
//!     +--------- close --------+
//! ```
//!
//! `push_frame` and `wait` require `active`; `initialize` requires `idle`.
//! `set_brightness` is accepted in either state because it only writes the
//! driver's brightness field, which is consulted at the next render. `close`
//! is idempotent and always asks the driver to release its resources.
//!
//! The session does no locking of its own. Drive it from one thread
//! (initialize, then any number of set_brightness / push_frame / wait, then
//! close), or wrap it in a mutex as [`crate::raw`] does. Never close a
//! session from one thread while another thread is inside `push_frame` or
//! `wait`.

use tracing::{debug, error, info, warn};

use crate::driver::{DriverConfig, HardwareConfig, LedDriver, PRIMARY_CHANNEL};
use crate::error::{DriverStatus, Result, StripError};

/// Parameters of the currently open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveStrip {
    pixel_count: usize,
    strip_type: i32,
}

/// Owner of the strip hardware handle.
///
/// # Example
///
/// ```
/// use ws2811_bridge::mock::MockDriver;
/// use ws2811_bridge::{StripSession, StripType};
///
/// let mut session = StripSession::new(MockDriver::new());
/// session.initialize(StripType::Grb.code(), 3)?;
/// session.set_brightness(128)?;
/// session.push_frame(&[0xff0000, 0x00ff00, 0x0000ff])?;
/// session.wait()?;
/// assert!(session.close());
/// # Ok::<(), ws2811_bridge::StripError>(())
/// ```
#[derive(Debug)]
pub struct StripSession<D: LedDriver> {
    driver: D,
    hardware: HardwareConfig,
    active: Option<ActiveStrip>,
}

impl<D: LedDriver> StripSession<D> {
    /// Create an idle session using the default hardware placement (GPIO 18, DMA 5).
    pub fn new(driver: D) -> Self {
        Self::with_hardware(driver, HardwareConfig::default())
    }

    /// Create an idle session with an explicit hardware placement.
    pub fn with_hardware(driver: D, hardware: HardwareConfig) -> Self {
        Self {
            driver,
            hardware,
            active: None,
        }
    }

    /// Open the session.
    ///
    /// Configures channel 0 for `pixel_count` LEDs of colour order
    /// `strip_type` at full brightness and leaves channel 1 unused. The
    /// strip type is an opaque driver code and is not checked here.
    ///
    /// # Errors
    ///
    /// - [`StripError::AlreadyActive`] if a session is open; the open
    ///   session is left untouched.
    /// - [`StripError::Driver`] if the driver rejects the configuration; the
    ///   session stays idle.
    pub fn initialize(&mut self, strip_type: i32, pixel_count: usize) -> Result<()> {
        if self.active.is_some() {
            warn!(strip_type, pixel_count, "Strip session already active");
            return Err(StripError::AlreadyActive);
        }

        let config = DriverConfig::single_strip(&self.hardware, strip_type, pixel_count);

        if let Err(status) = self.driver.init(&config) {
            warn!(%status, strip_type, pixel_count, "Driver refused to initialize strip");
            return Err(StripError::Driver {
                operation: "init",
                status,
            });
        }

        self.active = Some(ActiveStrip {
            pixel_count,
            strip_type,
        });

        info!(
            pixel_count,
            strip_type = %format!("{:#08x}", strip_type),
            gpio_pin = self.hardware.gpio_pin,
            dma_channel = self.hardware.dma_channel,
            "Opened strip session"
        );
        Ok(())
    }

    /// Set the global brightness applied at the next render.
    ///
    /// Accepted whether or not a session is open.
    ///
    /// # Errors
    ///
    /// [`StripError::BrightnessOutOfRange`] for values outside `0..=255`.
    pub fn set_brightness(&mut self, value: i32) -> Result<()> {
        let Ok(level) = u8::try_from(value) else {
            error!("WS2811 brightness set to {}", value);
            return Err(StripError::BrightnessOutOfRange {
                value: i64::from(value),
            });
        };

        self.driver.set_brightness(PRIMARY_CHANNEL, level);
        debug!(brightness = level, "Brightness updated");
        Ok(())
    }

    /// Copy `data` into the pixel buffer and start transmitting it.
    ///
    /// Each element is one packed colour value in the driver's layout. The
    /// call returns once the transfer has been started; use [`Self::wait`]
    /// to block until it has finished.
    ///
    /// # Errors
    ///
    /// - [`StripError::NotActive`] without an open session.
    /// - [`StripError::LengthMismatch`] unless `data.len()` equals the pixel
    ///   count given to `initialize`. The buffer is not modified.
    /// - [`StripError::Driver`] if the driver fails to start the render.
    pub fn push_frame(&mut self, data: &[u32]) -> Result<()> {
        let strip = self.active.ok_or(StripError::NotActive)?;

        if data.len() != strip.pixel_count {
            warn!(
                expected = strip.pixel_count,
                actual = data.len(),
                "Frame length does not match strip"
            );
            return Err(StripError::LengthMismatch {
                expected: strip.pixel_count,
                actual: data.len(),
            });
        }

        let leds = self.driver.leds_mut(PRIMARY_CHANNEL);
        if leds.len() != data.len() {
            // Driver allocated a different buffer than it was configured for
            return Err(StripError::Driver {
                operation: "render",
                status: DriverStatus::Generic,
            });
        }
        leds.copy_from_slice(data);

        self.driver.render().map_err(|status| {
            warn!(%status, "Render failed");
            StripError::Driver {
                operation: "render",
                status,
            }
        })?;

        debug!(pixels = data.len(), "Frame submitted");
        Ok(())
    }

    /// Block until the previously submitted frame has been transmitted.
    ///
    /// # Errors
    ///
    /// - [`StripError::NotActive`] without an open session.
    /// - [`StripError::Driver`] if the driver reports a failure.
    pub fn wait(&mut self) -> Result<()> {
        if self.active.is_none() {
            return Err(StripError::NotActive);
        }

        self.driver.wait().map_err(|status| {
            warn!(%status, "Wait failed");
            StripError::Driver {
                operation: "wait",
                status,
            }
        })?;

        debug!("Frame transmission complete");
        Ok(())
    }

    /// Close the session and release the hardware.
    ///
    /// Returns whether a session was open. The driver is asked to release
    /// its resources in every case, so this is safe to call repeatedly.
    pub fn close(&mut self) -> bool {
        let was_active = self.active.take().is_some();
        self.driver.fini();

        if was_active {
            info!("Closed strip session");
        } else {
            debug!("Close called with no active session");
        }
        was_active
    }

    /// Whether a session is open.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Pixel count of the open session.
    pub fn pixel_count(&self) -> Option<usize> {
        self.active.map(|strip| strip.pixel_count)
    }

    /// Strip type code of the open session.
    pub fn strip_type(&self) -> Option<i32> {
        self.active.map(|strip| strip.strip_type)
    }

    /// Current channel 0 brightness field.
    pub fn brightness(&self) -> u8 {
        self.driver.brightness(PRIMARY_CHANNEL)
    }

    /// The driver-visible pixel buffer (empty when idle).
    pub fn pixels(&self) -> &[u32] {
        self.driver.leds(PRIMARY_CHANNEL)
    }

    /// Hardware placement used by `initialize`.
    pub fn hardware(&self) -> &HardwareConfig {
        &self.hardware
    }

    /// The underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the underlying driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

impl<D: LedDriver> Drop for StripSession<D> {
    fn drop(&mut self) {
        if self.active.is_some() {
            self.close();
        }
    }
}
