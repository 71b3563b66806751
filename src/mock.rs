//! In-memory [`LedDriver`] for tests and demos without strip hardware.
//!
//! `MockDriver` follows the rpi_ws281x contract closely enough for sequencing
//! tests: it allocates a zeroed buffer per channel on `init`, records every
//! rendered frame together with the brightness that applied to it, and can
//! be told to fail the next `init`, `render` or `wait` with a chosen status.
//!
//! # Example
//!
//! ```
//! use ws2811_bridge::mock::MockDriver;
//! use ws2811_bridge::StripSession;
//!
//! let mut session = StripSession::new(MockDriver::new());
//! session.initialize(0x081000, 3).unwrap();
//! session.push_frame(&[1, 2, 3]).unwrap();
//! assert_eq!(session.driver().rendered_frames()[0].pixels, vec![1, 2, 3]);
//! ```

use std::time::Duration;

use tracing::debug;

use crate::driver::{DriverConfig, LedDriver, CHANNEL_COUNT};
use crate::error::DriverStatus;

/// A frame captured by [`MockDriver::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    /// Channel 0 pixels at render time
    pub pixels: Vec<u32>,
    /// Channel 0 brightness at render time
    pub brightness: u8,
}

/// Call counters kept by [`MockDriver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub init: usize,
    pub render: usize,
    pub wait: usize,
    pub fini: usize,
}

/// Simulated LED driver.
#[derive(Debug, Default)]
pub struct MockDriver {
    config: Option<DriverConfig>,
    brightness: [u8; CHANNEL_COUNT],
    leds: [Vec<u32>; CHANNEL_COUNT],
    frames: Vec<RenderedFrame>,
    pending_render: bool,
    calls: CallCounts,
    fail_init: Option<DriverStatus>,
    fail_render: Option<DriverStatus>,
    fail_wait: Option<DriverStatus>,
    wait_delay: Option<Duration>,
}

impl MockDriver {
    /// Create an idle mock driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `init` fail with `status`.
    pub fn fail_next_init(&mut self, status: DriverStatus) {
        self.fail_init = Some(status);
    }

    /// Make the next `render` fail with `status`.
    pub fn fail_next_render(&mut self, status: DriverStatus) {
        self.fail_render = Some(status);
    }

    /// Make the next `wait` fail with `status`.
    pub fn fail_next_wait(&mut self, status: DriverStatus) {
        self.fail_wait = Some(status);
    }

    /// Simulate transmission time: `wait` sleeps this long when a render is pending.
    pub fn with_wait_delay(mut self, delay: Duration) -> Self {
        self.wait_delay = Some(delay);
        self
    }

    /// Configuration from the last successful `init`, cleared by `fini`.
    pub fn config(&self) -> Option<&DriverConfig> {
        self.config.as_ref()
    }

    /// Whether the driver currently holds (simulated) resources.
    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    /// Every frame rendered so far, oldest first.
    pub fn rendered_frames(&self) -> &[RenderedFrame] {
        &self.frames
    }

    /// Most recently rendered frame.
    pub fn last_frame(&self) -> Option<&RenderedFrame> {
        self.frames.last()
    }

    /// How often each driver call was made.
    pub fn calls(&self) -> CallCounts {
        self.calls
    }

    /// Whether a render has been issued that no `wait` has observed yet.
    pub fn render_pending(&self) -> bool {
        self.pending_render
    }
}

impl LedDriver for MockDriver {
    fn init(&mut self, config: &DriverConfig) -> Result<(), DriverStatus> {
        self.calls.init += 1;
        if let Some(status) = self.fail_init.take() {
            debug!(%status, "Mock init failing on request");
            return Err(status);
        }

        for (index, channel) in config.channels.iter().enumerate() {
            self.leds[index] = vec![0; channel.count];
            self.brightness[index] = channel.brightness;
        }
        self.config = Some(*config);
        Ok(())
    }

    fn set_brightness(&mut self, channel: usize, brightness: u8) {
        if let Some(slot) = self.brightness.get_mut(channel) {
            *slot = brightness;
        }
    }

    fn brightness(&self, channel: usize) -> u8 {
        self.brightness.get(channel).copied().unwrap_or(0)
    }

    fn leds(&self, channel: usize) -> &[u32] {
        self.leds.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    fn leds_mut(&mut self, channel: usize) -> &mut [u32] {
        match self.leds.get_mut(channel) {
            Some(leds) => leds.as_mut_slice(),
            None => &mut [],
        }
    }

    fn render(&mut self) -> Result<(), DriverStatus> {
        self.calls.render += 1;
        if let Some(status) = self.fail_render.take() {
            return Err(status);
        }
        if self.config.is_none() {
            return Err(DriverStatus::Generic);
        }

        self.frames.push(RenderedFrame {
            pixels: self.leds[0].clone(),
            brightness: self.brightness[0],
        });
        self.pending_render = true;
        Ok(())
    }

    fn wait(&mut self) -> Result<(), DriverStatus> {
        self.calls.wait += 1;
        if let Some(status) = self.fail_wait.take() {
            return Err(status);
        }
        if self.pending_render {
            if let Some(delay) = self.wait_delay {
                std::thread::sleep(delay);
            }
        }
        self.pending_render = false;
        Ok(())
    }

    fn fini(&mut self) {
        self.calls.fini += 1;
        self.config = None;
        self.leds = Default::default();
        self.pending_render = false;
    }
}
