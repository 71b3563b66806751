//! The seam between a strip session and the external LED driver.
//!
//! [`LedDriver`] is the call set the rpi_ws281x library exposes (init, render,
//! wait, fini) plus the two pieces of driver-owned state a session touches:
//! the channel brightness field and the pixel buffer. Sessions are generic
//! over it so the same sequencing runs against [`crate::hardware::Ws281xDriver`]
//! on a Raspberry Pi and [`crate::mock::MockDriver`] everywhere else.

use serde::{Deserialize, Serialize};

use crate::error::DriverStatus;

/// Number of channel slots in the driver's data model.
pub const CHANNEL_COUNT: usize = 2;

/// Index of the one channel this crate drives.
pub const PRIMARY_CHANNEL: usize = 0;

/// Target signal frequency for WS2811/WS2812 strips (`WS2811_TARGET_FREQ`).
pub const TARGET_FREQ_HZ: u32 = 800_000;

/// GPIO pin driving the data line unless configured otherwise.
pub const DEFAULT_GPIO_PIN: i32 = 18;

/// DMA engine claimed unless configured otherwise.
pub const DEFAULT_DMA_CHANNEL: i32 = 5;

/// Brightness a channel is initialized with.
pub const FULL_BRIGHTNESS: u8 = 255;

/// Fixed hardware placement of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Physical pin that drives the signal
    pub gpio_pin: i32,
    /// DMA engine used to stream the bit patterns
    pub dma_channel: i32,
    /// Signal frequency in Hz
    pub frequency_hz: u32,
    /// Invert the output signal (for inverting level shifters)
    pub invert: bool,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            gpio_pin: DEFAULT_GPIO_PIN,
            dma_channel: DEFAULT_DMA_CHANNEL,
            frequency_hz: TARGET_FREQ_HZ,
            invert: false,
        }
    }
}

/// Configuration of one driver channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelConfig {
    pub gpio_pin: i32,
    pub count: usize,
    pub invert: bool,
    pub brightness: u8,
    /// Opaque colour-order code, passed through to the driver
    pub strip_type: i32,
}

impl ChannelConfig {
    /// A channel slot the driver should leave alone.
    pub fn unused() -> Self {
        Self::default()
    }
}

/// The record handed to [`LedDriver::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    pub frequency_hz: u32,
    pub dma_channel: i32,
    pub channels: [ChannelConfig; CHANNEL_COUNT],
}

impl DriverConfig {
    /// Build a configuration that drives a single strip on channel 0.
    ///
    /// Channel 1 is always configured as unused (count 0, brightness 0).
    pub fn single_strip(hardware: &HardwareConfig, strip_type: i32, pixel_count: usize) -> Self {
        Self {
            frequency_hz: hardware.frequency_hz,
            dma_channel: hardware.dma_channel,
            channels: [
                ChannelConfig {
                    gpio_pin: hardware.gpio_pin,
                    count: pixel_count,
                    invert: hardware.invert,
                    brightness: FULL_BRIGHTNESS,
                    strip_type,
                },
                ChannelConfig::unused(),
            ],
        }
    }

    /// The channel this crate drives.
    pub fn primary(&self) -> &ChannelConfig {
        &self.channels[PRIMARY_CHANNEL]
    }
}

/// Operations the external LED driver provides.
///
/// Implementations follow the rpi_ws281x contract: `init` allocates the
/// pixel buffers and claims DMA and GPIO resources, `render` starts an
/// asynchronous transfer, `wait` blocks until it finishes and `fini`
/// releases everything. `fini` must be safe to call when `init` never
/// succeeded.
pub trait LedDriver {
    /// Allocate resources for `config`. On failure the driver rolls back itself.
    fn init(&mut self, config: &DriverConfig) -> Result<(), DriverStatus>;

    /// Write the brightness field of `channel`; takes effect at the next render.
    fn set_brightness(&mut self, channel: usize, brightness: u8);

    /// Current brightness field of `channel`.
    fn brightness(&self, channel: usize) -> u8;

    /// The driver-owned pixel buffer of `channel`, empty before `init`.
    fn leds(&self, channel: usize) -> &[u32];

    /// Mutable access to the driver-owned pixel buffer of `channel`.
    fn leds_mut(&mut self, channel: usize) -> &mut [u32];

    /// Start transmitting the pixel buffers.
    fn render(&mut self) -> Result<(), DriverStatus>;

    /// Block until the previous render has been transmitted.
    fn wait(&mut self) -> Result<(), DriverStatus>;

    /// Release all driver resources.
    fn fini(&mut self);
}

impl<D: LedDriver + ?Sized> LedDriver for Box<D> {
    fn init(&mut self, config: &DriverConfig) -> Result<(), DriverStatus> {
        (**self).init(config)
    }

    fn set_brightness(&mut self, channel: usize, brightness: u8) {
        (**self).set_brightness(channel, brightness)
    }

    fn brightness(&self, channel: usize) -> u8 {
        (**self).brightness(channel)
    }

    fn leds(&self, channel: usize) -> &[u32] {
        (**self).leds(channel)
    }

    fn leds_mut(&mut self, channel: usize) -> &mut [u32] {
        (**self).leds_mut(channel)
    }

    fn render(&mut self) -> Result<(), DriverStatus> {
        (**self).render()
    }

    fn wait(&mut self) -> Result<(), DriverStatus> {
        (**self).wait()
    }

    fn fini(&mut self) {
        (**self).fini()
    }
}
