//! # WS2811 Bridge
//!
//! Single-session access to a WS2811/WS2812 LED strip driven by the
//! rpi_ws281x library on a Raspberry Pi. The library does the hard part
//! (DMA buffer construction, PWM timing, GPIO multiplexing, colour-order
//! encoding); this crate owns the driver handle and sequences the calls made
//! against it.
//!
//! ## Crate Structure
//!
//! - **`session`**: [`StripSession`], the owner of one strip. It enforces
//!   that `initialize` happens once per session, that frames match the
//!   strip length, and that `close` always releases the hardware.
//! - **`driver`**: The [`LedDriver`] trait sessions are generic over, and the
//!   two-channel [`DriverConfig`] record handed to it.
//! - **`hardware`**: [`Ws281xDriver`], the `LedDriver` over `ws2811-sys`.
//! - **`mock`**: [`mock::MockDriver`], an in-memory driver for tests.
//! - **`raw`**: The boolean compatibility surface (`ws2811_init`,
//!   `ws2811_brightness`, `ws2811_update`, `ws2811_wait`, `ws2811_close`),
//!   also exported through the C ABI.
//! - **`strip_type`**: Named colour-order codes and pixel packing.
//! - **`mapping`** / **`display`**: Drawing on panels folded from one strip.
//! - **`config`** / **`logging`** / **`error`**: Configuration, tracing setup
//!   and the [`StripError`] type.
//!
//! ## Example
//!
//! ```no_run
//! use ws2811_bridge::{StripSession, StripType, Ws281xDriver};
//!
//! # fn main() -> ws2811_bridge::Result<()> {
//! let mut strip = StripSession::new(Ws281xDriver::new()?);
//! strip.initialize(StripType::Grb.code(), 8)?;
//! strip.set_brightness(64)?;
//! strip.push_frame(&[0x00ff0000; 8])?;
//! strip.wait()?;
//! strip.close();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod display;
pub mod driver;
pub mod error;
pub mod hardware;
pub mod logging;
pub mod mapping;
pub mod mock;
pub mod raw;
pub mod session;
pub mod strip_type;

pub use config::BridgeConfig;
pub use display::{LedMatrix, Rgb};
pub use driver::{ChannelConfig, DriverConfig, HardwareConfig, LedDriver};
pub use error::{DriverStatus, ErrorKind, Result, StripError};
pub use hardware::Ws281xDriver;
pub use mapping::{Mapping, Point};
pub use raw::RawBridge;
pub use session::StripSession;
pub use strip_type::{pack_rgb, pack_rgbw, StripType};
