//! Low-level FFI bindings for the rpi_ws281x LED strip driver.
//!
//! This crate provides raw, unsafe bindings to `libws2811`, the C library
//! that generates WS2811/WS2812/SK6812 timing on a Raspberry Pi GPIO pin
//! using DMA-fed PWM (or PCM/SPI) hardware.
//!
//! # Driver Model
//!
//! The library is driven through a single [`ws2811_t`] record holding the
//! target frequency, the DMA engine index and two [`ws2811_channel_t`]
//! slots. After `ws2811_init` succeeds each active channel owns a
//! driver-allocated `leds` buffer of `count` packed pixel values.
//! `ws2811_render` starts a DMA transfer of those buffers, `ws2811_wait`
//! blocks until it completes and `ws2811_fini` releases everything.
//!
//! # Safety
//!
//! All functions in this crate are `unsafe` as they are direct FFI bindings.
//! For a safe wrapper, use the `ws2811-bridge` crate instead.
//!
//! # Features
//!
//! - `ws2811-sdk`: Generate bindings from the system `ws2811.h` and link
//!   `libws2811`. Without this feature, layout-compatible placeholder
//!   bindings are used and every function panics when called.
//!
//! # Example (unsafe)
//!
//! ```no_run
//! use ws2811_sys::*;
//!
//! unsafe {
//!     let mut leds = ws2811_t::default();
//!     leds.freq = WS2811_TARGET_FREQ as _;
//!     leds.dmanum = 10;
//!     leds.channel[0].gpionum = 18;
//!     leds.channel[0].count = 8;
//!     leds.channel[0].brightness = 255;
//!     leds.channel[0].strip_type = WS2811_STRIP_GRB as _;
//!     if ws2811_init(&mut leds) == WS2811_SUCCESS {
//!         *leds.channel[0].leds = 0x00ff0000;
//!         ws2811_render(&mut leds);
//!         ws2811_wait(&mut leds);
//!         ws2811_fini(&mut leds);
//!     }
//! }
//! ```

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]
#![allow(clippy::all)]

// Include the generated bindings
include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

// bindgen prefixes enum constants with the enum name, the dummy bindings use flat names
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_DMA as WS2811_ERROR_DMA;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_GENERIC as WS2811_ERROR_GENERIC;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_GPIO_INIT as WS2811_ERROR_GPIO_INIT;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_HW_NOT_SUPPORTED as WS2811_ERROR_HW_NOT_SUPPORTED;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_ILLEGAL_GPIO as WS2811_ERROR_ILLEGAL_GPIO;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_MAILBOX_DEVICE as WS2811_ERROR_MAILBOX_DEVICE;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_MAP_REGISTERS as WS2811_ERROR_MAP_REGISTERS;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_MEM_LOCK as WS2811_ERROR_MEM_LOCK;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_MMAP as WS2811_ERROR_MMAP;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_OUT_OF_MEMORY as WS2811_ERROR_OUT_OF_MEMORY;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_PCM_SETUP as WS2811_ERROR_PCM_SETUP;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_PWM_SETUP as WS2811_ERROR_PWM_SETUP;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_SPI_SETUP as WS2811_ERROR_SPI_SETUP;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_ERROR_SPI_TRANSFER as WS2811_ERROR_SPI_TRANSFER;
#[cfg(feature = "ws2811-sdk")]
pub use ws2811_return_t_WS2811_SUCCESS as WS2811_SUCCESS;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_codes() {
        assert_eq!(WS2811_SUCCESS, 0);
        assert_eq!(WS2811_ERROR_GENERIC, -1);
        assert_eq!(WS2811_ERROR_DMA, -10);
        assert_eq!(WS2811_ERROR_SPI_TRANSFER, -14);
    }

    #[test]
    fn test_strip_type_constants() {
        assert_eq!(WS2811_STRIP_RGB as i64, 0x00100800);
        assert_eq!(WS2811_STRIP_GRB as i64, 0x00081000);
        assert_eq!(SK6812_STRIP_GRBW as i64, 0x18081000);
    }

    #[test]
    fn test_default_handle_is_unconfigured() {
        let leds = ws2811_t::default();
        assert_eq!(leds.freq, 0);
        assert!(leds.device.is_null());
        assert_eq!(leds.channel[0].count, 0);
        assert!(leds.channel[1].leds.is_null());
    }
}
