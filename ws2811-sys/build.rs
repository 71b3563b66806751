//! Build script for ws2811-sys FFI bindings.
//!
//! This script generates Rust FFI bindings from the rpi_ws281x C header
//! using bindgen. It supports two modes:
//!
//! 1. With `ws2811-sdk` feature: Generates bindings from system headers
//! 2. Without feature: Uses pre-generated bindings so the crate builds off-target

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=wrapper.h");
    println!("cargo:rerun-if-env-changed=WS2811_INCLUDE_DIR");

    #[cfg(feature = "ws2811-sdk")]
    generate_bindings();

    #[cfg(not(feature = "ws2811-sdk"))]
    generate_dummy_bindings();

    #[cfg(feature = "ws2811-sdk")]
    {
        if pkg_config::probe_library("libws2811").is_ok() {
            return;
        }

        println!("cargo:rustc-link-lib=ws2811");

        let lib_paths = ["/usr/local/lib", "/usr/lib", "/usr/lib/arm-linux-gnueabihf"];

        for path in lib_paths {
            if std::path::Path::new(path).join("libws2811.so").exists()
                || std::path::Path::new(path).join("libws2811.a").exists()
            {
                println!("cargo:rustc-link-search=native={}", path);
                break;
            }
        }
    }
}

#[cfg(feature = "ws2811-sdk")]
fn generate_bindings() {
    let include_dir = env::var("WS2811_INCLUDE_DIR").unwrap_or_else(|_| {
        if let Ok(lib) = pkg_config::probe_library("libws2811") {
            lib.include_paths
                .first()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| "/usr/local/include/ws2811".to_string())
        } else {
            for path in ["/usr/local/include/ws2811", "/usr/local/include", "/usr/include"] {
                if std::path::Path::new(path).join("ws2811.h").exists() {
                    return path.to_string();
                }
            }
            "/usr/local/include/ws2811".to_string()
        }
    });

    println!("cargo:rerun-if-changed={}/ws2811.h", include_dir);

    let bindings = bindgen::Builder::default()
        .header("wrapper.h")
        .clang_arg(format!("-I{}", include_dir))
        .allowlist_function("ws2811_.*")
        .allowlist_type("ws2811_.*")
        .allowlist_var("WS2811_.*")
        .allowlist_var("SK6812_.*")
        .allowlist_var("RPI_PWM_CHANNELS")
        // Keep return codes as flat constants (matches dummy bindings)
        .default_enum_style(bindgen::EnumVariation::Consts)
        .derive_debug(true)
        .derive_default(true)
        .derive_copy(true)
        .generate_comments(true)
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .expect("Unable to generate ws2811 bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write bindings!");
}

/// Generate dummy bindings when the driver library is not available.
/// This allows the crate to compile on development machines that are not a Raspberry Pi.
#[cfg(not(feature = "ws2811-sdk"))]
fn generate_dummy_bindings() {
    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    let dummy = r#"
// Dummy bindings - ws2811-sdk feature not enabled
//
// Layout-compatible copies of the rpi_ws281x public types, plus stub
// functions. Enable the `ws2811-sdk` feature to generate real bindings.

use std::os::raw::{c_char, c_int, c_void};

/// One packed pixel value (0xWWRRGGBB)
pub type ws2811_led_t = u32;

/// Driver return code
pub type ws2811_return_t = c_int;

/// Opaque per-device state owned by the driver
pub type ws2811_device = c_void;

/// Opaque Raspberry Pi hardware descriptor
pub type rpi_hw_t = c_void;

/// Number of output channels in the driver's data model
pub const RPI_PWM_CHANNELS: usize = 2;

/// Configuration and state for one output channel
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct ws2811_channel_t {
    pub gpionum: c_int,
    pub invert: c_int,
    pub count: c_int,
    pub strip_type: c_int,
    pub leds: *mut ws2811_led_t,
    pub brightness: u8,
    pub wshift: u8,
    pub rshift: u8,
    pub gshift: u8,
    pub bshift: u8,
    pub gamma: *mut u8,
}

impl Default for ws2811_channel_t {
    fn default() -> Self {
        Self {
            gpionum: 0,
            invert: 0,
            count: 0,
            strip_type: 0,
            leds: std::ptr::null_mut(),
            brightness: 0,
            wshift: 0,
            rshift: 0,
            gshift: 0,
            bshift: 0,
            gamma: std::ptr::null_mut(),
        }
    }
}

/// Top-level driver handle
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct ws2811_t {
    pub render_wait_time: u64,
    pub device: *mut ws2811_device,
    pub rpi_hw: *const rpi_hw_t,
    pub freq: u32,
    pub dmanum: c_int,
    pub channel: [ws2811_channel_t; RPI_PWM_CHANNELS],
}

impl Default for ws2811_t {
    fn default() -> Self {
        Self {
            render_wait_time: 0,
            device: std::ptr::null_mut(),
            rpi_hw: std::ptr::null(),
            freq: 0,
            dmanum: 0,
            channel: [ws2811_channel_t::default(); RPI_PWM_CHANNELS],
        }
    }
}

pub const WS2811_TARGET_FREQ: u32 = 800000;

// 4 colour R, G, B and W ordering
pub const SK6812_STRIP_RGBW: c_int = 0x18100800;
pub const SK6812_STRIP_RBGW: c_int = 0x18100008;
pub const SK6812_STRIP_GRBW: c_int = 0x18081000;
pub const SK6812_STRIP_GBRW: c_int = 0x18080010;
pub const SK6812_STRIP_BRGW: c_int = 0x18001008;
pub const SK6812_STRIP_BGRW: c_int = 0x18000810;

// 3 colour R, G and B ordering
pub const WS2811_STRIP_RGB: c_int = 0x00100800;
pub const WS2811_STRIP_RBG: c_int = 0x00100008;
pub const WS2811_STRIP_GRB: c_int = 0x00081000;
pub const WS2811_STRIP_GBR: c_int = 0x00080010;
pub const WS2811_STRIP_BRG: c_int = 0x00001008;
pub const WS2811_STRIP_BGR: c_int = 0x00000810;

// Return codes
pub const WS2811_SUCCESS: ws2811_return_t = 0;
pub const WS2811_ERROR_GENERIC: ws2811_return_t = -1;
pub const WS2811_ERROR_OUT_OF_MEMORY: ws2811_return_t = -2;
pub const WS2811_ERROR_HW_NOT_SUPPORTED: ws2811_return_t = -3;
pub const WS2811_ERROR_MEM_LOCK: ws2811_return_t = -4;
pub const WS2811_ERROR_MMAP: ws2811_return_t = -5;
pub const WS2811_ERROR_MAP_REGISTERS: ws2811_return_t = -6;
pub const WS2811_ERROR_GPIO_INIT: ws2811_return_t = -7;
pub const WS2811_ERROR_PWM_SETUP: ws2811_return_t = -8;
pub const WS2811_ERROR_MAILBOX_DEVICE: ws2811_return_t = -9;
pub const WS2811_ERROR_DMA: ws2811_return_t = -10;
pub const WS2811_ERROR_ILLEGAL_GPIO: ws2811_return_t = -11;
pub const WS2811_ERROR_PCM_SETUP: ws2811_return_t = -12;
pub const WS2811_ERROR_SPI_SETUP: ws2811_return_t = -13;
pub const WS2811_ERROR_SPI_TRANSFER: ws2811_return_t = -14;

// Panic stub implementations - these allow linking to succeed but will panic at runtime
// if called without the ws2811-sdk feature enabled.

const WS2811_SDK_PANIC_MSG: &str = "ws2811 function called but ws2811-sdk feature is not enabled. \
    Enable the ws2811-sdk feature (or `hardware` in ws2811-bridge) to use the real driver.";

#[no_mangle]
pub unsafe extern "C" fn ws2811_init(_ws2811: *mut ws2811_t) -> ws2811_return_t {
    panic!("{}", WS2811_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn ws2811_fini(_ws2811: *mut ws2811_t) {
    panic!("{}", WS2811_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn ws2811_render(_ws2811: *mut ws2811_t) -> ws2811_return_t {
    panic!("{}", WS2811_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn ws2811_wait(_ws2811: *mut ws2811_t) -> ws2811_return_t {
    panic!("{}", WS2811_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn ws2811_get_return_t_str(_state: ws2811_return_t) -> *const c_char {
    panic!("{}", WS2811_SDK_PANIC_MSG);
}
"#;

    std::fs::write(out_path.join("bindings.rs"), dummy).expect("Couldn't write dummy bindings!");
}
