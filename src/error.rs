//! Error types for strip sessions.
//!
//! This module defines [`StripError`], the single error type returned by the
//! typed API of this crate. Errors fall into three kinds (see [`ErrorKind`]):
//!
//! - **State**: the operation is not permitted in the current session state
//!   (already active, not active, hardware already claimed).
//! - **Validation**: an argument was rejected before any hardware access
//!   (frame length mismatch, brightness out of range, bad configuration).
//! - **Driver**: the external rpi_ws281x driver returned a non-success status.
//!
//! The boolean compatibility surface in [`crate::raw`] collapses all of these
//! to `false`.

use std::ffi::CStr;
use std::fmt;

use thiserror::Error;

use crate::mapping::Point;

/// Result type alias for strip operations.
pub type Result<T> = std::result::Result<T, StripError>;

/// Errors that can occur when driving an LED strip.
#[derive(Error, Debug)]
pub enum StripError {
    /// `initialize` called while a session is already open
    #[error("A strip session is already active")]
    AlreadyActive,

    /// Operation requires an open session
    #[error("No strip session is active")]
    NotActive,

    /// Frame length differs from the pixel count fixed at initialization
    #[error("Frame has {actual} pixels but the strip has {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Brightness outside 0..=255
    #[error("WS2811 brightness set to {value}")]
    BrightnessOutOfRange { value: i64 },

    /// Negative or unrepresentable pixel count
    #[error("Invalid strip length {length}")]
    InvalidLength { length: i64 },

    /// Coordinate outside a matrix or mapping
    #[error("Co-ordinate {point} outside {max}")]
    OutOfBounds { point: Point, max: Point },

    /// Invalid configuration or parameter
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Another owner already holds the strip hardware in this process
    #[error("WS2811 hardware is already claimed by another driver in this process")]
    HardwareBusy,

    /// Non-success status from the external driver
    #[error("Driver {operation} failed: {status}")]
    Driver {
        operation: &'static str,
        status: DriverStatus,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),
}

/// Coarse classification of a [`StripError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation not permitted in the current session state
    State,
    /// Argument rejected before touching hardware
    Validation,
    /// External driver reported a failure
    Driver,
}

impl StripError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyActive | Self::NotActive | Self::HardwareBusy => ErrorKind::State,
            Self::LengthMismatch { .. }
            | Self::BrightnessOutOfRange { .. }
            | Self::InvalidLength { .. }
            | Self::OutOfBounds { .. }
            | Self::InvalidConfig { .. }
            | Self::Config(_) => ErrorKind::Validation,
            Self::Driver { .. } => ErrorKind::Driver,
        }
    }

    /// Check if the session state rejected the operation.
    pub fn is_state_error(&self) -> bool {
        self.kind() == ErrorKind::State
    }

    /// Check if an argument was rejected.
    pub fn is_validation_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if the external driver failed.
    pub fn is_driver_error(&self) -> bool {
        self.kind() == ErrorKind::Driver
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Status codes returned by the rpi_ws281x driver (`ws2811_return_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Success,
    Generic,
    OutOfMemory,
    HwNotSupported,
    MemLock,
    Mmap,
    MapRegisters,
    GpioInit,
    PwmSetup,
    MailboxDevice,
    Dma,
    IllegalGpio,
    PcmSetup,
    SpiSetup,
    SpiTransfer,
    Unknown(i32),
}

impl DriverStatus {
    /// Convert from a raw `ws2811_return_t` value.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Success,
            -1 => Self::Generic,
            -2 => Self::OutOfMemory,
            -3 => Self::HwNotSupported,
            -4 => Self::MemLock,
            -5 => Self::Mmap,
            -6 => Self::MapRegisters,
            -7 => Self::GpioInit,
            -8 => Self::PwmSetup,
            -9 => Self::MailboxDevice,
            -10 => Self::Dma,
            -11 => Self::IllegalGpio,
            -12 => Self::PcmSetup,
            -13 => Self::SpiSetup,
            -14 => Self::SpiTransfer,
            other => Self::Unknown(other),
        }
    }

    /// Convert back to the raw `ws2811_return_t` value.
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Generic => -1,
            Self::OutOfMemory => -2,
            Self::HwNotSupported => -3,
            Self::MemLock => -4,
            Self::Mmap => -5,
            Self::MapRegisters => -6,
            Self::GpioInit => -7,
            Self::PwmSetup => -8,
            Self::MailboxDevice => -9,
            Self::Dma => -10,
            Self::IllegalGpio => -11,
            Self::PcmSetup => -12,
            Self::SpiSetup => -13,
            Self::SpiTransfer => -14,
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether the driver reported success.
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// `Ok` for [`DriverStatus::Success`], the status itself otherwise.
    pub fn into_result(self) -> std::result::Result<(), DriverStatus> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Ask the driver library for its description of this status.
    ///
    /// # Safety
    ///
    /// Calls into `libws2811`; only meaningful when the real library is linked.
    #[allow(unsafe_code)]
    pub unsafe fn library_message(self) -> String {
        let ptr = ws2811_sys::ws2811_get_return_t_str(self.to_raw() as _);
        if ptr.is_null() {
            self.to_string()
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Generic => write!(f, "Generic failure"),
            Self::OutOfMemory => write!(f, "Out of memory"),
            Self::HwNotSupported => write!(f, "Hardware revision is not supported"),
            Self::MemLock => write!(f, "Memory lock failed"),
            Self::Mmap => write!(f, "mmap() failed"),
            Self::MapRegisters => write!(f, "Unable to map registers into userspace"),
            Self::GpioInit => write!(f, "Unable to initialize GPIO"),
            Self::PwmSetup => write!(f, "Unable to initialize PWM"),
            Self::MailboxDevice => write!(f, "Failed to create mailbox device"),
            Self::Dma => write!(f, "DMA error"),
            Self::IllegalGpio => write!(f, "Selected GPIO not possible"),
            Self::PcmSetup => write!(f, "Unable to initialize PCM"),
            Self::SpiSetup => write!(f, "Unable to initialize SPI"),
            Self::SpiTransfer => write!(f, "SPI transfer error"),
            Self::Unknown(raw) => write!(f, "Unknown status ({})", raw),
        }
    }
}
