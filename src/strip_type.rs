//! Colour-order codes understood by the rpi_ws281x driver.
//!
//! A strip type tells the driver which byte of a packed `0xWWRRGGBB` pixel
//! goes out on the wire first. Sessions treat the code as opaque and pass
//! it straight through; [`StripType`] just names the known values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StripError;

/// Known colour orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripType {
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
    Rgbw,
    Rbgw,
    Grbw,
    Gbrw,
}

impl StripType {
    /// Every known strip type.
    pub const ALL: [StripType; 10] = [
        Self::Rgb,
        Self::Rbg,
        Self::Grb,
        Self::Gbr,
        Self::Brg,
        Self::Bgr,
        Self::Rgbw,
        Self::Rbgw,
        Self::Grbw,
        Self::Gbrw,
    ];

    /// Colour order used by WS2812 strips.
    pub const WS2812: StripType = Self::Grb;

    /// The driver code for this colour order.
    pub fn code(self) -> i32 {
        match self {
            Self::Rgb => 0x0010_0800,
            Self::Rbg => 0x0010_0008,
            Self::Grb => 0x0008_1000,
            Self::Gbr => 0x0008_0010,
            Self::Brg => 0x0000_1008,
            Self::Bgr => 0x0000_0810,
            Self::Rgbw => 0x1810_0800,
            Self::Rbgw => 0x1810_0008,
            Self::Grbw => 0x1808_1000,
            Self::Gbrw => 0x1808_0010,
        }
    }

    /// Look up a driver code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Whether the strip has a separate white LED per pixel.
    pub fn has_white(self) -> bool {
        self.code() & 0x1800_0000 != 0
    }

    fn name(self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Rbg => "rbg",
            Self::Grb => "grb",
            Self::Gbr => "gbr",
            Self::Brg => "brg",
            Self::Bgr => "bgr",
            Self::Rgbw => "rgbw",
            Self::Rbgw => "rbgw",
            Self::Grbw => "grbw",
            Self::Gbrw => "gbrw",
        }
    }
}

impl From<StripType> for i32 {
    fn from(strip_type: StripType) -> Self {
        strip_type.code()
    }
}

impl fmt::Display for StripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StripType {
    type Err = StripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        if lower == "ws2812" {
            return Ok(Self::WS2812);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.name() == lower)
            .ok_or_else(|| StripError::invalid_config(format!("Unknown strip type '{}'", s)))
    }
}

/// Pack 8-bit red, green and blue into the driver's `0x00RRGGBB` pixel layout.
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Pack red, green, blue and white into `0xWWRRGGBB` for RGBW strips.
pub fn pack_rgbw(r: u8, g: u8, b: u8, w: u8) -> u32 {
    (u32::from(w) << 24) | pack_rgb(r, g, b)
}
