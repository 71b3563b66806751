//! Configuration loading using Figment.
//!
//! Configuration is loaded from:
//! 1. `ws2811.toml` (or a given path), if present
//! 2. Environment variables prefixed with `WS2811_`, nested keys split on `__`
//!
//! Every field has a default matching the native binding (GPIO 18,
//! DMA 5, 800 kHz), so an empty or missing file is a valid configuration.
//!
//! # Example
//! ```no_run
//! use ws2811_bridge::config::BridgeConfig;
//!
//! let config = BridgeConfig::load()?;
//! config.validate()?;
//! println!("Driving GPIO {}", config.hardware.gpio_pin);
//! # Ok::<(), ws2811_bridge::StripError>(())
//! ```
//!
//! Environment override: `WS2811_HARDWARE__DMA_CHANNEL=10`.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::driver::HardwareConfig;
use crate::error::{Result, StripError};
use crate::logging::LogFormat;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "ws2811.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "WS2811_";

/// DMA channels the Raspberry Pi firmware or kernel already uses.
const RESERVED_DMA_CHANNELS: [i32; 6] = [0, 1, 2, 3, 6, 7];

/// Pins the driver can generate the signal on (PWM, PCM or SPI).
const SIGNAL_PINS: [i32; 13] = [10, 12, 13, 18, 19, 21, 31, 38, 40, 41, 45, 52, 53];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Hardware placement of the strip
    pub hardware: HardwareConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from `ws2811.toml` and environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::figment(path.as_ref()).extract()?;
        Ok(config)
    }

    /// The provider stack used by [`Self::load_from`].
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(BridgeConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<()> {
        let hw = &self.hardware;

        if !(0..=14).contains(&hw.dma_channel) || RESERVED_DMA_CHANNELS.contains(&hw.dma_channel)
        {
            return Err(StripError::invalid_config(format!(
                "Invalid dma_channel {}. Must be 0-14 and not one of {:?}",
                hw.dma_channel, RESERVED_DMA_CHANNELS
            )));
        }

        if !SIGNAL_PINS.contains(&hw.gpio_pin) {
            return Err(StripError::invalid_config(format!(
                "Invalid gpio_pin {}. Must be one of {:?}",
                hw.gpio_pin, SIGNAL_PINS
            )));
        }

        if !(400_000..=800_000).contains(&hw.frequency_hz) {
            return Err(StripError::invalid_config(format!(
                "Invalid frequency_hz {}. Must be 400000-800000",
                hw.frequency_hz
            )));
        }

        crate::logging::parse_log_level(&self.logging.level).map_err(StripError::invalid_config)?;

        Ok(())
    }

    /// Render as TOML, e.g. to write a starting configuration file.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| StripError::invalid_config(format!("Cannot serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_native_binding() {
        let config = BridgeConfig::default();
        assert_eq!(config.hardware.gpio_pin, 18);
        assert_eq!(config.hardware.dma_channel, 5);
        assert_eq!(config.hardware.frequency_hz, 800_000);
        assert!(!config.hardware.invert);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[hardware]\ngpio_pin = 12\ndma_channel = 10\n\n[logging]\nlevel = \"debug\"\nformat = \"json\""
        )
        .unwrap();

        let config = BridgeConfig::load_from(file.path()).unwrap();
        assert_eq!(config.hardware.gpio_pin, 12);
        assert_eq!(config.hardware.dma_channel, 10);
        assert_eq!(config.hardware.frequency_hz, 800_000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("ws2811.toml", "[hardware]\ndma_channel = 10")?;
            jail.set_env("WS2811_HARDWARE__DMA_CHANNEL", "11");
            jail.set_env("WS2811_HARDWARE__INVERT", "true");

            let config = BridgeConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.hardware.dma_channel, 11);
            assert!(config.hardware.invert);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = BridgeConfig::default();
        config.hardware.dma_channel = 6;
        assert!(config.validate().is_err());

        let mut config = BridgeConfig::default();
        config.hardware.dma_channel = 15;
        assert!(config.validate().is_err());

        let mut config = BridgeConfig::default();
        config.hardware.gpio_pin = 4;
        assert!(config.validate().is_err());

        let mut config = BridgeConfig::default();
        config.hardware.frequency_hz = 1_000_000;
        assert!(config.validate().is_err());

        let mut config = BridgeConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let text = BridgeConfig::default().to_toml().unwrap();
        assert!(text.contains("gpio_pin = 18"));
        let parsed: BridgeConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, BridgeConfig::default());
    }
}
