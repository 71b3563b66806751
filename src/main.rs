//! CLI entry point for ws2811-bridge
//!
//! Provides a command-line interface for:
//! - Running a chase animation on a strip (real hardware or mock driver)
//! - Printing the effective configuration as TOML
//!
//! # Usage
//!
//! Run a 30 LED chase on the default pin:
//! ```bash
//! sudo ws2811-demo chase --count 30 --strip-type grb
//! ```
//!
//! Try the sequencing without a Raspberry Pi:
//! ```bash
//! ws2811-demo chase --mock --frames 20
//! ```

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ws2811_bridge::config::{BridgeConfig, DEFAULT_CONFIG_FILE};
use ws2811_bridge::logging::{self, TracingConfig};
use ws2811_bridge::mock::MockDriver;
use ws2811_bridge::{LedDriver, StripSession, StripType, Ws281xDriver};

#[derive(Parser)]
#[command(name = "ws2811-demo")]
#[command(about = "Drive a WS2811/WS2812 LED strip through rpi_ws281x", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single-dot chase along the strip
    Chase {
        /// Number of LEDs on the strip
        #[arg(long, default_value_t = 10)]
        count: usize,

        /// Colour order (rgb, grb, ws2812, grbw, ...)
        #[arg(long, default_value = "grb")]
        strip_type: StripType,

        /// Global brightness 0-255
        #[arg(long, default_value_t = 255)]
        brightness: i32,

        /// Number of frames to render
        #[arg(long, default_value_t = 100)]
        frames: usize,

        /// Delay between frames in milliseconds
        #[arg(long, default_value_t = 20)]
        delay_ms: u64,

        /// Use the in-memory driver instead of the hardware
        #[arg(long)]
        mock: bool,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = BridgeConfig::load_from(&cli.config)
        .with_context(|| format!("Loading {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    let tracing_config = TracingConfig::from_config(&config).map_err(anyhow::Error::msg)?;
    logging::init(tracing_config).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Chase {
            count,
            strip_type,
            brightness,
            frames,
            delay_ms,
            mock,
        } => {
            let options = ChaseOptions {
                count,
                strip_type,
                brightness,
                frames,
                delay: Duration::from_millis(delay_ms),
            };
            if mock {
                let session = StripSession::with_hardware(MockDriver::new(), config.hardware);
                chase(session, &options)
            } else {
                let driver = Ws281xDriver::new().context("Claiming WS2811 hardware")?;
                let session = StripSession::with_hardware(driver, config.hardware);
                chase(session, &options)
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

struct ChaseOptions {
    count: usize,
    strip_type: StripType,
    brightness: i32,
    frames: usize,
    delay: Duration,
}

fn chase<D: LedDriver>(mut session: StripSession<D>, options: &ChaseOptions) -> Result<()> {
    session
        .initialize(options.strip_type.code(), options.count)
        .context("Initializing strip")?;
    session.set_brightness(options.brightness)?;

    info!(
        count = options.count,
        strip_type = %options.strip_type,
        frames = options.frames,
        "Running chase"
    );

    let mut frame = vec![0u32; options.count];
    for n in 0..options.frames {
        frame.fill(0);
        if let Some(pixel) = frame.get_mut(n % options.count.max(1)) {
            *pixel = ws2811_bridge::pack_rgb(255, 255, 255);
        }
        session.push_frame(&frame)?;
        session.wait()?;
        thread::sleep(options.delay);
    }

    frame.fill(0);
    session.push_frame(&frame)?;
    session.wait()?;
    session.close();

    info!("Chase finished");
    Ok(())
}
