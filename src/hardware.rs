//! [`LedDriver`] implementation backed by the rpi_ws281x C library.
//!
//! The library keeps all of its state in one `ws2811_t` record and hands
//! out pointers into it, so [`Ws281xDriver`] keeps the record boxed at a
//! stable address for its whole lifetime.
//!
//! The DMA engine, PWM block and GPIO pin are one physical resource per
//! process. Constructing a [`Ws281xDriver`] takes a process-wide claim on
//! that resource; a second driver cannot be created until the first one is
//! dropped.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use ws2811_sys::ws2811_t;

use crate::driver::{DriverConfig, LedDriver, CHANNEL_COUNT};
use crate::error::{DriverStatus, Result, StripError};

/// Set while a [`Ws281xDriver`] exists.
static HARDWARE_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Check whether some [`Ws281xDriver`] currently owns the hardware.
pub fn hardware_claimed() -> bool {
    HARDWARE_CLAIMED.load(Ordering::Acquire)
}

/// Safe owner of the rpi_ws281x driver record.
///
/// # Thread Safety
///
/// `Ws281xDriver` is `Send` but not `Sync`: the C library is not reentrant,
/// so the record must only ever be touched from one thread at a time.
pub struct Ws281xDriver {
    handle: Box<ws2811_t>,
    initialized: bool,
}

// SAFETY: the raw pointers inside ws2811_t are owned exclusively by this
// driver and are only dereferenced through &mut self or &self borrows.
#[allow(unsafe_code)]
unsafe impl Send for Ws281xDriver {}

impl Ws281xDriver {
    /// Claim the strip hardware for this process.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::HardwareBusy`] if another `Ws281xDriver` is alive.
    pub fn new() -> Result<Self> {
        if HARDWARE_CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(StripError::HardwareBusy);
        }

        debug!("Claimed WS2811 hardware");

        Ok(Self {
            handle: Box::new(ws2811_t::default()),
            initialized: false,
        })
    }

    /// Whether `init` has succeeded and `fini` has not yet been called.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn channel_len(&self, channel: usize) -> usize {
        if !self.initialized || channel >= CHANNEL_COUNT {
            return 0;
        }
        let ch = &self.handle.channel[channel];
        if ch.leds.is_null() {
            0
        } else {
            usize::try_from(ch.count).unwrap_or(0)
        }
    }
}

impl LedDriver for Ws281xDriver {
    #[allow(unsafe_code)]
    fn init(&mut self, config: &DriverConfig) -> std::result::Result<(), DriverStatus> {
        if self.initialized {
            warn!("ws2811_init called on an initialized driver");
            return Err(DriverStatus::Generic);
        }

        let mut record = ws2811_t::default();
        record.freq = config.frequency_hz as _;
        record.dmanum = config.dma_channel as _;

        for (slot, channel) in record.channel.iter_mut().zip(config.channels.iter()) {
            slot.gpionum = channel.gpio_pin as _;
            slot.count = i32::try_from(channel.count).map_err(|_| DriverStatus::OutOfMemory)? as _;
            slot.invert = i32::from(channel.invert) as _;
            slot.brightness = channel.brightness;
            slot.strip_type = channel.strip_type as _;
        }

        *self.handle = record;

        // SAFETY: handle points to a fully populated record at a stable heap address
        let status = unsafe { ws2811_sys::ws2811_init(self.handle.as_mut()) };
        if let Err(status) = DriverStatus::from_raw(status as i32).into_result() {
            // SAFETY: a status was returned, so the real library is linked
            let message = unsafe { status.library_message() };
            warn!(%status, %message, "ws2811_init failed");
            return Err(status);
        }

        self.initialized = true;
        info!(
            gpio_pin = config.primary().gpio_pin,
            dma_channel = config.dma_channel,
            count = config.primary().count,
            "Initialized rpi_ws281x driver"
        );
        Ok(())
    }

    fn set_brightness(&mut self, channel: usize, brightness: u8) {
        if let Some(slot) = self.handle.channel.get_mut(channel) {
            slot.brightness = brightness;
        }
    }

    fn brightness(&self, channel: usize) -> u8 {
        self.handle
            .channel
            .get(channel)
            .map(|slot| slot.brightness)
            .unwrap_or(0)
    }

    #[allow(unsafe_code)]
    fn leds(&self, channel: usize) -> &[u32] {
        let len = self.channel_len(channel);
        if len == 0 {
            return &[];
        }
        // SAFETY: after a successful init the driver allocated `count` leds for
        // this channel, and they stay valid until fini, which needs &mut self.
        unsafe { std::slice::from_raw_parts(self.handle.channel[channel].leds, len) }
    }

    #[allow(unsafe_code)]
    fn leds_mut(&mut self, channel: usize) -> &mut [u32] {
        let len = self.channel_len(channel);
        if len == 0 {
            return &mut [];
        }
        // SAFETY: as for `leds`, and &mut self guarantees exclusive access
        unsafe { std::slice::from_raw_parts_mut(self.handle.channel[channel].leds, len) }
    }

    #[allow(unsafe_code)]
    fn render(&mut self) -> std::result::Result<(), DriverStatus> {
        if !self.initialized {
            return Err(DriverStatus::Generic);
        }
        // SAFETY: the record was initialized by ws2811_init
        let status = unsafe { ws2811_sys::ws2811_render(self.handle.as_mut()) };
        DriverStatus::from_raw(status as i32).into_result()
    }

    #[allow(unsafe_code)]
    fn wait(&mut self) -> std::result::Result<(), DriverStatus> {
        if !self.initialized {
            return Err(DriverStatus::Generic);
        }
        // SAFETY: the record was initialized by ws2811_init
        let status = unsafe { ws2811_sys::ws2811_wait(self.handle.as_mut()) };
        DriverStatus::from_raw(status as i32).into_result()
    }

    #[allow(unsafe_code)]
    fn fini(&mut self) {
        // ws2811_fini dereferences the device pointer, which only exists after init
        if !self.initialized {
            debug!("ws2811_fini skipped, driver holds no resources");
            return;
        }
        // SAFETY: the record was initialized by ws2811_init and is released exactly once
        unsafe { ws2811_sys::ws2811_fini(self.handle.as_mut()) };
        self.initialized = false;
        info!("Released rpi_ws281x driver resources");
    }
}

impl Drop for Ws281xDriver {
    fn drop(&mut self) {
        self.fini();
        HARDWARE_CLAIMED.store(false, Ordering::Release);
        debug!("Released WS2811 hardware claim");
    }
}

impl std::fmt::Debug for Ws281xDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let primary = &self.handle.channel[0];
        f.debug_struct("Ws281xDriver")
            .field("initialized", &self.initialized)
            .field("freq", &self.handle.freq)
            .field("dmanum", &self.handle.dmanum)
            .field("gpionum", &primary.gpionum)
            .field("count", &primary.count)
            .field("brightness", &primary.brightness)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Nothing here calls into libws2811, so these run without the library.

    #[test]
    #[serial(ws2811_hardware)]
    fn test_hardware_claim_is_exclusive() {
        let first = Ws281xDriver::new().unwrap();
        assert!(hardware_claimed());
        assert!(matches!(
            Ws281xDriver::new(),
            Err(StripError::HardwareBusy)
        ));

        drop(first);
        assert!(!hardware_claimed());

        let second = Ws281xDriver::new();
        assert!(second.is_ok());
    }

    #[test]
    #[serial(ws2811_hardware)]
    fn test_uninitialized_driver_is_inert() {
        let mut driver = Ws281xDriver::new().unwrap();
        assert!(!driver.is_initialized());
        assert!(driver.leds(0).is_empty());
        assert!(driver.leds_mut(0).is_empty());
        assert_eq!(driver.render(), Err(DriverStatus::Generic));
        assert_eq!(driver.wait(), Err(DriverStatus::Generic));

        driver.set_brightness(0, 42);
        assert_eq!(driver.brightness(0), 42);
        assert_eq!(driver.brightness(7), 0);

        // No resources held, so this must not reach the library
        driver.fini();
    }
}
