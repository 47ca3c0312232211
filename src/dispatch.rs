//! Main dispatch loop
//!
//! Strict round robin: feed the watchdog, poll the transport, and render a
//! tick when no timer interrupt does it. A slow poll delays the inline tick.

use embedded_hal::delay::DelayNs;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::calibration::{Calibrator, Oscillator};
use crate::color::ColorCell;
use crate::config::{DISCONNECT_MS, DeviceConfig};
use crate::protocol::CommandHandler;
use crate::render::{RenderCadence, TickSource};
use crate::storage::{ByteStorage, load_trim};
use crate::transport::{ColorTransport, LinkEvent, UsbBus};
use crate::watchdog::Watchdog;

/// Hardware owned by the dispatcher besides the transport
pub struct DeviceParts<O, S, W> {
    pub oscillator: O,
    pub storage: S,
    pub watchdog: W,
}

/// Main loop of the device
pub struct Dispatcher<'a, T, O, S, W, K> {
    config: DeviceConfig,
    color: &'a ColorCell,
    handler: CommandHandler<'a>,
    calibrator: Calibrator,
    transport: T,
    oscillator: O,
    storage: S,
    watchdog: W,
    ticker: K,
    last_trim: Option<u8>,
}

impl<'a, T, O, S, W, K> Dispatcher<'a, T, O, S, W, K>
where
    T: ColorTransport,
    O: Oscillator,
    S: ByteStorage,
    W: Watchdog,
    K: TickSource,
{
    /// Create a dispatcher. Nothing touches the hardware until [`Self::boot`].
    pub fn new(
        config: &DeviceConfig,
        color: &'a ColorCell,
        transport: T,
        parts: DeviceParts<O, S, W>,
        ticker: K,
    ) -> Self {
        Self {
            config: *config,
            color,
            handler: CommandHandler::new(color, config.set_rgb_request, config.length_policy),
            calibrator: Calibrator::new(config.clock_hz),
            transport,
            oscillator: parts.oscillator,
            storage: parts.storage,
            watchdog: parts.watchdog,
            ticker,
            last_trim: None,
        }
    }

    /// Cold start.
    ///
    /// Every piece of volatile state goes back to its power-on value; only
    /// the persisted trim is read back and applied to the oscillator. Then
    /// the device drops off the bus for a moment and reconnects, so the
    /// host re-enumerates it and triggers a fresh calibration.
    pub fn boot<D: DelayNs>(&mut self, delay: &mut D) {
        self.color.publish(self.config.default_color);
        self.handler.reset();
        self.ticker.reset();
        self.last_trim = None;

        self.watchdog.start(self.config.watchdog_timeout);

        if let Some(trim) = load_trim(&mut self.storage) {
            self.oscillator.set_trim(trim);
            #[cfg(feature = "esp32-log")]
            println!("[Dispatcher.boot] restored trim {:?}", trim);
        }

        let bus = self.transport.bus_mut();
        bus.disconnect();
        for _ in 0..DISCONNECT_MS {
            self.watchdog.feed();
            delay.delay_ms(1);
        }
        bus.connect();

        #[cfg(feature = "esp32-log")]
        println!("[Dispatcher.boot] connected");
    }

    /// Restart after a watchdog reset.
    ///
    /// Identical to [`Self::boot`]: nothing volatile survives.
    pub fn restart<D: DelayNs>(&mut self, delay: &mut D) {
        self.boot(delay);
    }

    /// Run one iteration of the loop
    pub fn run_once(&mut self) -> Option<LinkEvent> {
        self.watchdog.feed();

        let event = self.transport.poll(&mut self.handler);
        if event == Some(LinkEvent::Connected) {
            let trim = self.calibrator.calibrate(
                &mut self.oscillator,
                self.transport.bus_mut(),
                &mut self.storage,
            );
            self.last_trim = Some(trim);
        }

        if self.config.cadence == RenderCadence::Inline {
            self.ticker.on_tick();
        }

        event
    }

    /// Run forever
    pub fn run(&mut self) -> ! {
        loop {
            self.run_once();
        }
    }

    pub const fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub const fn color(&self) -> &ColorCell {
        self.color
    }

    /// Trim found by the last calibration since boot
    pub const fn last_trim(&self) -> Option<u8> {
        self.last_trim
    }

    pub const fn ticker(&self) -> &K {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut K {
        &mut self.ticker
    }

    pub const fn watchdog(&self) -> &W {
        &self.watchdog
    }

    pub fn watchdog_mut(&mut self) -> &mut W {
        &mut self.watchdog
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn bus_mut(&mut self) -> &mut T::Bus {
        self.transport.bus_mut()
    }
}
