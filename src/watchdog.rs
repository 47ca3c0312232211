//! Watchdog supervision
//!
//! The watchdog is the only stall recovery: if the main loop stops feeding
//! it, the whole device restarts. Only the persisted calibration byte
//! survives that restart.

use embassy_time::Duration;

/// Watchdog timeout presets of the AVR watchdog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum WatchdogTimeout {
    Ms16 = 0,
    Ms32 = 1,
    Ms64 = 2,
    Ms125 = 3,
    Ms250 = 4,
    Ms500 = 5,
    #[default]
    Ms1000 = 6,
    Ms2000 = 7,
}

impl WatchdogTimeout {
    /// Nominal timeout
    pub const fn duration(self) -> Duration {
        let millis = match self {
            WatchdogTimeout::Ms16 => 16,
            WatchdogTimeout::Ms32 => 32,
            WatchdogTimeout::Ms64 => 64,
            WatchdogTimeout::Ms125 => 125,
            WatchdogTimeout::Ms250 => 250,
            WatchdogTimeout::Ms500 => 500,
            WatchdogTimeout::Ms1000 => 1000,
            WatchdogTimeout::Ms2000 => 2000,
        };
        Duration::from_millis(millis)
    }

    /// Prescaler bits of the watchdog control register
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Hardware watchdog in system reset mode
pub trait Watchdog {
    /// Arm the watchdog
    fn start(&mut self, timeout: WatchdogTimeout);

    /// Restart the timeout
    fn feed(&mut self);
}

/// Software model of the watchdog timer.
///
/// Time only moves through [`SoftWatchdog::advance`], which makes stalls
/// reproducible in host simulations.
#[derive(Debug, Clone, Default)]
pub struct SoftWatchdog {
    timeout: Option<Duration>,
    since_feed: Duration,
    feeds: u32,
}

impl SoftWatchdog {
    pub const fn new() -> Self {
        Self {
            timeout: None,
            since_feed: Duration::from_ticks(0),
            feeds: 0,
        }
    }

    /// Let `elapsed` pass without a feed.
    ///
    /// Returns `true` once the deadline is missed.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.since_feed += elapsed;
        self.has_expired()
    }

    /// Check if the deadline was missed
    pub fn has_expired(&self) -> bool {
        self.timeout.is_some_and(|timeout| self.since_feed >= timeout)
    }

    pub const fn is_armed(&self) -> bool {
        self.timeout.is_some()
    }

    /// Number of feeds since the watchdog was armed
    pub const fn feeds(&self) -> u32 {
        self.feeds
    }
}

impl Watchdog for SoftWatchdog {
    fn start(&mut self, timeout: WatchdogTimeout) {
        self.timeout = Some(timeout.duration());
        self.since_feed = Duration::from_ticks(0);
        self.feeds = 0;
    }

    fn feed(&mut self) {
        self.since_feed = Duration::from_ticks(0);
        self.feeds = self.feeds.wrapping_add(1);
    }
}
