//! Device configuration

use crate::color::{DEFAULT_COLOR, Rgb};
use crate::protocol::{LengthPolicy, SET_RGB_REQUEST};
use crate::render::RenderCadence;
use crate::transport::TransportBinding;
use crate::watchdog::WatchdogTimeout;

/// Nominal CPU clock of the reference board
pub const DEFAULT_CLOCK_HZ: u32 = 12_000_000;

/// Length of the forced disconnect at boot, in milliseconds.
///
/// Longer than 250 ms so the host notices the device went away.
pub const DISCONNECT_MS: u8 = 255;

/// Configuration for the device core
#[derive(Debug, Clone, Copy)]
pub struct DeviceConfig {
    /// Nominal CPU clock the oscillator is calibrated to
    pub clock_hz: u32,
    /// Vendor request code of the color command
    pub set_rgb_request: u8,
    pub binding: TransportBinding,
    pub cadence: RenderCadence,
    pub length_policy: LengthPolicy,
    pub watchdog_timeout: WatchdogTimeout,
    /// Color shown after a cold start
    pub default_color: Rgb,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            set_rgb_request: SET_RGB_REQUEST,
            binding: TransportBinding::default(),
            cadence: RenderCadence::default(),
            length_policy: LengthPolicy::default(),
            watchdog_timeout: WatchdogTimeout::default(),
            default_color: DEFAULT_COLOR,
        }
    }
}
