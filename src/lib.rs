#![no_std]

pub mod calibration;
pub mod color;
pub mod config;
pub mod dispatch;
pub mod protocol;
pub mod render;
pub mod storage;
pub mod transport;
pub mod watchdog;

pub use calibration::{Calibrator, FrameProbe, Oscillator, search_trim, target_frame_length};
pub use color::{Channel, ColorCell, DEFAULT_COLOR, Rgb};
pub use config::DeviceConfig;
pub use dispatch::{DeviceParts, Dispatcher};
pub use protocol::{Classification, CommandHandler, LengthPolicy, SetupPacket, SetupReply};
pub use render::{
    OutputLevels, PinOutputs, PwmRenderer, RenderCadence, RenderEngine, TickSlot, TickSource,
};
pub use storage::ByteStorage;
pub use transport::{
    BusEvent, ColorTransport, LinkEvent, Transport, TransportBinding, UsbBus,
};
pub use watchdog::{SoftWatchdog, Watchdog, WatchdogTimeout};

pub use embassy_time::Duration;

/// Abstract output driver trait
///
/// Implement this trait to drive the three channel outputs on a given
/// board. [`PinOutputs`] covers the common case of plain GPIO pins.
pub trait OutputDriver {
    /// Drive the outputs for one tick
    fn write(&mut self, levels: OutputLevels);
}
