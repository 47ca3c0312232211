//! USB transports delivering color payloads
//!
//! The USB stack itself lives outside this crate and is reached through
//! [`UsbBus`]. Two adapters map its traffic onto the command handler:
//! vendor control transfers and raw interrupt reports.

mod control;
mod report;

pub use control::ControlTransfer;
pub use report::RawReport;

use heapless::Vec;

use crate::calibration::FrameProbe;
use crate::protocol::setup::SETUP_PACKET_LEN;
use crate::protocol::{CommandHandler, REPORT_SIZE, SetupPacket, SetupReply};

/// Largest data chunk of a low-speed control transfer
pub const CONTROL_CHUNK_SIZE: usize = 8;

/// Event delivered by the USB stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// Bus reset finished, the host is about to enumerate the device
    Reset,
    /// Raw setup stage of a control transfer, normally 8 bytes
    Setup(Vec<u8, SETUP_PACKET_LEN>),
    /// Data stage of a host-to-device control transfer
    ControlData(Vec<u8, CONTROL_CHUNK_SIZE>),
    /// Raw report written by the host to the interrupt OUT endpoint
    Report(Vec<u8, REPORT_SIZE>),
}

impl BusEvent {
    /// Setup stage carrying an encoded `packet`
    pub fn setup(packet: &SetupPacket) -> Self {
        BusEvent::Setup(packet.to_bytes().into_iter().collect())
    }
}

/// Device side of the USB stack
///
/// Frame length measurement is part of the bus since it times SOF packets.
pub trait UsbBus: FrameProbe {
    /// Poll the bus, returning the next pending event
    fn poll(&mut self) -> Option<BusEvent>;

    /// Answer the setup request returned by the last poll
    fn reply(&mut self, reply: SetupReply);

    /// Attach the pull-up so the host sees the device
    fn connect(&mut self);

    /// Detach from the bus
    fn disconnect(&mut self);
}

/// What a transport poll did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// The host reset the bus; the oscillator must be recalibrated
    Connected,
    /// A color command was accepted and its payload is expected next
    CommandStarted,
    /// A payload was applied, with the number of channels written
    ColorApplied(u8),
    /// The event carried nothing for this device
    Ignored,
}

/// Transport capability: feed bus traffic into the command handler
pub trait ColorTransport {
    type Bus: UsbBus;

    /// Process at most one bus event
    fn poll(&mut self, handler: &mut CommandHandler<'_>) -> Option<LinkEvent>;

    /// Get a mutable reference to the underlying bus
    fn bus_mut(&mut self) -> &mut Self::Bus;
}

/// Physical binding of the color command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportBinding {
    /// Vendor control request with a 3-byte data stage
    #[default]
    ControlTransfer,
    /// Fixed-size raw report whose first three bytes are the color
    RawReport,
}

/// Transport selected at runtime from a [`TransportBinding`]
pub enum Transport<B: UsbBus> {
    Control(ControlTransfer<B>),
    Report(RawReport<B>),
}

impl<B: UsbBus> Transport<B> {
    /// Wrap `bus` in the adapter for `binding`
    pub fn new(binding: TransportBinding, bus: B) -> Self {
        match binding {
            TransportBinding::ControlTransfer => Transport::Control(ControlTransfer::new(bus)),
            TransportBinding::RawReport => Transport::Report(RawReport::new(bus)),
        }
    }

    /// Binding of this transport
    pub const fn binding(&self) -> TransportBinding {
        match self {
            Transport::Control(_) => TransportBinding::ControlTransfer,
            Transport::Report(_) => TransportBinding::RawReport,
        }
    }
}

impl<B: UsbBus> ColorTransport for Transport<B> {
    type Bus = B;

    fn poll(&mut self, handler: &mut CommandHandler<'_>) -> Option<LinkEvent> {
        match self {
            Transport::Control(transport) => transport.poll(handler),
            Transport::Report(transport) => transport.poll(handler),
        }
    }

    fn bus_mut(&mut self) -> &mut B {
        match self {
            Transport::Control(transport) => transport.bus_mut(),
            Transport::Report(transport) => transport.bus_mut(),
        }
    }
}
