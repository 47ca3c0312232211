use super::{BusEvent, ColorTransport, LinkEvent, UsbBus};
use crate::protocol::{CommandHandler, SetupReply};

/// Color commands as raw reports.
///
/// The host keeps writing a fixed-size buffer whose first three bytes are
/// the color; the rest is padding. Control requests are never implemented
/// in this mode.
pub struct RawReport<B> {
    bus: B,
}

impl<B: UsbBus> RawReport<B> {
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: UsbBus> ColorTransport for RawReport<B> {
    type Bus = B;

    fn poll(&mut self, handler: &mut CommandHandler<'_>) -> Option<LinkEvent> {
        let event = match self.bus.poll()? {
            BusEvent::Reset => {
                handler.reset();
                LinkEvent::Connected
            }
            BusEvent::Setup(_) => {
                self.bus.reply(SetupReply::NoData);
                LinkEvent::Ignored
            }
            BusEvent::Report(report) => {
                LinkEvent::ColorApplied(handler.apply_color_payload(&report))
            }
            BusEvent::ControlData(_) => LinkEvent::Ignored,
        };
        Some(event)
    }

    fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}
