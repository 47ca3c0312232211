use super::{BusEvent, ColorTransport, LinkEvent, UsbBus};
use crate::protocol::{CommandHandler, SetupReply};

/// Color commands as vendor control transfers.
///
/// The setup stage carries the reserved request code, the data stage
/// `[red, green, blue]`.
pub struct ControlTransfer<B> {
    bus: B,
}

impl<B: UsbBus> ControlTransfer<B> {
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: UsbBus> ColorTransport for ControlTransfer<B> {
    type Bus = B;

    fn poll(&mut self, handler: &mut CommandHandler<'_>) -> Option<LinkEvent> {
        let event = match self.bus.poll()? {
            BusEvent::Reset => {
                handler.reset();
                LinkEvent::Connected
            }
            BusEvent::Setup(bytes) => {
                let reply = handler.on_setup_bytes(&bytes);
                self.bus.reply(reply);
                match reply {
                    SetupReply::ExpectData => LinkEvent::CommandStarted,
                    SetupReply::NoData => LinkEvent::Ignored,
                }
            }
            BusEvent::ControlData(data) => {
                if handler.is_awaiting_data() {
                    LinkEvent::ColorApplied(handler.on_control_data(&data))
                } else {
                    LinkEvent::Ignored
                }
            }
            BusEvent::Report(_) => LinkEvent::Ignored,
        };
        Some(event)
    }

    fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}
