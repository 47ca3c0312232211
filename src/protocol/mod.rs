//! Color command protocol
//!
//! Turns control requests and payloads delivered by the transport into
//! updates of the shared [`ColorCell`].

pub mod descriptor;
pub mod setup;

#[cfg(feature = "esp32-log")]
use esp_println::println;

pub use descriptor::{HID_REPORT_DESCRIPTOR, PRODUCT_ID, REPORT_SIZE, SET_RGB_REQUEST, VENDOR_ID};
pub use setup::{Direction, InvalidSetupPacket, RequestType, SetupPacket, SetupReply};

use crate::color::{CHANNEL_COUNT, ColorCell};

/// Outcome of classifying a setup request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Not implemented, answered with no data
    Ignore,
    /// A color payload follows in the data stage
    ColorUpdateBegin,
}

impl Classification {
    /// Reply the transport has to send for this classification
    pub const fn reply(self) -> SetupReply {
        match self {
            Classification::Ignore => SetupReply::NoData,
            Classification::ColorUpdateBegin => SetupReply::ExpectData,
        }
    }
}

/// Acceptance rule for color payloads that are not exactly three bytes.
///
/// Payloads longer than three bytes are truncated under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthPolicy {
    /// Short payloads update the leading channels only
    #[default]
    Lenient,
    /// Short payloads are dropped
    RequireFull,
}

impl LengthPolicy {
    /// Check if a payload of `len` bytes may be applied
    pub const fn accepts(self, len: usize) -> bool {
        match self {
            LengthPolicy::Lenient => true,
            LengthPolicy::RequireFull => len >= CHANNEL_COUNT,
        }
    }
}

/// Classify a setup request against the reserved color request code.
///
/// Only the type bits and the request code are checked. The direction bit
/// is not: a device-to-host request carrying the color code is still a
/// color update, and its data stage is whatever the host sends next.
pub fn classify_request(request_type: u8, request: u8, set_rgb_request: u8) -> Classification {
    if RequestType::of(request_type) == RequestType::Vendor && request == set_rgb_request {
        Classification::ColorUpdateBegin
    } else {
        Classification::Ignore
    }
}

/// Decodes color commands and writes them into a [`ColorCell`]
pub struct CommandHandler<'a> {
    color: &'a ColorCell,
    set_rgb_request: u8,
    policy: LengthPolicy,
    /// A `ColorUpdateBegin` was answered and its data stage is outstanding
    awaiting_data: bool,
}

impl<'a> CommandHandler<'a> {
    /// Create a handler writing into `color`
    pub const fn new(color: &'a ColorCell, set_rgb_request: u8, policy: LengthPolicy) -> Self {
        Self {
            color,
            set_rgb_request,
            policy,
            awaiting_data: false,
        }
    }

    /// Classify a setup request and remember whether a payload is expected
    pub fn on_setup(&mut self, packet: &SetupPacket) -> SetupReply {
        let classification =
            classify_request(packet.request_type, packet.request, self.set_rgb_request);
        self.awaiting_data = classification == Classification::ColorUpdateBegin;

        #[cfg(feature = "esp32-log")]
        println!(
            "[CommandHandler.on_setup] request {:?} (type {:?}) -> {:?}",
            packet.request, packet.request_type, classification
        );

        classification.reply()
    }

    /// Classify a raw setup stage.
    ///
    /// A buffer that is not a setup packet is answered like any
    /// unimplemented request and cancels an outstanding data stage.
    pub fn on_setup_bytes(&mut self, bytes: &[u8]) -> SetupReply {
        match SetupPacket::parse(bytes) {
            Ok(packet) => self.on_setup(&packet),
            Err(_) => {
                self.awaiting_data = false;

                #[cfg(feature = "esp32-log")]
                println!("[CommandHandler.on_setup_bytes] dropped {:?} bytes", bytes.len());

                Classification::Ignore.reply()
            }
        }
    }

    /// Handle the data stage of a control transfer.
    ///
    /// Data without a preceding `ColorUpdateBegin` is dropped.
    pub fn on_control_data(&mut self, bytes: &[u8]) -> u8 {
        if !self.awaiting_data {
            return 0;
        }
        self.awaiting_data = false;
        self.apply_color_payload(bytes)
    }

    /// Copy up to three payload bytes into the color, in red, green, blue order.
    ///
    /// Returns the number of channels written.
    pub fn apply_color_payload(&mut self, bytes: &[u8]) -> u8 {
        if !self.policy.accepts(bytes.len()) {
            return 0;
        }
        self.color.apply_payload(bytes)
    }

    /// Check if a data stage is outstanding
    pub const fn is_awaiting_data(&self) -> bool {
        self.awaiting_data
    }

    /// Forget any outstanding data stage
    pub fn reset(&mut self) {
        self.awaiting_data = false;
    }
}
