//! USB control transfer setup stage.

/// Length of a setup packet on the wire
pub const SETUP_PACKET_LEN: usize = 8;

const DIRECTION_MASK: u8 = 0x80;
const TYPE_MASK: u8 = 0x60;
const TYPE_SHIFT: u8 = 5;

/// Error returned for a buffer that is not a setup packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSetupPacket {
    /// Length of the rejected buffer
    pub len: usize,
}

/// Data stage direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HostToDevice,
    DeviceToHost,
}

/// Request type field of `bmRequestType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Standard,
    Class,
    Vendor,
    Reserved,
}

impl RequestType {
    /// Decode the type bits of a raw `bmRequestType`
    pub const fn of(request_type: u8) -> Self {
        match (request_type & TYPE_MASK) >> TYPE_SHIFT {
            0 => RequestType::Standard,
            1 => RequestType::Class,
            2 => RequestType::Vendor,
            _ => RequestType::Reserved,
        }
    }
}

/// Decoded setup packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupPacket {
    /// Raw `bmRequestType`
    pub request_type: u8,
    /// Raw `bRequest`
    pub request: u8,
    pub value: u16,
    pub index: u16,
    /// Number of bytes in the data stage
    pub length: u16,
}

impl SetupPacket {
    /// Decode the 8-byte setup stage
    pub fn parse(bytes: &[u8]) -> Result<Self, InvalidSetupPacket> {
        let Ok(raw) = <[u8; SETUP_PACKET_LEN]>::try_from(bytes) else {
            return Err(InvalidSetupPacket { len: bytes.len() });
        };
        Ok(Self {
            request_type: raw[0],
            request: raw[1],
            value: u16::from_le_bytes([raw[2], raw[3]]),
            index: u16::from_le_bytes([raw[4], raw[5]]),
            length: u16::from_le_bytes([raw[6], raw[7]]),
        })
    }

    /// Encode back into the wire layout
    pub const fn to_bytes(&self) -> [u8; SETUP_PACKET_LEN] {
        let [value_lo, value_hi] = self.value.to_le_bytes();
        let [index_lo, index_hi] = self.index.to_le_bytes();
        let [length_lo, length_hi] = self.length.to_le_bytes();
        [
            self.request_type,
            self.request,
            value_lo,
            value_hi,
            index_lo,
            index_hi,
            length_lo,
            length_hi,
        ]
    }

    /// Build a host-to-device vendor request with a data stage of `length` bytes
    pub const fn vendor_out(request: u8, length: u16) -> Self {
        Self {
            request_type: 0x40,
            request,
            value: 0,
            index: 0,
            length,
        }
    }

    pub const fn direction(&self) -> Direction {
        if self.request_type & DIRECTION_MASK == 0 {
            Direction::HostToDevice
        } else {
            Direction::DeviceToHost
        }
    }

    pub const fn kind(&self) -> RequestType {
        RequestType::of(self.request_type)
    }
}

/// How the transport must answer a setup request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupReply {
    /// Complete the transfer with a zero-length data stage
    NoData,
    /// Accept the data stage that follows
    ExpectData,
}
