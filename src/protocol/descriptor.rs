//! Static identification of the device.

/// Shared V-USB vendor id for HID class devices
pub const VENDOR_ID: u16 = 0x16C0;

/// Shared V-USB product id for HID class devices
pub const PRODUCT_ID: u16 = 0x05DF;

/// Vendor request carrying `[red, green, blue]` in its data stage
pub const SET_RGB_REQUEST: u8 = 0x01;

/// Size of the raw report written by the host in report mode
pub const REPORT_SIZE: usize = 64;

/// Report descriptor with one opaque vendor-defined byte.
///
/// It only lets the host bind the HID class driver; no color data ever
/// travels through this feature report.
pub const HID_REPORT_DESCRIPTOR: [u8; 22] = [
    0x06, 0x00, 0xff, // USAGE_PAGE (Vendor Defined Page 1)
    0x09, 0x01, // USAGE (Vendor Usage 1)
    0xa1, 0x01, // COLLECTION (Application)
    0x15, 0x00, //   LOGICAL_MINIMUM (0)
    0x26, 0xff, 0x00, //   LOGICAL_MAXIMUM (255)
    0x75, 0x08, //   REPORT_SIZE (8)
    0x95, 0x01, //   REPORT_COUNT (1)
    0x09, 0x00, //   USAGE (Undefined)
    0xb2, 0x02, 0x01, //   FEATURE (Data,Var,Abs,Buf)
    0xc0, // END_COLLECTION
];
