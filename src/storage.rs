//! Non-volatile storage of the calibration byte.

/// Address of the persisted oscillator trim
pub const CALIBRATION_ADDRESS: u16 = 0;

/// Value of a never-written EEPROM cell.
///
/// A calibration that ends at trim 0xFF stores this same value, so it reads
/// back as "never calibrated" and is not restored at boot. The device is
/// recalibrated on the next bus reset either way.
pub const ERASED_BYTE: u8 = 0xFF;

/// Byte addressable non-volatile memory (EEPROM on AVR parts)
pub trait ByteStorage {
    /// Read the byte at `address`
    fn read_byte(&mut self, address: u16) -> u8;

    /// Write `value` at `address`
    fn write_byte(&mut self, address: u16, value: u8);
}

/// Load the persisted trim, if one was ever written.
///
/// A stored 0xFF is indistinguishable from an erased cell, see [`ERASED_BYTE`].
pub fn load_trim<S: ByteStorage>(storage: &mut S) -> Option<u8> {
    match storage.read_byte(CALIBRATION_ADDRESS) {
        ERASED_BYTE => None,
        trim => Some(trim),
    }
}

/// Persist the trim, overwriting the previous value unconditionally
pub fn store_trim<S: ByteStorage>(storage: &mut S, trim: u8) {
    storage.write_byte(CALIBRATION_ADDRESS, trim);
}
