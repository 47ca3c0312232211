//! Color types shared between the command handler and the renderer.

mod cell;

pub use cell::ColorCell;
use smart_leds::RGB8;

pub type Rgb = RGB8;

/// Number of color channels driven by the device
pub const CHANNEL_COUNT: usize = 3;

/// Color shown after every cold start
pub const DEFAULT_COLOR: Rgb = Rgb { r: 255, g: 0, b: 0 };

/// Output channel, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Channel {
    /// All channels in the order they appear in a color payload
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::Red, Channel::Green, Channel::Blue];
}

/// Overwrite the leading channels of `color` with `bytes`.
///
/// Bytes past the third are ignored, channels without a byte keep their
/// value. Returns the number of channels written.
#[allow(clippy::cast_possible_truncation)]
pub fn apply_bytes(color: &mut Rgb, bytes: &[u8]) -> u8 {
    let count = bytes.len().min(CHANNEL_COUNT);
    for (channel, &value) in Channel::ALL.iter().zip(bytes) {
        match channel {
            Channel::Red => color.r = value,
            Channel::Green => color.g = value,
            Channel::Blue => color.b = value,
        }
    }
    count as u8
}
