//! Software PWM renderer
//!
//! Every tick compares a free-running 8-bit counter with each channel of
//! the target color. Over one 256-tick period a channel of value `v` is on
//! for exactly `v` ticks, so 255 is the brightest level and never fully on.

mod pins;
mod tick;

pub use pins::PinOutputs;
pub use tick::{RenderCadence, RenderEngine, TickSlot, TickSource};

use crate::OutputDriver;
use crate::color::{Channel, ColorCell, Rgb};

/// Number of ticks in one PWM period
pub const PWM_PERIOD: usize = 256;

/// Binary level of each output during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputLevels {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl OutputLevels {
    /// All outputs low
    pub const OFF: Self = Self {
        red: false,
        green: false,
        blue: false,
    };

    /// Levels for tick `counter` of a period rendering `color`
    pub const fn at(counter: u8, color: Rgb) -> Self {
        Self {
            red: counter < color.r,
            green: counter < color.g,
            blue: counter < color.b,
        }
    }

    /// Level of a single channel
    pub const fn get(self, channel: Channel) -> bool {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
        }
    }
}

/// PWM tick counter and output computation.
///
/// The counter is the only state; the output of a tick depends on nothing
/// but the counter and the color read at that tick.
#[derive(Debug, Clone, Default)]
pub struct PwmRenderer {
    counter: u8,
}

impl PwmRenderer {
    pub const fn new() -> Self {
        Self { counter: 0 }
    }

    /// Position inside the current period
    pub const fn counter(&self) -> u8 {
        self.counter
    }

    /// Restart the period from tick 0
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Render one tick: snapshot the color once, drive the outputs, advance.
    pub fn tick<O: OutputDriver>(&mut self, color: &ColorCell, output: &mut O) -> OutputLevels {
        let levels = OutputLevels::at(self.counter, color.snapshot());
        output.write(levels);
        self.counter = self.counter.wrapping_add(1);
        levels
    }
}
