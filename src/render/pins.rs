use embedded_hal::digital::{OutputPin, PinState};

use super::OutputLevels;
use crate::OutputDriver;

/// Drives the three channels through GPIO pins
pub struct PinOutputs<R, G, B> {
    red: R,
    green: G,
    blue: B,
}

impl<R: OutputPin, G: OutputPin, B: OutputPin> PinOutputs<R, G, B> {
    pub const fn new(red: R, green: G, blue: B) -> Self {
        Self { red, green, blue }
    }
}

impl<R: OutputPin, G: OutputPin, B: OutputPin> OutputDriver for PinOutputs<R, G, B> {
    fn write(&mut self, levels: OutputLevels) {
        // A failed write shows up as a glitch for one tick at most
        self.red.set_state(PinState::from(levels.red)).ok();
        self.green.set_state(PinState::from(levels.green)).ok();
        self.blue.set_state(PinState::from(levels.blue)).ok();
    }
}
