//! Snapshot cell for the target color.
//!
//! The command handler is the only writer, the renderer the only reader,
//! and the two may run in different contexts (main loop and timer
//! interrupt). A critical section only wraps the 3-byte copy, so neither
//! side ever waits for the other to finish any real work.

use core::cell::Cell;

use critical_section::Mutex;

use super::{Rgb, apply_bytes};

/// Single-writer / single-reader color cell.
///
/// Writers compose the whole triple first and publish it in one store, so a
/// reader always sees either the old or the new color, never a mix.
pub struct ColorCell {
    inner: Mutex<Cell<Rgb>>,
}

impl ColorCell {
    /// Create a cell holding `initial`
    pub const fn new(initial: Rgb) -> Self {
        Self {
            inner: Mutex::new(Cell::new(initial)),
        }
    }

    /// Take a consistent copy of the current color
    pub fn snapshot(&self) -> Rgb {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }

    /// Replace the whole color
    pub fn publish(&self, color: Rgb) {
        critical_section::with(|cs| self.inner.borrow(cs).set(color));
    }

    /// Apply a (possibly partial) payload on top of the current color.
    ///
    /// Returns the number of channels written.
    pub fn apply_payload(&self, bytes: &[u8]) -> u8 {
        let mut next = self.snapshot();
        let written = apply_bytes(&mut next, bytes);
        if written > 0 {
            self.publish(next);
        }
        written
    }
}
