//! Render cadence
//!
//! The renderer does not care who calls it: the main loop between two
//! transport polls, or a timer compare interrupt.

use core::cell::RefCell;

use critical_section::Mutex;

use super::{OutputLevels, PwmRenderer};
use crate::OutputDriver;
use crate::color::ColorCell;

/// Who drives the render tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderCadence {
    /// The main dispatch loop renders once per iteration
    #[default]
    Inline,
    /// A timer interrupt calls [`TickSlot::on_tick`]
    Interrupt,
}

/// Entry point of a fixed-cadence tick
pub trait TickSource {
    fn on_tick(&mut self);

    /// Return to the power-on state
    fn reset(&mut self) {}
}

/// Renderer bound to its color source and outputs
pub struct RenderEngine<'a, O: OutputDriver> {
    renderer: PwmRenderer,
    color: &'a ColorCell,
    output: O,
    last: OutputLevels,
}

impl<'a, O: OutputDriver> RenderEngine<'a, O> {
    pub const fn new(color: &'a ColorCell, output: O) -> Self {
        Self {
            renderer: PwmRenderer::new(),
            color,
            output,
            last: OutputLevels::OFF,
        }
    }

    pub const fn renderer(&self) -> &PwmRenderer {
        &self.renderer
    }

    pub const fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Levels driven by the latest tick
    pub const fn last_levels(&self) -> OutputLevels {
        self.last
    }
}

impl<O: OutputDriver> TickSource for RenderEngine<'_, O> {
    fn on_tick(&mut self) {
        self.last = self.renderer.tick(self.color, &mut self.output);
    }

    fn reset(&mut self) {
        self.renderer.reset();
        self.last = OutputLevels::OFF;
        self.output.write(OutputLevels::OFF);
    }
}

/// Slot sharing a tick source between the main loop and an interrupt.
///
/// Place it in a `static`, install the engine once at startup and call
/// [`TickSlot::on_tick`] from the timer handler.
pub struct TickSlot<T> {
    inner: Mutex<RefCell<Option<T>>>,
}

impl<T: TickSource> TickSlot<T> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install a tick source, returning the previous one
    pub fn install(&self, source: T) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().replace(source))
    }

    /// Remove the installed tick source
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().take())
    }

    /// Run a tick on the installed source.
    ///
    /// Returns `false` if nothing is installed.
    pub fn on_tick(&self) -> bool {
        self.with(|source| source.on_tick()).is_some()
    }

    /// Access the installed source
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().as_mut().map(f))
    }
}

impl<T: TickSource> Default for TickSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TickSource> TickSource for &TickSlot<T> {
    fn on_tick(&mut self) {
        TickSlot::on_tick(*self);
    }

    fn reset(&mut self) {
        self.with(|source| source.reset());
    }
}
