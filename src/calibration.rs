//! Oscillator self-calibration against USB frame timing.
//!
//! The internal RC oscillator is tuned through an 8-bit trim register until
//! the length of a USB frame, measured in CPU cycles, matches what a clock
//! running at exactly the nominal frequency would count.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::storage::{ByteStorage, store_trim};

/// First step of the coarse binary search
const INITIAL_STEP: u8 = 128;

/// Number of probe calls made by one calibration run
pub const PROBE_COUNT: usize = 8 + 3;

/// Internal oscillator with a trim register
pub trait Oscillator {
    /// Load a new trim value into the oscillator
    fn set_trim(&mut self, trim: u8);
}

/// Synchronous frame-length measurement, provided by the USB transport.
///
/// The returned value is proportional to the real CPU frequency.
pub trait FrameProbe {
    fn measure_frame_length(&mut self) -> u16;
}

/// Frame length a clock running at exactly `clock_hz` would measure
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn target_frame_length(clock_hz: u32) -> u16 {
    libm::floor(1499.0 * f64::from(clock_hz) / 10.5e6 + 0.5) as u16
}

/// Search the trim value whose measured frame length is closest to `target`.
///
/// `measure` loads the given trim and returns the resulting frame length.
/// A coarse binary search settles within one step of the optimum, then the
/// three neighbours are compared directly. Ties go to the lowest candidate.
pub fn search_trim<F>(target: u16, mut measure: F) -> u8
where
    F: FnMut(u8) -> u16,
{
    let mut base: u8 = 0;
    let mut step = INITIAL_STEP;
    while step > 0 {
        if measure(base + step) < target {
            base += step;
        }
        step >>= 1;
    }

    let candidates = [base.saturating_sub(1), base, base.saturating_add(1)];
    let mut best = base;
    let mut best_deviation = u16::MAX;
    for trim in candidates {
        let deviation = measure(trim).abs_diff(target);
        if deviation < best_deviation {
            best_deviation = deviation;
            best = trim;
        }
    }
    best
}

/// One-shot calibrator run on every USB reset
#[derive(Debug, Clone, Copy)]
pub struct Calibrator {
    target: u16,
}

impl Calibrator {
    /// Create a calibrator for a nominal clock of `clock_hz`
    pub fn new(clock_hz: u32) -> Self {
        Self::with_target(target_frame_length(clock_hz))
    }

    /// Create a calibrator with an explicit target frame length
    pub const fn with_target(target: u16) -> Self {
        Self { target }
    }

    /// Target frame length this calibrator aims for
    pub const fn target(&self) -> u16 {
        self.target
    }

    /// Run the search with interrupts masked, commit and persist the result.
    ///
    /// The probe counts CPU cycles, so nothing may preempt it. The critical
    /// section ends before the (slow) storage write.
    pub fn calibrate<O, P, S>(&self, oscillator: &mut O, probe: &mut P, storage: &mut S) -> u8
    where
        O: Oscillator,
        P: FrameProbe,
        S: ByteStorage,
    {
        let trim = critical_section::with(|_| {
            let trim = search_trim(self.target, |trial| {
                oscillator.set_trim(trial);
                probe.measure_frame_length()
            });
            oscillator.set_trim(trim);
            trim
        });
        store_trim(storage, trim);

        #[cfg(feature = "esp32-log")]
        println!(
            "[Calibrator.calibrate] trim {:?} (target frame length {:?})",
            trim, self.target
        );

        trim
    }
}
