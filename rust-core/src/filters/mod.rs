//! Per-band estimators and their design helpers

pub mod basis;
pub mod biquad;
pub mod correlator;
pub mod design;

pub use basis::BasisTable;
pub use biquad::BiquadBand;
pub use correlator::CorrelatorBand;
pub use design::{perceptual_half_tone_width, resonator_alpha, BandWidthModel};

/// Per-band power estimator fed one sample at a time
///
/// `Shared` is read-only state common to every band of one bank (the
/// correlator's basis table); estimators that need none use `()`.
pub trait BandEstimator {
    type Shared;

    /// Feed one input sample
    fn update(&mut self, shared: &Self::Shared, sample: f64);

    /// Current smoothed power (mean square)
    fn power(&self) -> f64;

    /// Clear all recursive state
    fn reset(&mut self);

    /// Feed a whole block and return the resulting power
    #[inline]
    fn process_block(&mut self, shared: &Self::Shared, input: &[f64]) -> f64 {
        for &x in input {
            self.update(shared, x);
        }
        self.power()
    }
}
