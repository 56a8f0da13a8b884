//! Quadrature correlator band estimator
//!
//! Recursive single-bin DFT: the input is mixed with a table-driven reference
//! oscillator at the band frequency, the in-phase/quadrature products are
//! low-passed, and their magnitude is averaged into a band power.

use num_complex::Complex64;

use super::basis::BasisTable;
use super::design::{perceptual_half_tone_width, resonator_alpha, BandWidthModel};
use super::BandEstimator;

/// Widening applied to the correlator's smoothing to tame side lobes
pub const SIDE_LOBE_FACTOR: f64 = 1.5;

/// Correlator band with running power
#[derive(Debug, Clone)]
pub struct CorrelatorBand {
    /// Phase increment per sample, in cycles
    delta: f64,

    /// I/Q smoothing time constant
    sigma: f64,

    /// Reference phase in cycles, [0, 1)
    phase: f64,

    /// Smoothed correlation (re = in-phase, im = quadrature)
    acc: Complex64,

    power: f64,
}

impl CorrelatorBand {
    /// Design a band
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `freq` - Design centre frequency in Hz (already clamped below Nyquist)
    /// * `model` - Bandwidth model
    pub fn new(sample_rate: f64, freq: f64, model: &BandWidthModel) -> Self {
        let width = perceptual_half_tone_width(sample_rate, freq, model);
        let sigma = (resonator_alpha(sample_rate, freq, width) * SIDE_LOBE_FACTOR).min(1.0);

        Self {
            delta: freq / sample_rate,
            sigma,
            phase: 0.0,
            acc: Complex64::new(0.0, 0.0),
            power: 0.0,
        }
    }

    /// Phase increment per sample (cycles)
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// I/Q smoothing constant
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl BandEstimator for CorrelatorBand {
    type Shared = BasisTable;

    #[inline]
    fn update(&mut self, basis: &BasisTable, sample: f64) {
        self.phase += self.delta;
        self.phase -= self.phase.floor();

        let (c, s) = basis.lookup(self.phase);
        let target = Complex64::new(sample * c, sample * s);
        self.acc += (target - self.acc) * self.sigma;

        // x·e^{iθ} keeps half of a sinusoid's amplitude; scale back to mean square
        let instant = 2.0 * self.acc.norm_sqr();
        self.power += (instant - self.power) * self.delta;
    }

    fn power(&self) -> f64 {
        self.power
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.acc = Complex64::new(0.0, 0.0);
        self.power = 0.0;
    }
}
