//! Resonant bandpass band estimator
//!
//! Each band runs a constant-peak-gain biquad bandpass tuned to its centre
//! frequency and tracks the exponential average of the squared output.

use super::design::{perceptual_half_tone_width, resonator_alpha, BandWidthModel};
use super::BandEstimator;

/// Biquad bandpass band with running power
#[derive(Debug, Clone)]
pub struct BiquadBand {
    /// Normalized feed-forward gain b0/a0 (b2 = -b0)
    kb0: f64,

    /// Normalized feedback coefficients a1/a0, a2/a0
    ka1: f64,
    ka2: f64,

    /// Power averaging time constant
    sigma: f64,

    /// Output history y[n-1], y[n-2]
    a1: f64,
    a2: f64,

    /// Input history x[n-1], x[n-2]
    b1: f64,
    b2: f64,

    power: f64,
}

impl BiquadBand {
    /// Design a band
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `freq` - Design centre frequency in Hz (already clamped below Nyquist)
    /// * `model` - Bandwidth model
    pub fn new(sample_rate: f64, freq: f64, model: &BandWidthModel) -> Self {
        let width = perceptual_half_tone_width(sample_rate, freq, model);
        let alpha = resonator_alpha(sample_rate, freq, width);
        let omega = 2.0 * std::f64::consts::PI * freq / sample_rate;
        let a0 = 1.0 + alpha;

        // Same resonator evaluated at half the rate: a slower, decoupled smoother
        let sigma = resonator_alpha(sample_rate / 2.0, freq, width);

        Self {
            kb0: alpha / a0,
            ka1: -2.0 * omega.cos() / a0,
            ka2: (1.0 - alpha) / a0,
            sigma,
            a1: 0.0,
            a2: 0.0,
            b1: 0.0,
            b2: 0.0,
            power: 0.0,
        }
    }

    /// Filter one sample and return the bandpass output
    #[inline]
    pub fn filter(&mut self, x: f64) -> f64 {
        let y = self.kb0 * x - self.kb0 * self.b2 - self.ka1 * self.a1 - self.ka2 * self.a2;

        self.a2 = self.a1;
        self.a1 = y;
        self.b2 = self.b1;
        self.b1 = x;

        y
    }

    /// Power smoothing constant
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Normalized coefficients (kb0, ka1, ka2)
    pub fn coefficients(&self) -> (f64, f64, f64) {
        (self.kb0, self.ka1, self.ka2)
    }
}

impl BandEstimator for BiquadBand {
    type Shared = ();

    #[inline]
    fn update(&mut self, _shared: &(), sample: f64) {
        let y = self.filter(sample);
        self.power += (y * y - self.power) * self.sigma;
    }

    fn power(&self) -> f64 {
        self.power
    }

    fn reset(&mut self) {
        self.a1 = 0.0;
        self.a2 = 0.0;
        self.b1 = 0.0;
        self.b2 = 0.0;
        self.power = 0.0;
    }
}
