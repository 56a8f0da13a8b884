//! Constant-Q resonator design
//!
//! Maps a band's centre frequency to a perceptual bandwidth (in semitones) and
//! derives the resonator coefficient shared by both band estimators.

use std::f64::consts::{LN_2, PI};

/// Highest usable design frequency, as a fraction of the sample rate
pub const MAX_DESIGN_RATIO: f64 = 0.5 - 1e-2;

/// Perceptual half-tone bandwidth model
///
/// Bands at or above `reference_freq` get `min_width` semitones; below it the
/// width grows by one semitone per octave, mimicking auditory critical bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandWidthModel {
    /// Minimum bandwidth in semitones
    pub min_width: f64,

    /// Frequency (Hz) at which the minimum width is reached
    pub reference_freq: f64,
}

impl Default for BandWidthModel {
    fn default() -> Self {
        Self {
            min_width: 1.0,
            reference_freq: 1000.0,
        }
    }
}

impl BandWidthModel {
    /// Create a width model
    pub fn new(min_width: f64, reference_freq: f64) -> Self {
        Self {
            min_width,
            reference_freq,
        }
    }

    /// Bandwidth in semitones for a band centred at `freq` (Hz, > 0)
    pub fn half_tone_width(&self, freq: f64) -> f64 {
        let width = self.min_width + (self.reference_freq / freq).log2();
        width.max(self.min_width)
    }

    /// Check that both parameters are finite and positive
    pub fn is_valid(&self) -> bool {
        self.min_width.is_finite()
            && self.min_width > 0.0
            && self.reference_freq.is_finite()
            && self.reference_freq > 0.0
    }
}

/// Perceptual half-tone width for `freq`
///
/// The sample rate does not enter the formula; it is accepted so that every
/// design helper shares the same `(sample_rate, freq, ..)` shape.
pub fn perceptual_half_tone_width(_sample_rate: f64, freq: f64, model: &BandWidthModel) -> f64 {
    model.half_tone_width(freq)
}

/// Resonator coefficient for a constant-Q band
///
/// # Arguments
/// * `sample_rate` - Sample rate in Hz (may be a scaled rate, e.g. half the real one)
/// * `freq` - Centre frequency in Hz
/// * `half_tone_width` - Bandwidth in semitones
///
/// # Returns
/// `sin(ω)·sinh(ln2/4 · ω/sin(ω) · width/12)`, clamped to at most 1
pub fn resonator_alpha(sample_rate: f64, freq: f64, half_tone_width: f64) -> f64 {
    let omega = 2.0 * PI * freq / sample_rate;
    let s = omega.sin();
    let x = LN_2 / 4.0 * omega / s * half_tone_width / 12.0;
    let alpha = s * x.sinh();

    // sin(ω) → 0 near ω = π blows x up; NaN also lands here
    if alpha < 1.0 {
        alpha
    } else {
        1.0
    }
}

/// Clamp a nominal centre frequency below Nyquist
pub fn design_frequency(sample_rate: f64, freq: f64) -> f64 {
    freq.min(sample_rate * MAX_DESIGN_RATIO)
}

/// Convert a linear power to a floored dB amplitude
///
/// # Arguments
/// * `power` - Mean squared amplitude
/// * `amp_min` - Linear amplitude floor (10^(floor_db/20))
/// * `floor_db` - Floor in dB
#[inline]
pub fn power_to_db(power: f64, amp_min: f64, floor_db: f64) -> f64 {
    // f64::max ignores NaN, so a NaN amplitude collapses to the floor
    let amp = power.max(0.0).sqrt().max(amp_min);
    (20.0 * amp.log10()).max(floor_db)
}
