//! Frequency-region-aware adaptive threshold
//!
//! Each band's threshold is the average linear power of its neighbours,
//! converted to dB and shaped by a region gain. Bass bands average over a wide
//! window, treble bands over a narrow one, with a linear blend in between.

use crate::filters::design::power_to_db;

/// Gain applied on top of the averaged level
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdShaping {
    /// Plain local average
    None,

    /// Same offset (dB) for every band
    Flat { offset_db: f64 },

    /// `low_db` below the low cutoff, `mid_db` above the mid cutoff,
    /// linearly interpolated in between
    RegionGain { low_db: f64, mid_db: f64 },
}

impl Default for ThresholdShaping {
    fn default() -> Self {
        ThresholdShaping::RegionGain {
            low_db: 2.0,
            mid_db: 1.0,
        }
    }
}

impl ThresholdShaping {
    fn is_finite(&self) -> bool {
        match *self {
            ThresholdShaping::None => true,
            ThresholdShaping::Flat { offset_db } => offset_db.is_finite(),
            ThresholdShaping::RegionGain { low_db, mid_db } => low_db.is_finite() && mid_db.is_finite(),
        }
    }
}

/// Threshold region layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    /// End of the bass region (Hz)
    pub low_freq: f64,

    /// Start of the mid/treble region (Hz)
    pub mid_freq: f64,

    /// Averaging half-width in the bass region, in octaves
    pub low_width_octaves: f64,

    /// Averaging half-width in the mid/treble region, in octaves
    pub mid_width_octaves: f64,

    /// Gain policy
    pub shaping: ThresholdShaping,

    /// Shift applied to band positions before region lookup, in semitones
    pub transpose_semitones: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            low_freq: 80.0,
            mid_freq: 220.0,
            low_width_octaves: 5.0 / 12.0,
            mid_width_octaves: 1.0 / 12.0,
            shaping: ThresholdShaping::default(),
            transpose_semitones: 0.0,
        }
    }
}

impl ThresholdConfig {
    /// Reason the layout is unusable, if any
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.low_freq.is_finite() && self.low_freq > 0.0) {
            return Err(format!("low threshold cutoff must be positive, got {}", self.low_freq));
        }
        if !(self.mid_freq.is_finite() && self.mid_freq > self.low_freq) {
            return Err(format!(
                "mid threshold cutoff ({}) must exceed low cutoff ({})",
                self.mid_freq, self.low_freq
            ));
        }
        if !(self.low_width_octaves.is_finite() && self.low_width_octaves >= 0.0)
            || !(self.mid_width_octaves.is_finite() && self.mid_width_octaves >= 0.0)
        {
            return Err("threshold half-widths must be finite and non-negative".into());
        }
        if !self.transpose_semitones.is_finite() {
            return Err("transpose must be finite".into());
        }
        if !self.shaping.is_finite() {
            return Err("threshold gains must be finite".into());
        }
        Ok(())
    }
}

/// Per-band threshold calculator with widths and gains fixed at construction
#[derive(Debug, Clone)]
pub struct ThresholdEngine {
    half_widths: Vec<usize>,
    gains_db: Vec<f64>,
    low_boundary: i64,
    mid_boundary: i64,
}

impl ThresholdEngine {
    /// Lay out regions for a bank
    ///
    /// # Arguments
    /// * `config` - Region layout and shaping policy
    /// * `base_freq` - Centre frequency of band 0
    /// * `band_count` - Number of bands
    /// * `bands_per_octave` - Log spacing of the bank
    pub fn new(config: &ThresholdConfig, base_freq: f64, band_count: usize, bands_per_octave: usize) -> Self {
        let bpo = bands_per_octave as f64;
        let low_boundary = (bpo * (config.low_freq / base_freq).log2()) as i64;
        let mid_boundary = (bpo * (config.mid_freq / base_freq).log2()) as i64;
        // Nudge so exact fractions of an octave survive the truncation. A window
        // wider than the bank only repeats edge taps, so cap it there.
        let low_width = ((bpo * config.low_width_octaves + 1e-9) as usize).min(band_count);
        let mid_width = ((bpo * config.mid_width_octaves + 1e-9) as usize).min(band_count);

        let (low_gain, mid_gain) = match config.shaping {
            ThresholdShaping::None => (0.0, 0.0),
            ThresholdShaping::Flat { offset_db } => (offset_db, offset_db),
            ThresholdShaping::RegionGain { low_db, mid_db } => (low_db, mid_db),
        };

        let transpose = config.transpose_semitones * bpo / 12.0;
        let mut half_widths = Vec::with_capacity(band_count);
        let mut gains_db = Vec::with_capacity(band_count);

        for band in 0..band_count {
            let pos = band as f64 + transpose;

            let (width, gain) = if pos < low_boundary as f64 {
                (low_width, low_gain)
            } else if pos < mid_boundary as f64 {
                let a2b = (pos - low_boundary as f64) / (mid_boundary - low_boundary) as f64;
                let width = mid_width as f64 * a2b + low_width as f64 * (1.0 - a2b);
                (width as usize, mid_gain * a2b + low_gain * (1.0 - a2b))
            } else {
                (mid_width, mid_gain)
            };

            half_widths.push(width);
            gains_db.push(gain);
        }

        Self {
            half_widths,
            gains_db,
            low_boundary,
            mid_boundary,
        }
    }

    /// Compute one threshold (dB) per band
    ///
    /// # Arguments
    /// * `powers` - Smoothed linear power per band
    /// * `amp_min` - Linear amplitude floor
    /// * `floor_db` - Floor in dB; results never go below it
    /// * `out` - Threshold per band
    pub fn compute(&self, powers: &[f64], amp_min: f64, floor_db: f64, out: &mut [f64]) {
        for (band, th) in out.iter_mut().enumerate() {
            let avg = window_average(powers, band, self.half_widths[band]);
            *th = (power_to_db(avg, amp_min, floor_db) + self.gains_db[band]).max(floor_db);
        }
    }

    /// Averaging half-width (in bands) used for `band`
    pub fn half_width(&self, band: usize) -> usize {
        self.half_widths[band]
    }

    /// Gain (dB) added for `band`
    pub fn gain_db(&self, band: usize) -> f64 {
        self.gains_db[band]
    }

    /// Band-index boundaries of the bass and mid/treble regions
    pub fn boundaries(&self) -> (i64, i64) {
        (self.low_boundary, self.mid_boundary)
    }
}

/// Mean of `powers[center-w ..= center+w]` with indices clamped to the array
///
/// Out-of-range taps repeat the edge band, and the divisor is always `2w+1`.
pub fn window_average(powers: &[f64], center: usize, half_width: usize) -> f64 {
    let last = powers.len() as isize - 1;
    let w = half_width as isize;
    let c = center as isize;

    let sum: f64 = (-w..=w)
        .map(|d| powers[(c + d).clamp(0, last) as usize])
        .sum();

    sum / (2 * half_width + 1) as f64
}
