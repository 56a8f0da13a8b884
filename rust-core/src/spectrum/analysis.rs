//! Critical-band spectrum analyzer
//!
//! Runs the filter bank over each input block, then derives thresholds and
//! peaks from the smoothed band powers. All buffers are sized at construction;
//! `process_block` does not allocate.

use super::bank::{EstimatorKind, FilterBank};
use super::peaks::extract_peaks;
use super::threshold::{ThresholdConfig, ThresholdEngine};
use crate::error::AnalyzerError;
use crate::filters::design::power_to_db;
use crate::filters::BandWidthModel;

/// Analyzer configuration (immutable once the analyzer is built)
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Samples per input block
    pub block_length: usize,

    /// Number of bands
    pub band_count: usize,

    /// Bands per octave (log spacing)
    pub bands_per_octave: usize,

    /// Centre frequency of band 0 in Hz
    pub base_frequency: f64,

    /// Lowest reported level in dB
    pub floor_db: f64,

    /// Band estimation strategy
    pub estimator: EstimatorKind,

    /// Perceptual bandwidth model
    pub width_model: BandWidthModel,

    /// Threshold regions and shaping
    pub threshold: ThresholdConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_length: 441,
            band_count: 288,
            bands_per_octave: 36,
            base_frequency: 13.75,
            floor_db: -40.0,
            estimator: EstimatorKind::Biquad,
            width_model: BandWidthModel::default(),
            threshold: ThresholdConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Configuration with the given shape and default tuning
    pub fn new(
        sample_rate: u32,
        block_length: usize,
        band_count: usize,
        bands_per_octave: usize,
        estimator: EstimatorKind,
    ) -> Self {
        Self {
            sample_rate,
            block_length,
            band_count,
            bands_per_octave,
            estimator,
            ..Self::default()
        }
    }

    /// Copy of this configuration retargeted to another sample rate
    pub fn with_sample_rate(&self, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..self.clone()
        }
    }

    /// Linear amplitude matching `floor_db`
    pub fn amplitude_min(&self) -> f64 {
        10f64.powf(self.floor_db / 20.0)
    }

    /// Check every parameter
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.sample_rate == 0 {
            return Err(AnalyzerError::config("sample rate must be positive"));
        }
        if self.block_length == 0 {
            return Err(AnalyzerError::config("block length must be positive"));
        }
        if self.band_count == 0 {
            return Err(AnalyzerError::config("band count must be at least 1"));
        }
        if self.bands_per_octave == 0 {
            return Err(AnalyzerError::config("bands per octave must be positive"));
        }
        if !(self.base_frequency.is_finite() && self.base_frequency > 0.0) {
            return Err(AnalyzerError::config(format!(
                "base frequency must be positive, got {}",
                self.base_frequency
            )));
        }
        if !(self.floor_db.is_finite() && self.floor_db < 0.0) {
            return Err(AnalyzerError::config(format!(
                "floor must be a finite negative dB value, got {}",
                self.floor_db
            )));
        }
        if !self.width_model.is_valid() {
            return Err(AnalyzerError::config("bandwidth model parameters must be positive"));
        }
        self.threshold.validate().map_err(AnalyzerError::Config)
    }
}

/// Streaming critical-band analyzer
///
/// Not re-entrant: one block at a time, all state owned by the analyzer.
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    bank: FilterBank,
    threshold_engine: ThresholdEngine,
    amp_min: f64,
    powers: Vec<f64>,
    amplitude: Vec<f64>,
    threshold: Vec<f64>,
    peak: Vec<f64>,
}

impl SpectrumAnalyzer {
    /// Create an analyzer
    ///
    /// # Errors
    /// `AnalyzerError::Config` if any parameter is out of range
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        config.validate()?;

        let bank = FilterBank::new(
            config.sample_rate as f64,
            config.base_frequency,
            config.band_count,
            config.bands_per_octave,
            config.estimator,
            &config.width_model,
        );
        let threshold_engine = ThresholdEngine::new(
            &config.threshold,
            config.base_frequency,
            config.band_count,
            config.bands_per_octave,
        );

        let (low, mid) = threshold_engine.boundaries();
        let freqs = bank.frequencies();
        log::debug!(
            "Analyzer built: {} {:?} bands, {:.2}-{:.2} Hz, threshold regions at bands {}/{}",
            config.band_count,
            config.estimator,
            freqs[0],
            freqs[freqs.len() - 1],
            low,
            mid
        );

        let n = config.band_count;
        let floor = config.floor_db;

        Ok(Self {
            amp_min: config.amplitude_min(),
            powers: vec![0.0; n],
            amplitude: vec![floor; n],
            threshold: vec![floor; n],
            peak: vec![floor; n],
            bank,
            threshold_engine,
            config,
        })
    }

    /// Analyze one block
    ///
    /// # Arguments
    /// * `input` - Exactly `block_length` samples
    ///
    /// # Errors
    /// `AnalyzerError::Shape` if the length is wrong; no state changes then
    pub fn process_block(&mut self, input: &[f64]) -> Result<(), AnalyzerError> {
        if input.len() != self.config.block_length {
            return Err(AnalyzerError::Shape {
                expected: self.config.block_length,
                actual: input.len(),
            });
        }

        let floor = self.config.floor_db;

        self.bank.process(input, &mut self.powers);

        for (amp, &power) in self.amplitude.iter_mut().zip(&self.powers) {
            *amp = power_to_db(power, self.amp_min, floor);
        }

        self.threshold_engine
            .compute(&self.powers, self.amp_min, floor, &mut self.threshold);

        extract_peaks(&self.amplitude, &self.threshold, floor, &mut self.peak);

        Ok(())
    }

    /// Band amplitudes in dB from the last block
    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    /// Band thresholds in dB from the last block
    pub fn threshold(&self) -> &[f64] {
        &self.threshold
    }

    /// Peaks in dB from the last block (floor except at detected peaks)
    pub fn peak(&self) -> &[f64] {
        &self.peak
    }

    /// Nominal centre frequency of a band
    pub fn band_frequency(&self, index: usize) -> Option<f64> {
        self.bank.frequencies().get(index).copied()
    }

    /// Nominal centre frequencies of all bands
    pub fn band_frequencies(&self) -> &[f64] {
        self.bank.frequencies()
    }

    /// Number of bands
    pub fn band_count(&self) -> usize {
        self.config.band_count
    }

    /// Configuration the analyzer was built with
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Return to the freshly-constructed state
    pub fn reset(&mut self) {
        let floor = self.config.floor_db;
        self.bank.reset();
        self.powers.fill(0.0);
        self.amplitude.fill(floor);
        self.threshold.fill(floor);
        self.peak.fill(floor);
    }
}
