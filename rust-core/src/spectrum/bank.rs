//! Logarithmically spaced filter bank
//!
//! Holds one estimator per band, all of the same kind, built once from the
//! analyzer configuration. Only the recursive band state changes afterwards.

use crate::filters::design::design_frequency;
use crate::filters::{BandEstimator, BandWidthModel, BasisTable, BiquadBand, CorrelatorBand};

/// Band estimation strategy, fixed for the lifetime of a bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EstimatorKind {
    /// Resonant bandpass biquad with exponential power averaging
    #[default]
    Biquad,

    /// Quadrature correlator (recursive single-bin DFT)
    Correlator,
}

/// Nominal centre frequency of band `index`
#[inline]
pub fn band_frequency(base_freq: f64, bands_per_octave: usize, index: usize) -> f64 {
    base_freq * 2f64.powf(index as f64 / bands_per_octave as f64)
}

enum Bands {
    Biquad(Vec<BiquadBand>),
    Correlator {
        bands: Vec<CorrelatorBand>,
        basis: BasisTable,
    },
}

/// Ordered collection of band estimators
pub struct FilterBank {
    bands: Bands,
    frequencies: Vec<f64>,
}

impl FilterBank {
    /// Build a bank
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `base_freq` - Centre frequency of band 0
    /// * `band_count` - Number of bands
    /// * `bands_per_octave` - Log spacing
    /// * `kind` - Estimation strategy
    /// * `model` - Bandwidth model
    pub fn new(
        sample_rate: f64,
        base_freq: f64,
        band_count: usize,
        bands_per_octave: usize,
        kind: EstimatorKind,
        model: &BandWidthModel,
    ) -> Self {
        let frequencies: Vec<f64> = (0..band_count)
            .map(|i| band_frequency(base_freq, bands_per_octave, i))
            .collect();

        let design = frequencies.iter().map(|&f| design_frequency(sample_rate, f));

        let bands = match kind {
            EstimatorKind::Biquad => Bands::Biquad(
                design.map(|f| BiquadBand::new(sample_rate, f, model)).collect(),
            ),
            EstimatorKind::Correlator => Bands::Correlator {
                bands: design
                    .map(|f| CorrelatorBand::new(sample_rate, f, model))
                    .collect(),
                basis: BasisTable::default(),
            },
        };

        Self { bands, frequencies }
    }

    /// Run every band over `input` and write one power per band
    ///
    /// # Arguments
    /// * `input` - Block of samples
    /// * `powers` - Output, one entry per band (length must equal `len()`)
    pub fn process(&mut self, input: &[f64], powers: &mut [f64]) {
        debug_assert_eq!(powers.len(), self.frequencies.len());

        match &mut self.bands {
            Bands::Biquad(bands) => run_bands(bands, &(), input, powers),
            Bands::Correlator { bands, basis } => run_bands(bands, basis, input, powers),
        }
    }

    /// Clear the recursive state of every band
    pub fn reset(&mut self) {
        match &mut self.bands {
            Bands::Biquad(bands) => bands.iter_mut().for_each(BandEstimator::reset),
            Bands::Correlator { bands, .. } => bands.iter_mut().for_each(BandEstimator::reset),
        }
    }

    /// Nominal centre frequencies, one per band
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Number of bands
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// True when the bank has no bands
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Strategy this bank was built with
    pub fn kind(&self) -> EstimatorKind {
        match self.bands {
            Bands::Biquad(_) => EstimatorKind::Biquad,
            Bands::Correlator { .. } => EstimatorKind::Correlator,
        }
    }
}

fn run_bands<E: BandEstimator>(bands: &mut [E], shared: &E::Shared, input: &[f64], powers: &mut [f64]) {
    for (band, power) in bands.iter_mut().zip(powers.iter_mut()) {
        *power = band.process_block(shared, input);
    }
}
