//! Python bindings for the block analyzer

use crate::error::AnalyzerError;
use crate::spectrum::{AnalyzerConfig, EstimatorKind, SpectrumAnalyzer};
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Estimation strategy exposed to Python
#[pyclass(name = "Estimator")]
#[derive(Clone)]
pub enum PyEstimator {
    Biquad,
    Correlator,
}

impl From<PyEstimator> for EstimatorKind {
    fn from(py_est: PyEstimator) -> Self {
        match py_est {
            PyEstimator::Biquad => EstimatorKind::Biquad,
            PyEstimator::Correlator => EstimatorKind::Correlator,
        }
    }
}

pub(crate) fn to_py_err(e: AnalyzerError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Configuration from the keyword arguments shared by both classes
pub(crate) fn config_from_args(
    sample_rate: u32,
    block_length: usize,
    band_count: usize,
    bands_per_octave: usize,
    base_frequency: f64,
    floor_db: f64,
    estimator: PyEstimator,
) -> AnalyzerConfig {
    AnalyzerConfig {
        base_frequency,
        floor_db,
        ..AnalyzerConfig::new(sample_rate, block_length, band_count, bands_per_octave, estimator.into())
    }
}

/// Critical-band spectrum analyzer exposed to Python
#[pyclass(name = "SpectrumAnalyzer")]
pub struct PySpectrumAnalyzer {
    analyzer: SpectrumAnalyzer,
}

#[pymethods]
impl PySpectrumAnalyzer {
    /// Create a new analyzer
    ///
    /// Args:
    ///     sample_rate: Sample rate in Hz
    ///     block_length: Samples per block passed to process_block
    ///     band_count: Number of bands
    ///     bands_per_octave: Log spacing of the bands
    ///     base_frequency: Centre frequency of band 0 in Hz
    ///     floor_db: Lowest reported level in dB
    ///     estimator: Band estimation strategy
    ///
    /// Raises:
    ///     ValueError: if any parameter is out of range
    #[new]
    #[pyo3(signature = (
        sample_rate=44100,
        block_length=441,
        band_count=288,
        bands_per_octave=36,
        base_frequency=13.75,
        floor_db=-40.0,
        estimator=PyEstimator::Biquad
    ))]
    fn new(
        sample_rate: u32,
        block_length: usize,
        band_count: usize,
        bands_per_octave: usize,
        base_frequency: f64,
        floor_db: f64,
        estimator: PyEstimator,
    ) -> PyResult<Self> {
        let config = config_from_args(
            sample_rate,
            block_length,
            band_count,
            bands_per_octave,
            base_frequency,
            floor_db,
            estimator,
        );

        Ok(Self {
            analyzer: SpectrumAnalyzer::new(config).map_err(to_py_err)?,
        })
    }

    /// Analyze one block of samples
    ///
    /// Args:
    ///     block: Exactly block_length samples as numpy array
    ///
    /// Raises:
    ///     ValueError: on a block of the wrong length
    fn process_block(&mut self, block: PyReadonlyArray1<f64>) -> PyResult<()> {
        let result = match block.as_slice() {
            Ok(samples) => self.analyzer.process_block(samples),
            Err(_) => {
                // Strided view; copy into contiguous storage
                let samples: Vec<f64> = block.as_array().iter().copied().collect();
                self.analyzer.process_block(&samples)
            }
        };

        result.map_err(to_py_err)
    }

    /// Band amplitudes in dB from the last block
    fn amplitude<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_slice(py, self.analyzer.amplitude())
    }

    /// Band thresholds in dB from the last block
    fn threshold<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_slice(py, self.analyzer.threshold())
    }

    /// Peaks in dB from the last block (floor where there is no peak)
    fn peak<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_slice(py, self.analyzer.peak())
    }

    /// Nominal centre frequency of a band, None when out of range
    fn band_frequency(&self, index: usize) -> Option<f64> {
        self.analyzer.band_frequency(index)
    }

    /// Nominal centre frequencies of all bands
    fn band_frequencies<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_slice(py, self.analyzer.band_frequencies())
    }

    /// Number of bands
    #[getter]
    fn band_count(&self) -> usize {
        self.analyzer.band_count()
    }

    /// Sample rate in Hz
    #[getter]
    fn sample_rate(&self) -> u32 {
        self.analyzer.config().sample_rate
    }

    /// Samples per block
    #[getter]
    fn block_length(&self) -> usize {
        self.analyzer.config().block_length
    }

    /// Clear all band state and outputs
    fn reset(&mut self) {
        self.analyzer.reset();
    }
}
