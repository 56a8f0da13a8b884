//! Python bindings for the live analyzer

use super::analyzer_bindings::{config_from_args, to_py_err, PyEstimator};
use crate::audio::{LiveAnalyzer, ProcessorError};
use numpy::PyArray1;
use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

fn processor_err(e: ProcessorError) -> PyErr {
    match e {
        ProcessorError::Analyzer(e) => to_py_err(e),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

/// Live analyzer exposed to Python
///
/// Capture and analysis run on Rust threads; Python only polls frames.
#[pyclass(name = "LiveAnalyzer", unsendable)]
pub struct PyLiveAnalyzer {
    live: LiveAnalyzer,
}

#[pymethods]
impl PyLiveAnalyzer {
    /// Create a stopped live analyzer
    ///
    /// Same arguments as SpectrumAnalyzer; the sample rate follows the
    /// capture device once started.
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

        let live = LiveAnalyzer::new(config).map_err(processor_err)?;
        Ok(Self { live })
    }

    /// Start capture from the default input device
    ///
    /// Returns:
    ///     Device name as string
    fn start(&mut self) -> PyResult<String> {
        self.live.start_capture().map_err(processor_err)
    }

    /// Stop capture and analysis
    fn stop(&mut self) {
        self.live.stop();
    }

    /// Check if capture is running
    fn is_running(&self) -> bool {
        self.live.is_running()
    }

    /// Sample rate in effect (device rate once started)
    #[getter]
    fn sample_rate(&self) -> u32 {
        self.live.config().sample_rate
    }

    /// Samples lost because analysis fell behind
    fn dropped_samples(&self) -> u64 {
        self.live.dropped_samples()
    }

    /// Get the newest analysis frame
    ///
    /// Returns:
    ///     Dictionary with keys: 'amplitude', 'threshold', 'peak',
    ///     'block_index' or None if no new frame
    fn get_frame(&self, py: Python<'_>) -> PyResult<Option<PyObject>> {
        let Some(frame) = self.live.latest_frame() else {
            return Ok(None);
        };

        let dict = pyo3::types::PyDict::new(py);
        dict.set_item("amplitude", PyArray1::from_vec(py, frame.amplitude))?;
        dict.set_item("threshold", PyArray1::from_vec(py, frame.threshold))?;
        dict.set_item("peak", PyArray1::from_vec(py, frame.peak))?;
        dict.set_item("block_index", frame.block_index)?;

        Ok(Some(dict.into()))
    }

    /// List available input device names
    #[staticmethod]
    fn list_devices() -> PyResult<Vec<String>> {
        crate::audio::list_input_devices()
            .map(|devices| devices.into_iter().map(|d| d.name).collect())
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}
