//! PyO3 bindings for Python integration

use pyo3::prelude::*;

mod analyzer_bindings;
mod processor_bindings;

/// Python module definition
#[pymodule]
fn bandscope(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<analyzer_bindings::PySpectrumAnalyzer>()?;
    m.add_class::<processor_bindings::PyLiveAnalyzer>()?;

    // Add Estimator enum
    m.add_class::<analyzer_bindings::PyEstimator>()?;

    Ok(())
}
