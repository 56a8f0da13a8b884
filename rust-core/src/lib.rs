//! Bandscope - Real-Time Critical-Band Spectrum Analyzer
//!
//! Log-spaced resonator filter bank with perceptual bandwidths, adaptive
//! per-region thresholds and peak picking, plus live capture and Python bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod audio;
pub mod error;
pub mod filters;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use error::AnalyzerError;
pub use filters::BandWidthModel;
pub use spectrum::{AnalyzerConfig, EstimatorKind, SpectrumAnalyzer, ThresholdConfig, ThresholdShaping};
