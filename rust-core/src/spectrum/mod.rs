//! Filter-bank spectrum analysis with adaptive thresholding

pub mod analysis;
pub mod bank;
pub mod peaks;
pub mod threshold;

pub use analysis::{AnalyzerConfig, SpectrumAnalyzer};
pub use bank::{EstimatorKind, FilterBank};
pub use peaks::{extract_peaks, peak_indices};
pub use threshold::{ThresholdConfig, ThresholdEngine, ThresholdShaping};
