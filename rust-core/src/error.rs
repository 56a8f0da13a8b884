//! Error types for the analyzer engine

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    /// Construction parameters rejected before any state was built
    #[error("Invalid analyzer configuration: {0}")]
    Config(String),

    /// Input block length does not match the configured block length
    #[error("Input block has {actual} samples, expected {expected}")]
    Shape { expected: usize, actual: usize },
}

impl AnalyzerError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        AnalyzerError::Config(msg.into())
    }
}
