//! Live audio: capture with cpal, ring-buffer transport, threaded analysis

pub mod buffer;
#[cfg(feature = "capture")]
pub mod input;
pub mod processor;

pub use buffer::{AudioConsumer, AudioProducer, AudioRingBuffer, BlockAssembler};
#[cfg(feature = "capture")]
pub use input::{list_input_devices, AudioDeviceInfo, AudioError, AudioInput};
pub use processor::{AnalysisFrame, LiveAnalyzer, ProcessorError};
