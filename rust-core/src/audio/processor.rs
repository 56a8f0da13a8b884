//! Live analyzer - keeps the analysis loop in Rust
//!
//! A worker thread drains the ring buffer, cuts exact blocks and runs the
//! engine on each one. Callers only ever read the newest finished frame.

use crate::audio::buffer::{AudioConsumer, BlockAssembler};
use crate::error::AnalyzerError;
use crate::spectrum::{AnalyzerConfig, SpectrumAnalyzer};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "capture")]
use crate::audio::buffer::AudioRingBuffer;
#[cfg(feature = "capture")]
use crate::audio::input::{AudioError, AudioInput};

/// Samples drained from the ring buffer per worker iteration
const READ_CHUNK: usize = 2048;

/// Worker back-off when the ring buffer is empty
const IDLE_SLEEP: Duration = Duration::from_micros(100);

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    #[cfg(feature = "capture")]
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("Live analyzer is already running")]
    AlreadyRunning,
}

/// Snapshot of the engine outputs after one block
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisFrame {
    /// Amplitude per band (dB)
    pub amplitude: Vec<f64>,

    /// Threshold per band (dB)
    pub threshold: Vec<f64>,

    /// Peak per band (dB), floor where there is no peak
    pub peak: Vec<f64>,

    /// Zero-based index of the block since the analyzer started
    pub block_index: u64,
}

impl AnalysisFrame {
    fn with_bands(band_count: usize, floor_db: f64) -> Self {
        Self {
            amplitude: vec![floor_db; band_count],
            threshold: vec![floor_db; band_count],
            peak: vec![floor_db; band_count],
            block_index: 0,
        }
    }

    fn capture(&mut self, analyzer: &SpectrumAnalyzer, block_index: u64) {
        self.amplitude.copy_from_slice(analyzer.amplitude());
        self.threshold.copy_from_slice(analyzer.threshold());
        self.peak.copy_from_slice(analyzer.peak());
        self.block_index = block_index;
    }
}

/// Threaded driver around a `SpectrumAnalyzer`
///
/// The engine lives entirely on the worker thread; this handle only holds
/// the configuration, the control flag and the latest published frame.
pub struct LiveAnalyzer {
    config: AnalyzerConfig,

    /// Latest finished frame
    frame: Arc<Mutex<Option<AnalysisFrame>>>,

    /// Samples lost to a full ring buffer
    dropped: Arc<AtomicU64>,

    /// Running flag
    running: Arc<AtomicBool>,

    /// Worker thread handle
    worker: Option<JoinHandle<()>>,

    #[cfg(feature = "capture")]
    audio_input: Option<AudioInput>,
}

impl LiveAnalyzer {
    /// Create a stopped live analyzer
    pub fn new(config: AnalyzerConfig) -> Result<Self, ProcessorError> {
        config.validate()?;

        Ok(Self {
            config,
            frame: Arc::new(Mutex::new(None)),
            dropped: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
            #[cfg(feature = "capture")]
            audio_input: None,
        })
    }

    /// Start analysing samples arriving through `consumer`
    pub fn start_with_consumer(&mut self, consumer: AudioConsumer) -> Result<(), ProcessorError> {
        if self.is_running() {
            return Err(ProcessorError::AlreadyRunning);
        }

        let analyzer = SpectrumAnalyzer::new(self.config.clone())?;

        self.dropped = consumer.dropped_counter();
        if let Ok(mut guard) = self.frame.lock() {
            *guard = None;
        }
        self.running.store(true, Ordering::SeqCst);

        let frame = Arc::clone(&self.frame);
        let running = Arc::clone(&self.running);

        let handle = std::thread::spawn(move || {
            run_worker(analyzer, consumer, frame, running);
        });
        self.worker = Some(handle);

        log::info!(
            "live analyzer started: {} Hz, {} bands, {:?}",
            self.config.sample_rate,
            self.config.band_count,
            self.config.estimator
        );

        Ok(())
    }

    /// Capture the default input device and analyse it
    ///
    /// The device's native rate replaces the configured one.
    ///
    /// # Returns
    /// Name of the opened device
    #[cfg(feature = "capture")]
    pub fn start_capture(&mut self) -> Result<String, ProcessorError> {
        if self.is_running() {
            return Err(ProcessorError::AlreadyRunning);
        }

        // Two seconds of headroom at the configured rate
        let rb = AudioRingBuffer::new((self.config.sample_rate as usize * 2).max(READ_CHUNK));
        let (producer, consumer) = rb.split();

        let input = AudioInput::from_default_device(producer)?;
        let device_rate = input.device_info().sample_rate;
        let device_name = input.device_info().name.clone();

        if device_rate != self.config.sample_rate {
            log::info!(
                "device '{}' runs at {} Hz, overriding configured {} Hz",
                device_name,
                device_rate,
                self.config.sample_rate
            );
            let retargeted = self.config.with_sample_rate(device_rate);
            retargeted.validate()?;
            self.config = retargeted;
        }

        self.start_with_consumer(consumer)?;

        if let Err(e) = input.start() {
            self.stop();
            return Err(e.into());
        }
        self.audio_input = Some(input);

        Ok(device_name)
    }

    /// Stop the worker (and capture, if any)
    pub fn stop(&mut self) {
        #[cfg(feature = "capture")]
        {
            if let Some(input) = self.audio_input.take() {
                if let Err(e) = input.pause() {
                    log::warn!("failed to pause capture: {}", e);
                }
            }
        }

        let was_running = self.running.swap(false, Ordering::SeqCst);

        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::warn!("live analyzer worker panicked");
            }
        }

        if was_running {
            log::info!("live analyzer stopped");
        }
    }

    /// Check if the worker is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Take the newest frame, if one was published since the last call
    pub fn latest_frame(&self) -> Option<AnalysisFrame> {
        if let Ok(mut guard) = self.frame.lock() {
            guard.take()
        } else {
            None
        }
    }

    /// Samples lost because the ring buffer was full
    pub fn dropped_samples(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Effective configuration (sample rate may follow the capture device)
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}

impl Drop for LiveAnalyzer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(
    mut analyzer: SpectrumAnalyzer,
    mut consumer: AudioConsumer,
    frame: Arc<Mutex<Option<AnalysisFrame>>>,
    running: Arc<AtomicBool>,
) {
    let config = analyzer.config().clone();
    let mut assembler = BlockAssembler::new(config.block_length);
    let mut read_buffer = vec![0.0; READ_CHUNK];

    // Reused every block; only the clone handed to readers allocates
    let mut frame_buffer = AnalysisFrame::with_bands(config.band_count, config.floor_db);
    let mut block_index: u64 = 0;
    let mut reported_dropped = 0;

    while running.load(Ordering::SeqCst) {
        let n = consumer.read(&mut read_buffer);

        if n == 0 {
            std::thread::sleep(IDLE_SLEEP);
            continue;
        }

        assembler.push(&read_buffer[..n], |block| match analyzer.process_block(block) {
            Ok(()) => {
                frame_buffer.capture(&analyzer, block_index);
                block_index += 1;

                if let Ok(mut guard) = frame.lock() {
                    *guard = Some(frame_buffer.clone());
                }
            }
            Err(e) => log::error!("block {} rejected: {}", block_index, e),
        });

        let dropped = consumer.dropped();
        if dropped > reported_dropped {
            log::warn!("ring buffer overflow: {} samples dropped so far", dropped);
            reported_dropped = dropped;
        }
    }

    log::debug!("worker exiting with {} samples in a partial block", assembler.pending());
}
