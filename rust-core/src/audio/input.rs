//! Audio input capture using cpal
//!
//! Captures the default (or a chosen) input device, folds every frame down to
//! one channel and feeds the ring buffer.

use super::buffer::AudioProducer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio input device found")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to get default config: {0}")]
    DefaultConfig(String),

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),
}

/// Audio input device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Mono capture stream
pub struct AudioInput {
    stream: Stream,
    device_info: AudioDeviceInfo,
}

impl AudioInput {
    /// Open the default input device
    ///
    /// # Arguments
    /// * `producer` - Ring buffer end that receives mono samples
    pub fn from_default_device(producer: AudioProducer) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(AudioError::NoDevice)?;

        Self::from_device(device, producer)
    }

    /// Open a specific input device at its native rate
    pub fn from_device(device: Device, mut producer: AudioProducer) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::DefaultConfig(e.to_string()))?;

        let device_info = AudioDeviceInfo {
            name,
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
        };

        let stream_config: StreamConfig = config.into();
        let channels = usize::from(device_info.channels.max(1));

        // Sized for a typical callback; only grows if the host delivers more
        let mut mono: Vec<f64> = Vec::with_capacity(4096);

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    mono.clear();
                    if channels == 1 {
                        mono.extend(data.iter().map(|&s| s as f64));
                    } else {
                        let scale = 1.0 / channels as f64;
                        mono.extend(
                            data.chunks_exact(channels)
                                .map(|frame| frame.iter().map(|&s| s as f64).sum::<f64>() * scale),
                        );
                    }
                    producer.write(&mono);
                },
                move |err| {
                    log::error!("audio input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        log::info!(
            "opened input '{}' at {} Hz, {} channel(s)",
            device_info.name,
            device_info.sample_rate,
            device_info.channels
        );

        Ok(Self { stream, device_info })
    }

    /// Start capturing audio
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause audio capture
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

/// List available audio input devices
pub fn list_input_devices() -> Result<Vec<AudioDeviceInfo>, AudioError> {
    let host = cpal::default_host();

    let devices = host
        .input_devices()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?
        .filter_map(|device| {
            let name = device.name().ok()?;
            let config = device.default_input_config().ok()?;
            Some(AudioDeviceInfo {
                name,
                sample_rate: config.sample_rate().0,
                channels: config.channels(),
            })
        })
        .collect();

    Ok(devices)
}
