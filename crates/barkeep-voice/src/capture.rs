//! Microphone capture using CPAL
//!
//! Frames arrive on CPAL's callback thread and are forwarded as fixed-size
//! chunks over a tokio channel.

use crate::error::{VoiceError, VoiceResult};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Capture configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Sample rate in Hz (default: 16000)
    pub sample_rate: u32,

    /// Samples per chunk (default: 480 for 30ms at 16kHz)
    pub chunk_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            chunk_size: 480,
        }
    }
}

/// Audio chunk sent from the capture thread
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Mono samples, -1.0..1.0
    pub samples: Vec<f32>,

    pub captured_at: Instant,
}

/// Default input device, mono
pub struct AudioCapture {
    config: CaptureConfig,
    device: Device,
    stream_config: StreamConfig,
}

impl AudioCapture {
    pub fn new(config: CaptureConfig) -> VoiceResult<Self> {
        info!("🎤 Initializing audio capture ({}Hz, mono)", config.sample_rate);

        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| VoiceError::AudioDevice("No input device available".to_string()))?;

        info!(
            "📱 Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let stream_config = StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(config.chunk_size as u32),
        };

        Ok(Self {
            config,
            device,
            stream_config,
        })
    }

    /// Start capturing. Keep the returned stream alive for as long as chunks are wanted.
    pub fn start(self, chunk_tx: mpsc::UnboundedSender<AudioChunk>) -> VoiceResult<Stream> {
        let chunk_size = self.config.chunk_size;
        let mut pending = Vec::with_capacity(chunk_size);

        let stream = self.device.build_input_stream(
            &self.stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                for &sample in data {
                    pending.push(sample);
                    if pending.len() >= chunk_size {
                        let chunk = AudioChunk {
                            samples: std::mem::replace(&mut pending, Vec::with_capacity(chunk_size)),
                            captured_at: Instant::now(),
                        };
                        if let Err(e) = chunk_tx.send(chunk) {
                            warn!("Failed to send audio chunk: {}", e);
                        }
                    }
                }
            },
            move |err| {
                warn!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        info!("✅ Audio capture started");
        Ok(stream)
    }

    /// Names of the available input devices
    pub fn list_input_devices() -> VoiceResult<Vec<String>> {
        let devices = cpal::default_host().input_devices()?;
        Ok(devices.filter_map(|d| d.name().ok()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_config_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.chunk_size, 480);
    }
}
