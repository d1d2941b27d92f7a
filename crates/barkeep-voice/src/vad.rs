//! Voice Activity Detection using WebRTC VAD

use crate::error::{VoiceError, VoiceResult};
use tracing::{debug, info};
use webrtc_vad::{SampleRate, Vad, VadMode};

#[derive(Debug, Clone)]
pub struct VadConfig {
    /// Must be 8000, 16000, 32000 or 48000 Hz
    pub sample_rate: u32,

    /// Aggressiveness 0-3; 3 rejects the most non-speech
    pub mode: u8,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            mode: 2,
        }
    }
}

fn build_vad(config: &VadConfig) -> VoiceResult<Vad> {
    let sample_rate = match config.sample_rate {
        8000 => SampleRate::Rate8kHz,
        16000 => SampleRate::Rate16kHz,
        32000 => SampleRate::Rate32kHz,
        48000 => SampleRate::Rate48kHz,
        other => {
            return Err(VoiceError::Config(format!(
                "WebRTC VAD only supports 8000, 16000, 32000, or 48000 Hz, got {}",
                other
            )))
        }
    };
    let mode = match config.mode {
        0 => VadMode::Quality,
        1 => VadMode::LowBitrate,
        2 => VadMode::Aggressive,
        3 => VadMode::VeryAggressive,
        other => return Err(VoiceError::Config(format!("VAD mode must be 0-3, got {}", other))),
    };
    let mut vad = Vad::new();
    vad.set_mode(mode);
    vad.set_sample_rate(sample_rate);
    Ok(vad)
}

/// Classifies 30ms frames as speech or silence
pub struct VadDetector {
    vad: Vad,
    config: VadConfig,
    chunk_size: usize,
}

impl VadDetector {
    pub fn new(config: VadConfig) -> VoiceResult<Self> {
        let vad = build_vad(&config)?;
        // WebRTC VAD accepts 10, 20 or 30ms frames; we use 30ms.
        let chunk_size = (config.sample_rate as usize * 30) / 1000;
        info!(
            "🎙️ VAD ready ({}Hz, mode {}, {} samples per frame)",
            config.sample_rate, config.mode, chunk_size
        );
        Ok(Self {
            vad,
            config,
            chunk_size,
        })
    }

    /// True when the frame holds speech. The frame must be exactly `chunk_size` samples.
    pub fn is_speech(&mut self, audio: &[f32]) -> VoiceResult<bool> {
        if audio.len() != self.chunk_size {
            return Err(VoiceError::Vad(format!(
                "Expected {} samples, got {}",
                self.chunk_size,
                audio.len()
            )));
        }

        let pcm: Vec<i16> = audio
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect();

        let speech = self
            .vad
            .is_voice_segment(&pcm)
            .map_err(|_| VoiceError::Vad("invalid frame length".to_string()))?;

        debug!("VAD result: {}", if speech { "SPEECH" } else { "SILENCE" });
        Ok(speech)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Drop detector state between utterances.
    pub fn reset(&mut self) -> VoiceResult<()> {
        self.vad = build_vad(&self.config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_is_thirty_ms() {
        let detector = VadDetector::new(VadConfig::default()).unwrap();
        assert_eq!(detector.chunk_size(), 480);
        assert_eq!(detector.sample_rate(), 16000);
    }

    #[test]
    fn rejects_unsupported_sample_rate() {
        let config = VadConfig {
            sample_rate: 44100,
            ..Default::default()
        };
        assert!(VadDetector::new(config).is_err());
    }

    #[test]
    fn rejects_bad_mode() {
        let config = VadConfig {
            mode: 7,
            ..Default::default()
        };
        assert!(VadDetector::new(config).is_err());
    }

    #[test]
    fn wrong_frame_size_is_an_error() {
        let mut detector = VadDetector::new(VadConfig::default()).unwrap();
        assert!(detector.is_speech(&[0.0f32; 100]).is_err());
    }

    #[test]
    fn silence_is_not_speech() {
        let mut detector = VadDetector::new(VadConfig::default()).unwrap();
        assert!(!detector.is_speech(&[0.0f32; 480]).unwrap());
        detector.reset().unwrap();
        assert!(!detector.is_speech(&[0.0f32; 480]).unwrap());
    }
}
