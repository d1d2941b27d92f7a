//! **Microphone**: local capture, VAD and gap detection, one utterance at a time.
//!
//! CPAL delivers 30ms frames on its callback thread; a worker thread runs the
//! VAD and the [`TurnManager`] and forwards committed turns. `listen_once`
//! waits for the next one or gives up after the listen timeout.

use crate::capture::{AudioCapture, AudioChunk, CaptureConfig};
use crate::error::{VoiceError, VoiceResult};
use crate::turn::{TurnConfig, TurnEvent, TurnManager};
use crate::vad::{VadConfig, VadDetector};
use barkeep_core::VoiceSettings;
use chrono::{DateTime, Utc};
use cpal::Stream;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// One spoken utterance: PCM from speech start until the gap.
#[derive(Debug, Clone)]
pub struct Utterance {
    /// Mono samples, -1.0..1.0
    pub samples: Vec<f32>,
    /// When the turn was committed
    pub timestamp: DateTime<Utc>,
    /// When the first speech frame arrived
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub sample_rate: u32,
}

impl Utterance {
    /// True when speech had already begun at `instant`, e.g. our own TTS line
    /// picked up while it was playing.
    pub fn began_before(&self, instant: DateTime<Utc>) -> bool {
        self.started_at < instant
    }
}

#[derive(Debug, Clone)]
pub struct MicrophoneConfig {
    /// 8000/16000/32000/48000 (WebRTC VAD rates)
    pub sample_rate: u32,
    /// VAD aggressiveness 0-3
    pub vad_mode: u8,
    pub gap: Duration,
    pub min_speech: Duration,
    /// `listen_once` reports silence after this long
    pub listen_timeout: Duration,
}

impl Default for MicrophoneConfig {
    fn default() -> Self {
        Self::from_settings(&VoiceSettings::default())
    }
}

impl MicrophoneConfig {
    pub fn from_settings(settings: &VoiceSettings) -> Self {
        Self {
            sample_rate: 16000,
            vad_mode: 2,
            gap: Duration::from_millis(settings.gap_ms),
            min_speech: Duration::from_millis(settings.min_speech_ms),
            listen_timeout: Duration::from_secs(settings.listen_timeout_secs),
        }
    }
}

/// Open microphone. Drop to stop capturing.
pub struct Microphone {
    _stream: Stream,
    utterance_rx: mpsc::Receiver<Utterance>,
    listen_timeout: Duration,
}

impl Microphone {
    pub fn open(config: MicrophoneConfig) -> VoiceResult<Self> {
        let vad_config = VadConfig {
            sample_rate: config.sample_rate,
            mode: config.vad_mode,
        };
        // Fail early on a bad rate or mode; the worker builds its own detector.
        let chunk_size = VadDetector::new(vad_config.clone())?.chunk_size();

        let capture = AudioCapture::new(CaptureConfig {
            sample_rate: config.sample_rate,
            chunk_size,
        })?;
        let (audio_tx, audio_rx) = mpsc::unbounded_channel::<AudioChunk>();
        let stream = capture.start(audio_tx)?;

        let turn_config = TurnConfig {
            silence_threshold: config.gap,
            min_speech_duration: config.min_speech,
            ..TurnConfig::default()
        };
        let (utterance_tx, utterance_rx) = mpsc::channel(8);
        let sample_rate = config.sample_rate;

        // VadDetector is !Send, so it is created on the worker thread.
        thread::Builder::new()
            .name("barkeep-vad".to_string())
            .spawn(move || {
                let vad = match VadDetector::new(vad_config) {
                    Ok(v) => v,
                    Err(e) => {
                        error!("Microphone: VAD init failed: {}", e);
                        return;
                    }
                };
                run_detection(vad, turn_config, sample_rate, audio_rx, utterance_tx);
            })?;

        info!(
            "👂 Microphone listening ({}ms gap, {}s timeout)",
            config.gap.as_millis(),
            config.listen_timeout.as_secs()
        );
        Ok(Self {
            _stream: stream,
            utterance_rx,
            listen_timeout: config.listen_timeout,
        })
    }

    /// Wait for the next utterance. `None` when nobody spoke before the timeout.
    ///
    /// Utterances whose speech began before the call are discarded. That
    /// covers our own TTS line, which only commits once the gap has passed.
    pub fn listen_once(&mut self) -> VoiceResult<Option<Utterance>> {
        let listening_since = Utc::now();
        let deadline = Instant::now() + self.listen_timeout;
        loop {
            match self.utterance_rx.try_recv() {
                Ok(utterance) if utterance.began_before(listening_since) => {
                    debug!(
                        started_at = %utterance.started_at,
                        "discarded utterance captured while speaking"
                    );
                }
                Ok(utterance) => return Ok(Some(utterance)),
                Err(mpsc::error::TryRecvError::Empty) => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    return Err(VoiceError::ChannelClosed(
                        "microphone worker stopped".to_string(),
                    ))
                }
            }
        }
    }
}

fn run_detection(
    mut vad: VadDetector,
    turn_config: TurnConfig,
    sample_rate: u32,
    mut audio_rx: mpsc::UnboundedReceiver<AudioChunk>,
    utterance_tx: mpsc::Sender<Utterance>,
) {
    let (mut turns, mut events) = TurnManager::new(turn_config);

    while let Some(chunk) = audio_rx.blocking_recv() {
        if chunk.samples.len() != vad.chunk_size() {
            continue;
        }
        let is_speech = match vad.is_speech(&chunk.samples) {
            Ok(s) => s,
            Err(e) => {
                debug!("Microphone: VAD skipped a frame: {}", e);
                continue;
            }
        };
        if let Err(e) = turns.process_vad_result(is_speech, &chunk.samples) {
            warn!("Microphone: turn manager error: {}", e);
            return;
        }

        while let Ok(event) = events.try_recv() {
            if let TurnEvent::TurnCommitted {
                timestamp,
                started_at,
                duration,
                samples,
            } = event
            {
                let utterance = Utterance {
                    samples,
                    timestamp,
                    started_at,
                    duration,
                    sample_rate,
                };
                if utterance_tx.blocking_send(utterance).is_err() {
                    debug!("Microphone closed; stopping detection");
                    return;
                }
                if let Err(e) = vad.reset() {
                    warn!("Microphone: VAD reset failed: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_follows_voice_settings() {
        let settings = VoiceSettings {
            gap_ms: 500,
            min_speech_ms: 100,
            listen_timeout_secs: 3,
            ..VoiceSettings::default()
        };
        let c = MicrophoneConfig::from_settings(&settings);
        assert_eq!(c.sample_rate, 16000);
        assert_eq!(c.gap, Duration::from_millis(500));
        assert_eq!(c.min_speech, Duration::from_millis(100));
        assert_eq!(c.listen_timeout, Duration::from_secs(3));
    }

    fn utterance_started(started_at: DateTime<Utc>) -> Utterance {
        Utterance {
            samples: vec![0.0; 480],
            timestamp: started_at + chrono::Duration::milliseconds(1800),
            started_at,
            duration: Duration::from_secs(1),
            sample_rate: 16000,
        }
    }

    #[test]
    fn echo_committed_after_listening_starts_is_still_stale() {
        // The TTS line began before listening and commits only after the gap.
        let listening_since = Utc::now();
        let echo = utterance_started(listening_since - chrono::Duration::seconds(3));
        assert!(echo.timestamp > listening_since);
        assert!(echo.began_before(listening_since));

        let guest = utterance_started(listening_since + chrono::Duration::milliseconds(250));
        assert!(!guest.began_before(listening_since));
    }

    #[test]
    fn default_gap_is_800ms() {
        assert_eq!(MicrophoneConfig::default().gap, Duration::from_millis(800));
    }
}
