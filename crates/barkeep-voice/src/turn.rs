//! Gap-based turn detection: an utterance ends after a configurable
//! stretch of silence (800ms by default) following speech.

use crate::error::{VoiceError, VoiceResult};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Events emitted by the turn manager
#[derive(Debug, Clone)]
pub enum TurnEvent {
    SpeechStarted {
        timestamp: DateTime<Utc>,
    },

    /// A complete utterance, ready for recognition
    TurnCommitted {
        timestamp: DateTime<Utc>,
        /// Wall-clock time the first speech frame arrived
        started_at: DateTime<Utc>,
        duration: Duration,
        samples: Vec<f32>,
    },
}

#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Silence after speech that commits the turn
    pub silence_threshold: Duration,

    /// Shorter bursts are dropped as noise
    pub min_speech_duration: Duration,

    /// Commit anyway after this long
    pub max_turn_duration: Duration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            silence_threshold: Duration::from_millis(800),
            min_speech_duration: Duration::from_millis(200),
            max_turn_duration: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Speaking,
    SilenceDetected,
}

/// Folds per-frame VAD decisions into committed turns
pub struct TurnManager {
    config: TurnConfig,
    state: TurnState,
    speech_start: Option<Instant>,
    started_at: Option<DateTime<Utc>>,
    last_speech: Option<Instant>,
    buffer: Vec<f32>,
    event_tx: mpsc::UnboundedSender<TurnEvent>,
}

impl TurnManager {
    pub fn new(config: TurnConfig) -> (Self, mpsc::UnboundedReceiver<TurnEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let manager = Self {
            config,
            state: TurnState::Idle,
            speech_start: None,
            started_at: None,
            last_speech: None,
            buffer: Vec::new(),
            event_tx,
        };
        (manager, event_rx)
    }

    /// Feed one frame and its VAD decision.
    pub fn process_vad_result(&mut self, is_speech: bool, frame: &[f32]) -> VoiceResult<()> {
        let now = Instant::now();

        match (self.state, is_speech) {
            (TurnState::Idle, true) => {
                debug!("🎤 Speech started");
                self.state = TurnState::Speaking;
                let started_at = Utc::now();
                self.speech_start = Some(now);
                self.started_at = Some(started_at);
                self.last_speech = Some(now);
                self.buffer.clear();
                self.buffer.extend_from_slice(frame);
                self.emit(TurnEvent::SpeechStarted {
                    timestamp: started_at,
                })?;
            }

            (TurnState::Speaking, true) | (TurnState::SilenceDetected, true) => {
                self.state = TurnState::Speaking;
                self.last_speech = Some(now);
                self.buffer.extend_from_slice(frame);
                if let Some(start) = self.speech_start {
                    if now.duration_since(start) >= self.config.max_turn_duration {
                        warn!("⏱️ Max turn duration reached, auto-committing");
                        return self.commit_turn();
                    }
                }
            }

            (TurnState::Speaking, false) => {
                self.state = TurnState::SilenceDetected;
                // Trailing silence stays in the buffer.
                self.buffer.extend_from_slice(frame);
            }

            (TurnState::SilenceDetected, false) => {
                self.buffer.extend_from_slice(frame);
                let waited = self
                    .last_speech
                    .map(|t| now.duration_since(t))
                    .unwrap_or_default();
                if waited >= self.config.silence_threshold {
                    return self.commit_turn();
                }
            }

            (TurnState::Idle, false) => {}
        }

        Ok(())
    }

    fn commit_turn(&mut self) -> VoiceResult<()> {
        let duration = match (self.speech_start, self.last_speech) {
            (Some(start), Some(last)) => last.duration_since(start),
            _ => Duration::ZERO,
        };

        if duration < self.config.min_speech_duration {
            debug!("⏭️ Speech too short ({:?}), ignoring", duration);
            self.reset();
            return Ok(());
        }

        info!("🎯 Turn committed: {:?} of speech, {} samples", duration, self.buffer.len());
        let samples = std::mem::take(&mut self.buffer);
        let timestamp = Utc::now();
        let started_at = self.started_at.unwrap_or(timestamp);
        self.reset();
        self.emit(TurnEvent::TurnCommitted {
            timestamp,
            started_at,
            duration,
            samples,
        })
    }

    fn reset(&mut self) {
        self.state = TurnState::Idle;
        self.speech_start = None;
        self.started_at = None;
        self.last_speech = None;
        self.buffer.clear();
    }

    fn emit(&self, event: TurnEvent) -> VoiceResult<()> {
        self.event_tx
            .send(event)
            .map_err(|e| VoiceError::ChannelClosed(e.to_string()))
    }

    pub fn state(&self) -> TurnState {
        self.state
    }
}
