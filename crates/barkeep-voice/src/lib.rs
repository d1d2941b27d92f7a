//! # Barkeep Voice - microphone and speaker for the bar assistant
//!
//! Implements `barkeep_core::VoiceIo` twice: `ConsoleVoice` for text mode and
//! `SpokenVoice` for real audio.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────── SpokenVoice ────────────────────────────┐
//! │  ┌────────────┐   ┌────────────┐   ┌──────────────┐   ┌──────────┐  │
//! │  │  Capture   │ → │ WebRTC VAD │ → │ Turn Manager │ → │   STT    │  │
//! │  │   (cpal)   │   │ (30ms)     │   │ (800ms gap)  │   │ (HTTP/   │  │
//! │  └────────────┘   └────────────┘   └──────────────┘   │ Whisper) │  │
//! │                                                        └──────────┘  │
//! │  ┌────────────┐   ┌────────────┐                                     │
//! │  │    TTS     │ → │  Speaker   │   (blocks until playback ends)      │
//! │  │   (HTTP)   │   │  (rodio)   │                                     │
//! │  └────────────┘   └────────────┘                                     │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

pub mod capture;
pub mod console;
pub mod error;
pub mod microphone;
pub mod speaker;
pub mod spoken;
pub mod stt;
pub mod turn;
pub mod vad;

pub use capture::{AudioCapture, AudioChunk, CaptureConfig};
pub use console::ConsoleVoice;
pub use error::{VoiceError, VoiceResult};
pub use microphone::{Microphone, MicrophoneConfig, Utterance};
pub use speaker::{create_best_tts, HttpTts, PlaceholderTts, Speaker, TtsBackend};
pub use spoken::SpokenVoice;
pub use stt::{create_best_stt, pcm_f32_to_wav, HttpStt, PlaceholderStt, SttBackend};
#[cfg(feature = "whisper")]
pub use stt::WhisperStt;
pub use turn::{TurnConfig, TurnEvent, TurnManager, TurnState};
pub use vad::{VadConfig, VadDetector};
