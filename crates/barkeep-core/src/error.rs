//! Error types for the Barkeep core

use std::fmt;
use thiserror::Error;

/// Result type alias for core operations
pub type BarResult<T> = Result<T, BarError>;

/// A recoverable conversational failure. Each one is answered with a polite
/// re-prompt instead of an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hiccup {
    /// Nothing was recognized (silence or failed transcription)
    NoSpeechRecognized,
    /// The utterance held no candidate drink and was not a farewell
    NoOrderExtracted,
    /// "tea" was ordered without naming a variety we sell
    AmbiguousTea,
    /// The age answer held no number
    InvalidAgeAnswer,
}

impl fmt::Display for Hiccup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Hiccup::NoSpeechRecognized => "no speech recognized",
            Hiccup::NoOrderExtracted => "no order extracted",
            Hiccup::AmbiguousTea => "ambiguous tea",
            Hiccup::InvalidAgeAnswer => "invalid age answer",
        };
        f.write_str(s)
    }
}

/// Errors that end a turn or a session
#[derive(Error, Debug)]
pub enum BarError {
    #[error("Voice I/O error: {0}")]
    Voice(String),

    #[error("Gave up after {attempts} attempts: {hiccup}")]
    RetriesExhausted { hiccup: Hiccup, attempts: u32 },

    #[error("Invalid menu: {0}")]
    InvalidMenu(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
