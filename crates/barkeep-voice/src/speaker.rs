//! **Speaker**: TTS synthesis and blocking rodio playback.

use crate::error::{VoiceError, VoiceResult};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::time::Duration;
use tracing::info;

/// Turns text into encoded audio (WAV/MP3).
pub trait TtsBackend: Send + Sync {
    /// Empty bytes mean "nothing to play".
    fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>>;
}

/// Produces no audio. The spoken line still shows up in the logs.
#[derive(Debug, Default)]
pub struct PlaceholderTts;

impl TtsBackend for PlaceholderTts {
    fn synthesize(&self, _text: &str) -> VoiceResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// OpenAI-compatible `/audio/speech` API.
/// Env: `TTS_API_URL` (default https://api.openai.com/v1), `TTS_API_KEY`,
/// `TTS_MODEL` (default tts-1), `TTS_VOICE` (default alloy).
#[derive(Debug, Clone)]
pub struct HttpTts {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub voice: String,
    client: reqwest::blocking::Client,
}

impl HttpTts {
    pub fn from_env() -> VoiceResult<Self> {
        let base_url = std::env::var("TTS_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let api_key = std::env::var("TTS_API_KEY")
            .map_err(|_| VoiceError::Config("TTS requires TTS_API_KEY".to_string()))?;
        let model = std::env::var("TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string());
        let voice = std::env::var("TTS_VOICE").unwrap_or_else(|_| "alloy".to_string());
        Self::new(base_url, api_key, model, voice)
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        voice: impl Into<String>,
    ) -> VoiceResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| VoiceError::Tts(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            voice: voice.into(),
            client,
        })
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
        })
    }
}

impl TtsBackend for HttpTts {
    fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/audio/speech", self.base_url.trim_end_matches('/'));
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(text))
            .send()
            .map_err(|e| VoiceError::Tts(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(VoiceError::Tts(format!("TTS API error {}: {}", status, body)));
        }
        let bytes = res.bytes().map_err(|e| VoiceError::Tts(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// `HttpTts` when `TTS_API_KEY` is set, otherwise `PlaceholderTts`.
pub fn create_best_tts() -> Box<dyn TtsBackend> {
    match HttpTts::from_env() {
        Ok(tts) => {
            info!("🔈 TTS: {} voice via {}", tts.voice, tts.base_url);
            Box::new(tts)
        }
        Err(_) => {
            tracing::warn!("🔈 TTS: no backend configured, answers are logged only");
            Box::new(PlaceholderTts)
        }
    }
}

/// Default output device. Playback blocks until the queue is empty.
pub struct Speaker {
    _stream: OutputStream,
    _stream_handle: OutputStreamHandle,
    sink: Sink,
}

impl Speaker {
    pub fn new() -> VoiceResult<Self> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| VoiceError::Playback(e.to_string()))?;
        let sink =
            Sink::try_new(&stream_handle).map_err(|e| VoiceError::Playback(e.to_string()))?;
        info!("🔊 Speaker ready");
        Ok(Self {
            _stream: stream,
            _stream_handle: stream_handle,
            sink,
        })
    }

    /// Queue encoded audio (WAV/MP3).
    pub fn play_bytes(&self, bytes: &[u8]) -> VoiceResult<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let source = rodio::Decoder::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| VoiceError::Playback(format!("Decode failed: {}", e)))?;
        self.sink.append(source.convert_samples::<f32>());
        Ok(())
    }

    /// Synthesize `text`, play it and wait until playback ends.
    pub fn say(&self, text: &str, tts: &dyn TtsBackend) -> VoiceResult<()> {
        let bytes = tts.synthesize(text)?;
        self.play_bytes(&bytes)?;
        self.sink.sleep_until_end();
        Ok(())
    }
}
