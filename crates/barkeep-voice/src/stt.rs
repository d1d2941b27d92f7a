//! **Speech-to-Text (STT)**: convert an [`Utterance`] into text.
//!
//! `HttpStt` talks to any OpenAI-compatible `/audio/transcriptions` endpoint,
//! `WhisperStt` (feature `whisper`) runs locally, `PlaceholderStt` is for wiring
//! tests. `create_best_stt` picks from the environment.

use crate::error::{VoiceError, VoiceResult};
use crate::microphone::Utterance;
use std::time::Duration;
use tracing::info;

/// Backend for converting an utterance to text.
pub trait SttBackend: Send + Sync {
    /// Transcribe one utterance; empty string when nothing was recognized.
    fn transcribe(&self, utterance: &Utterance) -> VoiceResult<String>;
}

/// Encode mono f32 PCM as a 16-bit WAV file.
pub fn pcm_f32_to_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut buf = Vec::with_capacity(44 + data_len as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&1u16.to_le_bytes()); // mono
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * 2).to_le_bytes()); // byte rate
    buf.extend_from_slice(&2u16.to_le_bytes()); // block align
    buf.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    for &s in samples {
        let i = (s.clamp(-1.0, 1.0) * 32767.0).round() as i16;
        buf.extend_from_slice(&i.to_le_bytes());
    }
    buf
}

/// Returns a fixed text for every utterance.
#[derive(Debug, Default)]
pub struct PlaceholderStt {
    pub response: Option<String>,
}

impl PlaceholderStt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(s: impl Into<String>) -> Self {
        Self {
            response: Some(s.into()),
        }
    }
}

impl SttBackend for PlaceholderStt {
    fn transcribe(&self, _utterance: &Utterance) -> VoiceResult<String> {
        Ok(self.response.clone().unwrap_or_default())
    }
}

/// OpenAI-compatible transcription API.
/// Env: `STT_API_URL` (default https://api.openai.com/v1), `STT_API_KEY`, `STT_MODEL` (default whisper-1).
#[derive(Debug, Clone)]
pub struct HttpStt {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// ISO-639-1 hint sent as the `language` field
    pub language: String,
    client: reqwest::blocking::Client,
}

impl HttpStt {
    pub fn from_env(language: &str) -> VoiceResult<Self> {
        let base_url = std::env::var("STT_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let api_key = std::env::var("STT_API_KEY")
            .map_err(|_| VoiceError::Config("STT requires STT_API_KEY".to_string()))?;
        let model = std::env::var("STT_MODEL").unwrap_or_else(|_| "whisper-1".to_string());
        Self::new(base_url, api_key, model, language)
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        language: impl Into<String>,
    ) -> VoiceResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VoiceError::Stt(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            language: language.into(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url.trim_end_matches('/'))
    }
}

impl SttBackend for HttpStt {
    fn transcribe(&self, utterance: &Utterance) -> VoiceResult<String> {
        if utterance.samples.is_empty() {
            return Ok(String::new());
        }
        let wav = pcm_f32_to_wav(&utterance.samples, utterance.sample_rate);
        let part = reqwest::blocking::multipart::Part::bytes(wav)
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| VoiceError::Stt(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .map_err(|e| VoiceError::Stt(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(VoiceError::Stt(format!("STT API error {}: {}", status, body)));
        }
        let json: serde_json::Value = res.json().map_err(|e| VoiceError::Stt(e.to_string()))?;
        Ok(transcript_text(&json))
    }
}

fn transcript_text(json: &serde_json::Value) -> String {
    json.get("text")
        .and_then(|t| t.as_str())
        .unwrap_or("")
        .trim()
        .to_string()
}

// -----------------------------------------------------------------------------
// Local Whisper STT (optional feature). Requires whisper.cpp/ggml.
// -----------------------------------------------------------------------------
#[cfg(feature = "whisper")]
mod whisper_stt {
    use super::*;
    use std::sync::Mutex;
    use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

    /// Local Whisper on a ggml model (e.g. ggml-base.en.bin). Expects 16 kHz mono.
    pub struct WhisperStt {
        #[allow(dead_code)]
        context: WhisperContext,
        state: Mutex<whisper_rs::WhisperState>,
        language: String,
    }

    impl WhisperStt {
        pub fn new(model_path: &str, language: &str) -> VoiceResult<Self> {
            let context =
                WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
                    .map_err(|e| VoiceError::Stt(format!("Whisper load failed: {}", e)))?;
            let state = context
                .create_state()
                .map_err(|e| VoiceError::Stt(format!("Whisper state init failed: {}", e)))?;
            Ok(Self {
                context,
                state: Mutex::new(state),
                language: language.to_string(),
            })
        }

        /// `WHISPER_MODEL_PATH` must point to a .bin model file.
        pub fn from_env(language: &str) -> VoiceResult<Self> {
            let path = std::env::var("WHISPER_MODEL_PATH")
                .map_err(|_| VoiceError::Config("WHISPER_MODEL_PATH not set".to_string()))?;
            let path = path.trim();
            if path.is_empty() {
                return Err(VoiceError::Config("WHISPER_MODEL_PATH is empty".to_string()));
            }
            Self::new(path, language)
        }
    }

    impl SttBackend for WhisperStt {
        fn transcribe(&self, utterance: &Utterance) -> VoiceResult<String> {
            if utterance.samples.is_empty() {
                return Ok(String::new());
            }
            if utterance.sample_rate != 16000 {
                return Err(VoiceError::Stt(format!(
                    "Whisper expects 16 kHz; got {} Hz",
                    utterance.sample_rate
                )));
            }
            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_print_progress(false);
            params.set_print_realtime(false);
            params.set_no_timestamps(true);
            params.set_language(Some(self.language.as_str()));

            let mut state = self
                .state
                .lock()
                .map_err(|e| VoiceError::Stt(format!("Whisper lock poisoned: {}", e)))?;
            state
                .full(params, &utterance.samples)
                .map_err(|e| VoiceError::Stt(format!("Whisper inference failed: {}", e)))?;
            let text = state
                .as_iter()
                .filter_map(|seg| seg.to_str().ok().map(str::to_string))
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            Ok(text)
        }
    }
}

#[cfg(feature = "whisper")]
pub use whisper_stt::WhisperStt;

/// Best available backend: local Whisper (feature `whisper` and `WHISPER_MODEL_PATH`),
/// then `HttpStt` (`STT_API_KEY`), then `PlaceholderStt`.
pub fn create_best_stt(language: &str) -> Box<dyn SttBackend> {
    #[cfg(feature = "whisper")]
    {
        match whisper_stt::WhisperStt::from_env(language) {
            Ok(w) => {
                info!("🗣️ STT: local Whisper ({})", language);
                return Box::new(w);
            }
            Err(e) => tracing::debug!("Whisper unavailable: {}", e),
        }
    }
    if let Ok(http) = HttpStt::from_env(language) {
        info!("🗣️ STT: {} ({})", http.endpoint(), http.model);
        return Box::new(http);
    }
    tracing::warn!("🗣️ STT: no backend configured, every utterance will be empty");
    Box::new(PlaceholderStt::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn utterance(samples: Vec<f32>) -> Utterance {
        Utterance {
            samples,
            timestamp: Utc::now(),
            started_at: Utc::now(),
            duration: Duration::from_millis(300),
            sample_rate: 16000,
        }
    }

    #[test]
    fn placeholder_returns_configured_text() {
        let stt = PlaceholderStt::with_response("a cola please");
        assert_eq!(stt.transcribe(&utterance(vec![0.0; 480])).unwrap(), "a cola please");
        assert_eq!(PlaceholderStt::new().transcribe(&utterance(vec![])).unwrap(), "");
    }

    #[test]
    fn wav_header_is_well_formed() {
        let wav = pcm_f32_to_wav(&[0.0, 1.0, -1.0], 16000);
        assert_eq!(wav.len(), 44 + 6);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]), 36 + 6);
        assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 16000);
        assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), 32767);
        assert_eq!(i16::from_le_bytes([wav[48], wav[49]]), -32767);
    }

    #[test]
    fn http_stt_skips_empty_utterances() {
        let stt = HttpStt::new("http://127.0.0.1:9", "key", "whisper-1", "en").unwrap();
        assert_eq!(stt.endpoint(), "http://127.0.0.1:9/audio/transcriptions");
        assert_eq!(stt.transcribe(&utterance(vec![])).unwrap(), "");
    }

    #[test]
    fn transcript_is_trimmed() {
        let json = serde_json::json!({ "text": "  two vodkas \n" });
        assert_eq!(transcript_text(&json), "two vodkas");
        assert_eq!(transcript_text(&serde_json::json!({})), "");
    }
}
