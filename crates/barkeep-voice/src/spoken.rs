//! Speech-mode voice: microphone → STT for listening, TTS → speaker for answers.

use crate::error::VoiceResult;
use crate::microphone::{Microphone, MicrophoneConfig};
use crate::speaker::{create_best_tts, Speaker, TtsBackend};
use crate::stt::{create_best_stt, SttBackend};
use barkeep_core::{BarConfig, BarResult, VoiceIo};
use tracing::{debug, info, warn};

pub struct SpokenVoice {
    microphone: Microphone,
    stt: Box<dyn SttBackend>,
    speaker: Speaker,
    tts: Box<dyn TtsBackend>,
}

impl SpokenVoice {
    pub fn new(
        microphone: Microphone,
        stt: Box<dyn SttBackend>,
        speaker: Speaker,
        tts: Box<dyn TtsBackend>,
    ) -> Self {
        Self {
            microphone,
            stt,
            speaker,
            tts,
        }
    }

    /// Open the default devices and pick STT/TTS backends from the environment.
    pub fn from_config(config: &BarConfig) -> VoiceResult<Self> {
        let microphone = Microphone::open(MicrophoneConfig::from_settings(&config.voice))?;
        let speaker = Speaker::new()?;
        Ok(Self::new(
            microphone,
            create_best_stt(&config.language),
            speaker,
            create_best_tts(),
        ))
    }
}

impl VoiceIo for SpokenVoice {
    fn listen_once(&mut self) -> BarResult<Option<String>> {
        let Some(utterance) = self.microphone.listen_once()? else {
            debug!("no speech before the listen timeout");
            return Ok(None);
        };
        match self.stt.transcribe(&utterance) {
            Ok(text) if text.trim().is_empty() => Ok(None),
            Ok(text) => {
                info!(text = %text, "👂 guest said");
                Ok(Some(text))
            }
            Err(e) => {
                warn!("STT failed: {}", e);
                Ok(None)
            }
        }
    }

    fn speak(&mut self, text: &str) -> BarResult<()> {
        if let Err(e) = self.speaker.say(text, self.tts.as_ref()) {
            warn!("TTS/playback failed: {}", e);
        }
        Ok(())
    }
}
