//! The conversation loop: AwaitOrder → Processing → AwaitAnotherOrder | Terminated.
//!
//! One utterance is resolved completely (including the tea and age
//! sub-dialogues) before the next one is requested. Nothing carries over
//! between turns except the counters in [`SessionSummary`].

use tracing::{info, warn};

use crate::config::{BarConfig, DialogueConfig, Phrases};
use crate::error::{BarError, BarResult, Hiccup};
use crate::language::{CandidatePhrase, LanguageUnderstanding, ParseObserver, ParsedUtterance};
use crate::menu::Menu;
use crate::resolver::{classify_order, Dialogue, OrderIntent, OrderResolver, TurnResolution};
use crate::response;

/// Voice boundary: blocking listen and speak.
pub trait VoiceIo {
    /// Wait for one utterance. `None` on silence or failed recognition.
    fn listen_once(&mut self) -> BarResult<Option<String>>;

    /// Say `text`; returns when playback is done.
    fn speak(&mut self, text: &str) -> BarResult<()>;
}

/// A usable answer to "what would you like?". Empty orders never get this far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuestRequest {
    Rejection,
    Order(Vec<CandidatePhrase>),
}

/// State of the conversation loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationState {
    AwaitOrder,
    Processing(GuestRequest),
    AwaitAnotherOrder,
    Terminated,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The guest said no / thanks.
    Farewell,
    /// No usable order after the configured number of attempts.
    GaveUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns_served: u32,
    pub turns_abandoned: u32,
    pub ended: SessionEnd,
}

fn speak_line(voice: &mut dyn VoiceIo, line: &str) -> BarResult<()> {
    info!(line, "bartender says");
    voice.speak(line)
}

/// Parse an utterance and hand it to the observer, if any.
fn parse_with(
    language: &dyn LanguageUnderstanding,
    observer: Option<&dyn ParseObserver>,
    text: &str,
) -> ParsedUtterance {
    let parsed = language.parse(text);
    if let Some(obs) = observer {
        obs.on_parse(&parsed);
    }
    parsed
}

fn non_empty(heard: Option<String>) -> Option<String> {
    heard.filter(|t| !t.trim().is_empty())
}

/// [`Dialogue`] over the voice and language adapters.
pub struct VoiceDialogue<'v> {
    voice: &'v mut dyn VoiceIo,
    language: &'v dyn LanguageUnderstanding,
    observer: Option<&'v dyn ParseObserver>,
    phrases: &'v Phrases,
    limits: DialogueConfig,
}

impl<'v> VoiceDialogue<'v> {
    pub fn new(
        voice: &'v mut dyn VoiceIo,
        language: &'v dyn LanguageUnderstanding,
        observer: Option<&'v dyn ParseObserver>,
        config: &'v BarConfig,
    ) -> Self {
        Self {
            voice,
            language,
            observer,
            phrases: &config.phrases,
            limits: config.dialogue,
        }
    }

    fn give_up(&self, hiccup: Hiccup, attempts: u32) -> BarResult<()> {
        if self.limits.exhausted(attempts) {
            return Err(BarError::RetriesExhausted { hiccup, attempts });
        }
        Ok(())
    }
}

impl Dialogue for VoiceDialogue<'_> {
    fn ask_candidates(&mut self, question: &str) -> BarResult<Vec<CandidatePhrase>> {
        speak_line(self.voice, question)?;
        let mut attempts = 0u32;
        loop {
            match non_empty(self.voice.listen_once()?) {
                Some(text) => {
                    let parsed = parse_with(self.language, self.observer, &text);
                    return Ok(parsed.candidate_phrases());
                }
                None => {
                    attempts += 1;
                    self.give_up(Hiccup::NoSpeechRecognized, attempts)?;
                    speak_line(self.voice, &self.phrases.repeat)?;
                }
            }
        }
    }

    fn ask_age(&mut self, question: &str) -> BarResult<u32> {
        let phrases = self.phrases;
        speak_line(self.voice, question)?;
        let mut attempts = 0u32;
        loop {
            let retry = match non_empty(self.voice.listen_once()?) {
                Some(text) => {
                    let parsed = parse_with(self.language, self.observer, &text);
                    if let Some(age) = parsed.number() {
                        return Ok(age);
                    }
                    &phrases.age_unclear
                }
                None => &phrases.age_repeat,
            };
            attempts += 1;
            self.give_up(Hiccup::InvalidAgeAnswer, attempts)?;
            speak_line(self.voice, retry)?;
        }
    }
}

/// One bar session with one guest.
pub struct Conversation<'a> {
    config: &'a BarConfig,
    menu: &'a Menu,
    language: &'a dyn LanguageUnderstanding,
    voice: &'a mut dyn VoiceIo,
    observer: Option<&'a dyn ParseObserver>,
}

impl<'a> Conversation<'a> {
    pub fn new(
        config: &'a BarConfig,
        menu: &'a Menu,
        language: &'a dyn LanguageUnderstanding,
        voice: &'a mut dyn VoiceIo,
    ) -> Self {
        Self {
            config,
            menu,
            language,
            voice,
            observer: None,
        }
    }

    /// Attach a parse observer (diagnostics only).
    pub fn with_observer(mut self, observer: &'a dyn ParseObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run turns until the guest says goodbye or we give up.
    pub fn run(&mut self) -> BarResult<SessionSummary> {
        info!("🍸 Session started");
        if self.config.dialogue.introduce_menu {
            let intro = response::introduction(self.menu);
            speak_line(self.voice, &intro)?;
        }

        let mut served = 0u32;
        let mut abandoned = 0u32;
        let mut ended = SessionEnd::Farewell;
        let mut state = ConversationState::AwaitOrder;

        loop {
            state = match state {
                ConversationState::AwaitOrder => match self.await_order()? {
                    Some(request) => ConversationState::Processing(request),
                    None => {
                        warn!("no usable order; ending session");
                        speak_line(self.voice, &self.config.phrases.give_up)?;
                        speak_line(self.voice, &self.config.phrases.goodbye)?;
                        ended = SessionEnd::GaveUp;
                        ConversationState::Terminated
                    }
                },
                ConversationState::Processing(GuestRequest::Rejection) => {
                    speak_line(self.voice, &self.config.phrases.goodbye)?;
                    ConversationState::Terminated
                }
                ConversationState::Processing(GuestRequest::Order(candidates)) => {
                    match self.resolve(&candidates) {
                        Ok(resolution) => {
                            info!(
                                drinks = ?resolution.drinks,
                                case = ?resolution.case,
                                available = resolution.available,
                                "order resolved"
                            );
                            speak_line(self.voice, &resolution.answer())?;
                            served += 1;
                        }
                        Err(BarError::RetriesExhausted { hiccup, attempts }) => {
                            warn!(%hiccup, attempts, "abandoning turn");
                            speak_line(self.voice, &self.config.phrases.give_up)?;
                            abandoned += 1;
                        }
                        Err(e) => return Err(e),
                    }
                    ConversationState::AwaitAnotherOrder
                }
                ConversationState::AwaitAnotherOrder => {
                    speak_line(self.voice, &self.config.phrases.another_order)?;
                    ConversationState::AwaitOrder
                }
                ConversationState::Terminated => break,
            };
        }

        let summary = SessionSummary {
            turns_served: served,
            turns_abandoned: abandoned,
            ended,
        };
        info!(
            served = summary.turns_served,
            abandoned = summary.turns_abandoned,
            ended = ?summary.ended,
            "👋 Session ended"
        );
        Ok(summary)
    }

    /// Listen until an utterance is a rejection or holds a candidate drink.
    /// `None` once the attempt budget is spent.
    fn await_order(&mut self) -> BarResult<Option<GuestRequest>> {
        let mut attempts = 0u32;
        loop {
            let hiccup = match non_empty(self.voice.listen_once()?) {
                Some(text) => {
                    let parsed = parse_with(self.language, self.observer, &text);
                    match classify_order(&parsed, self.menu.rejection_phrases()) {
                        OrderIntent::EmptyOrder => Hiccup::NoOrderExtracted,
                        OrderIntent::Rejection => return Ok(Some(GuestRequest::Rejection)),
                        OrderIntent::ValidOrder(candidates) => {
                            return Ok(Some(GuestRequest::Order(candidates)))
                        }
                    }
                }
                None => Hiccup::NoSpeechRecognized,
            };
            attempts += 1;
            if self.config.dialogue.exhausted(attempts) {
                return Ok(None);
            }
            info!(%hiccup, attempts, "asking again");
            speak_line(self.voice, &self.config.phrases.repeat)?;
        }
    }

    fn resolve(&mut self, candidates: &[CandidatePhrase]) -> BarResult<TurnResolution> {
        let resolver = OrderResolver::new(self.menu, self.config);
        let mut dialogue =
            VoiceDialogue::new(&mut *self.voice, self.language, self.observer, self.config);
        resolver.resolve_turn(candidates, &mut dialogue)
    }
}
