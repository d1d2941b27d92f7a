//! # Barkeep Core - voice bar ordering
//!
//! Turns a guest's utterance into a served (or politely refused) drink order.
//!
//! ```text
//! utterance ──► LanguageUnderstanding ──► candidate phrases
//!                                              │
//!                          ┌───────────────────┘
//!                          ▼
//!   OrderResolver: tea disambiguation → menu filter → age gate
//!                          │
//!                          ▼
//!   response::answer ──► VoiceIo::speak
//! ```
//!
//! The voice and language adapters are traits; `barkeep-voice` provides the
//! microphone/speaker implementation, tests use scripted fakes.

pub mod config;
pub mod conversation;
pub mod error;
pub mod language;
pub mod menu;
pub mod resolver;
pub mod response;

pub use config::{BarConfig, DialogueConfig, MenuConfig, Phrases, VoiceMode, VoiceSettings};
pub use conversation::{
    Conversation, ConversationState, GuestRequest, SessionEnd, SessionSummary, VoiceDialogue,
    VoiceIo,
};
pub use error::{BarError, BarResult, Hiccup};
pub use language::{
    CandidatePhrase, LanguageUnderstanding, LexiconParser, ParseObserver, ParsedUtterance,
    PhraseKind, PosTag, Token, TracingObserver,
};
pub use menu::Menu;
pub use resolver::{
    classify_order, extract_alcohol, filter_available, is_order_intent, needs_tea_choice,
    Dialogue, OrderIntent, OrderResolver, ResolutionCase, TurnResolution,
};
