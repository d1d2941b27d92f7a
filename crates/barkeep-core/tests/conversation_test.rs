//! Integration test: full bar sessions driven by a scripted guest.
//!
//! ## Scenarios
//! 1. Plain order, then "no thanks" ends the session.
//! 2. Minor orders vodka only: fixed refusal, no drink names.
//! 3. Mixed order from a minor keeps the soft drink.
//! 4. Generic tea triggers the variety question and re-prompts on a wrong answer.
//! 5. Silence and small talk get the repeat line.
//!    Small talk after a served order does not count as a turn.
//! 6. The attempt budget ends a silent session.
//! 7. An exhausted age question abandons only that turn.

use barkeep_core::{
    BarConfig, BarResult, Conversation, LexiconParser, Menu, ParseObserver, ParsedUtterance,
    SessionEnd, VoiceIo,
};
use std::cell::Cell;
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Helper: a guest that answers from a script and records what the bar says
// ---------------------------------------------------------------------------

struct ScriptedVoice {
    heard: VecDeque<Option<String>>,
    said: Vec<String>,
}

impl ScriptedVoice {
    fn new(script: &[Option<&str>]) -> Self {
        Self {
            heard: script.iter().map(|s| s.map(str::to_string)).collect(),
            said: Vec::new(),
        }
    }
}

impl VoiceIo for ScriptedVoice {
    fn listen_once(&mut self) -> BarResult<Option<String>> {
        // An exhausted script behaves like a guest who walked away.
        Ok(self.heard.pop_front().unwrap_or(None))
    }

    fn speak(&mut self, text: &str) -> BarResult<()> {
        self.said.push(text.to_string());
        Ok(())
    }
}

fn quiet_config() -> BarConfig {
    let mut cfg = BarConfig::default();
    cfg.dialogue.introduce_menu = false;
    cfg
}

fn run(cfg: &BarConfig, script: &[Option<&str>]) -> (barkeep_core::SessionSummary, Vec<String>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let menu = Menu::from_config(&cfg.menu).expect("valid menu");
    let parser = LexiconParser::new();
    let mut voice = ScriptedVoice::new(script);
    let summary = Conversation::new(cfg, &menu, &parser, &mut voice)
        .run()
        .expect("session runs");
    (summary, voice.said)
}

#[test]
fn order_then_farewell() {
    let cfg = quiet_config();
    let (summary, said) = run(
        &cfg,
        &[Some("I want a cola and a green tea"), Some("no thanks")],
    );
    assert_eq!(
        said,
        vec![
            "Your cola and green tea are coming right now!".to_string(),
            cfg.phrases.another_order.clone(),
            cfg.phrases.goodbye.clone(),
        ]
    );
    assert_eq!(summary.turns_served, 1);
    assert_eq!(summary.ended, SessionEnd::Farewell);
}

#[test]
fn minor_ordering_only_vodka_is_refused() {
    let cfg = quiet_config();
    let (_, said) = run(&cfg, &[Some("give me vodka"), Some("15"), Some("nothing")]);
    assert_eq!(
        said[0],
        "You have ordered vodka, which is an alcoholic drink. Could you please tell me your age?"
    );
    assert_eq!(
        said[1],
        "Your order contains only alcoholic beverages and we cannot sell them to you because of your age!"
    );
    assert!(!said[1].contains("vodka"));
}

#[test]
fn minor_mixed_order_keeps_soft_drink() {
    let cfg = quiet_config();
    let (_, said) = run(
        &cfg,
        &[Some("a cola and a whiskey"), Some("I am sixteen"), Some("no")],
    );
    assert_eq!(
        said[1],
        "We cannot sell you the alcoholic drinks you have ordered because of your age. However, your cola is coming right now!"
    );
}

#[test]
fn adult_gets_everything() {
    let cfg = quiet_config();
    let (_, said) = run(
        &cfg,
        &[Some("vodka, rum and a sprite"), Some("I'm 30 years old"), Some("thanks")],
    );
    assert_eq!(said[0], "You have ordered vodka and rum, which are alcoholic drinks. Could you please tell me your age?");
    assert_eq!(said[1], "Your vodka, rum, and sprite are coming right now!");
}

#[test]
fn generic_tea_is_disambiguated() {
    let cfg = quiet_config();
    let (_, said) = run(
        &cfg,
        &[Some("a tea please"), Some("a cola"), Some("green tea"), Some("no")],
    );
    assert_eq!(
        said[0],
        "Which kind of tea would you like? We sell black tea, jasmine, and green tea."
    );
    assert_eq!(said[1], cfg.phrases.tea_retry);
    assert_eq!(said[2], "Your green tea is coming right now!");
}

#[test]
fn silence_and_small_talk_are_reprompted() {
    let cfg = quiet_config();
    let (summary, said) = run(&cfg, &[None, Some("hello"), Some("espresso"), Some("no")]);
    assert_eq!(said[0], cfg.phrases.repeat);
    assert_eq!(said[1], cfg.phrases.repeat);
    assert_eq!(said[2], "Your espresso is coming right now!");
    assert_eq!(summary.turns_served, 1);
}

#[test]
fn small_talk_never_counts_as_a_turn() {
    let cfg = quiet_config();
    let (summary, said) = run(
        &cfg,
        &[Some("I want an Apple juice"), Some("hello there"), Some("no thanks")],
    );
    assert_eq!(
        said,
        vec![
            "Your apple juice is coming right now!".to_string(),
            cfg.phrases.another_order.clone(),
            cfg.phrases.repeat.clone(),
            cfg.phrases.goodbye.clone(),
        ]
    );
    assert_eq!(summary.turns_served, 1);
    assert_eq!(summary.turns_abandoned, 0);
}

#[test]
fn unavailable_drink() {
    let cfg = quiet_config();
    let (_, said) = run(&cfg, &[Some("a pint of beer"), Some("no")]);
    assert_eq!(said[0], "I am sorry, we are not selling it here!");
}

#[test]
fn silent_session_gives_up() {
    let mut cfg = quiet_config();
    cfg.dialogue.max_attempts = 3;
    let (summary, said) = run(&cfg, &[]);
    assert_eq!(summary.ended, SessionEnd::GaveUp);
    assert_eq!(summary.turns_served, 0);
    assert_eq!(
        said,
        vec![
            cfg.phrases.repeat.clone(),
            cfg.phrases.repeat.clone(),
            cfg.phrases.give_up.clone(),
            cfg.phrases.goodbye.clone(),
        ]
    );
}

#[test]
fn exhausted_age_question_abandons_turn() {
    let mut cfg = quiet_config();
    cfg.dialogue.max_attempts = 2;
    let (summary, said) = run(
        &cfg,
        &[Some("brandy"), Some("old enough"), None, Some("no thanks")],
    );
    assert_eq!(said[1], cfg.phrases.age_unclear);
    assert_eq!(said[2], cfg.phrases.give_up);
    assert_eq!(said[3], cfg.phrases.another_order);
    assert_eq!(summary.turns_abandoned, 1);
    assert_eq!(summary.ended, SessionEnd::Farewell);
}

#[test]
fn introduction_is_spoken_first() {
    let cfg = BarConfig::default();
    let (_, said) = run(&cfg, &[Some("no")]);
    assert!(said[0].starts_with("Welcome to the bar."));
    assert_eq!(said[1], cfg.phrases.goodbye);
}

struct CountingObserver {
    seen: Cell<u32>,
}

impl ParseObserver for CountingObserver {
    fn on_parse(&self, _parsed: &ParsedUtterance) {
        self.seen.set(self.seen.get() + 1);
    }
}

#[test]
fn observer_sees_every_parse() {
    let cfg = quiet_config();
    let menu = Menu::from_config(&cfg.menu).unwrap();
    let parser = LexiconParser::new();
    let observer = CountingObserver { seen: Cell::new(0) };
    let mut voice = ScriptedVoice::new(&[Some("vodka"), Some("40"), Some("no")]);
    Conversation::new(&cfg, &menu, &parser, &mut voice)
        .with_observer(&observer)
        .run()
        .unwrap();
    assert_eq!(observer.seen.get(), 3);
}
