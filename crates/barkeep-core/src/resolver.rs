//! Order resolution: candidate phrases → validated, age-gated drink list.
//!
//! One turn runs tea disambiguation, menu filtering and the age gate, in that
//! order. The two questions the resolver may need to ask (which tea, how old)
//! go through the [`Dialogue`] trait so the state machine stays free of I/O.

use tracing::{debug, info};

use crate::config::{BarConfig, DialogueConfig};
use crate::error::{BarError, BarResult, Hiccup};
use crate::language::{CandidatePhrase, ParsedUtterance};
use crate::menu::{Menu, GENERIC_TEA};
use crate::response;

/// Outcome of the age gate for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionCase {
    /// Nothing alcoholic was ordered.
    NoAlcohol,
    /// Alcohol was ordered and the guest is of age; nothing removed.
    AdultAllAlcohol,
    /// A minor ordered only alcohol; everything removed.
    MinorAllAlcohol,
    /// A minor ordered alcohol and something else; alcohol removed.
    MinorMixed,
}

/// What an utterance means before any resolution happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderIntent {
    /// The guest is done ("no thanks", "nothing").
    Rejection,
    /// No candidate drink in the utterance; ask again.
    EmptyOrder,
    ValidOrder(Vec<CandidatePhrase>),
}

impl OrderIntent {
    /// The legacy yes/no reading: rejections and orders are both "handled".
    pub fn is_order_intent(&self) -> bool {
        !matches!(self, OrderIntent::EmptyOrder)
    }
}

/// Classify an utterance. Rejection phrases win over extracted drinks.
pub fn classify_order(parsed: &ParsedUtterance, rejection_phrases: &[String]) -> OrderIntent {
    if rejection_phrases.iter().any(|p| parsed.contains_phrase(p)) {
        return OrderIntent::Rejection;
    }
    let candidates = parsed.candidate_phrases();
    if candidates.is_empty() {
        OrderIntent::EmptyOrder
    } else {
        OrderIntent::ValidOrder(candidates)
    }
}

/// Boolean form of [`classify_order`].
pub fn is_order_intent(parsed: &ParsedUtterance, rejection_phrases: &[String]) -> bool {
    classify_order(parsed, rejection_phrases).is_order_intent()
}

/// Keep phrases the bar serves, in order, without duplicates.
pub fn filter_available<S: AsRef<str>>(phrases: &[S], menu: &Menu) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for p in phrases {
        let p: &str = p.as_ref();
        if menu.serves(p) && !out.iter().any(|o| o == p) {
            out.push(p.to_string());
        }
    }
    out
}

/// Alcoholic items with their index in `phrases`.
pub fn extract_alcohol<S: AsRef<str>>(phrases: &[S], alcohol: &[String]) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    for (i, p) in phrases.iter().enumerate() {
        let p: &str = p.as_ref();
        if alcohol.iter().any(|a| a == p) {
            out.push((i, p.to_string()));
        }
    }
    out
}

/// Remove the given indices, highest first so lower ones stay valid.
fn remove_indices(mut phrases: Vec<String>, found: &[(usize, String)]) -> Vec<String> {
    let mut indices: Vec<usize> = found.iter().map(|(i, _)| *i).collect();
    indices.sort_unstable_by(|a, b| b.cmp(a));
    for i in indices {
        if i < phrases.len() {
            phrases.remove(i);
        }
    }
    phrases
}

/// True when the bare "tea" was ordered without a variety or a tea drink from the menu.
pub fn needs_tea_choice<S: AsRef<str>>(phrases: &[S], menu: &Menu) -> bool {
    let generic = phrases.iter().any(|p| {
        let p: &str = p.as_ref();
        p == GENERIC_TEA
    });
    let specific = phrases.iter().any(|p| {
        let p: &str = p.as_ref();
        menu.is_tea_variety(p) || (p != GENERIC_TEA && p.ends_with(" tea") && menu.serves(p))
    });
    generic && !specific
}

/// Questions the resolver may ask mid-turn.
pub trait Dialogue {
    /// Ask `question` and return the candidate phrases of the answer.
    fn ask_candidates(&mut self, question: &str) -> BarResult<Vec<CandidatePhrase>>;

    /// Ask `question` until a number is given.
    fn ask_age(&mut self, question: &str) -> BarResult<u32>;
}

/// Result of one resolved turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResolution {
    /// Drinks that will be served.
    pub drinks: Vec<String>,
    pub case: ResolutionCase,
    /// False when nothing ordered was on the menu.
    pub available: bool,
    /// Alcoholic drinks refused because of age.
    pub removed: Vec<String>,
}

impl TurnResolution {
    pub fn answer(&self) -> String {
        response::answer(&self.drinks, self.available, self.case)
    }
}

/// The order-resolution state machine. Borrows the menu and config for its lifetime.
pub struct OrderResolver<'a> {
    menu: &'a Menu,
    tea_retry: &'a str,
    limits: DialogueConfig,
    legal_age: u32,
}

impl<'a> OrderResolver<'a> {
    pub fn new(menu: &'a Menu, config: &'a BarConfig) -> Self {
        Self {
            menu,
            tea_retry: &config.phrases.tea_retry,
            limits: config.dialogue,
            legal_age: config.legal_age,
        }
    }

    /// Replace a bare "tea" with the variety the guest picks, asking until the
    /// answer names one we sell. Other drinks named in the answer join the order.
    pub fn disambiguate_tea(
        &self,
        phrases: Vec<String>,
        dialogue: &mut dyn Dialogue,
    ) -> BarResult<Vec<String>> {
        if !needs_tea_choice(&phrases, self.menu) || self.menu.tea().is_empty() {
            return Ok(phrases);
        }

        let mut question = response::tea_prompt(self.menu.tea());
        let mut attempts = 0u32;
        let (variety, answer) = loop {
            let answer = dialogue.ask_candidates(&question)?;
            if let Some(v) = answer.iter().find(|c| self.menu.is_tea_variety(&c.text)) {
                break (v.text.clone(), answer);
            }
            attempts += 1;
            debug!(attempts, answer = ?answer, "tea answer names no variety");
            if self.limits.exhausted(attempts) {
                return Err(BarError::RetriesExhausted {
                    hiccup: Hiccup::AmbiguousTea,
                    attempts,
                });
            }
            question = self.tea_retry.to_string();
        };

        info!(variety = %variety, "tea variety chosen");
        let mut phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| if p == GENERIC_TEA { variety.clone() } else { p })
            .collect();
        for extra in answer {
            if extra.text != variety
                && self.menu.serves(&extra.text)
                && !phrases.contains(&extra.text)
            {
                debug!(drink = %extra.text, "added with the tea answer");
                phrases.push(extra.text);
            }
        }
        Ok(phrases)
    }

    /// Ask for the guest's age if anything alcoholic was ordered and drop what
    /// a minor may not have.
    pub fn gate_by_age(
        &self,
        phrases: Vec<String>,
        dialogue: &mut dyn Dialogue,
    ) -> BarResult<(Vec<String>, ResolutionCase)> {
        let alcohols = extract_alcohol(&phrases, self.menu.alcohol());
        let names: Vec<&str> = alcohols.iter().map(|(_, n)| n.as_str()).collect();
        let Some(question) = response::age_prompt(&names) else {
            return Ok((phrases, ResolutionCase::NoAlcohol));
        };

        let age = dialogue.ask_age(&question)?;
        if age >= self.legal_age {
            info!(age, "guest is of age");
            return Ok((phrases, ResolutionCase::AdultAllAlcohol));
        }

        info!(age, alcoholic = ?names, "guest is under age; removing alcohol");
        if alcohols.len() == phrases.len() {
            Ok((Vec::new(), ResolutionCase::MinorAllAlcohol))
        } else {
            Ok((remove_indices(phrases, &alcohols), ResolutionCase::MinorMixed))
        }
    }

    /// Resolve one order: tea disambiguation → menu filter → age gate.
    pub fn resolve_turn(
        &self,
        candidates: &[CandidatePhrase],
        dialogue: &mut dyn Dialogue,
    ) -> BarResult<TurnResolution> {
        let phrases: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let phrases = self.disambiguate_tea(phrases, dialogue)?;

        let draft = filter_available(&phrases, self.menu);
        let available = !draft.is_empty();
        if !available {
            debug!(candidates = ?phrases, "nothing ordered is on the menu");
        }

        let before = draft.clone();
        let (drinks, case) = self.gate_by_age(draft, dialogue)?;
        let removed = before
            .into_iter()
            .filter(|d| !drinks.contains(d))
            .collect();

        Ok(TurnResolution {
            drinks,
            case,
            available,
            removed,
        })
    }
}
