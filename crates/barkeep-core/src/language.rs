//! **Language understanding**: turn an utterance into tagged tokens and
//! candidate drink phrases.
//!
//! Implement `LanguageUnderstanding` for any tagger. `LexiconParser` is the
//! built-in one: regex tokenization plus a closed-class lexicon; every other
//! word is treated as a noun, which is what drink names are.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Coarse part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosTag {
    Noun,
    ProperNoun,
    Adjective,
    Verb,
    Pronoun,
    Determiner,
    Adposition,
    Conjunction,
    Number,
    Other,
}

impl PosTag {
    /// Noun or proper noun.
    pub fn is_nominal(self) -> bool {
        matches!(self, PosTag::Noun | PosTag::ProperNoun)
    }
}

/// One token of an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Text as recognized.
    pub text: String,
    /// Lowercase form used for all matching.
    pub lower: String,
    pub tag: PosTag,
}

/// Where a candidate phrase came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseKind {
    /// Two-token pattern: noun-noun or adjective-noun. Proper nouns count as nouns.
    Compound,
    Noun,
    ProperNoun,
}

/// A possible drink name found in an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePhrase {
    /// Lowercase phrase, words joined by single spaces.
    pub text: String,
    pub kind: PhraseKind,
    /// Index of the first token.
    pub start: usize,
}

/// A tokenized, tagged utterance. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUtterance {
    raw: String,
    tokens: Vec<Token>,
}

impl ParsedUtterance {
    pub fn new(raw: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            raw: raw.into(),
            tokens,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Lowercase words in order.
    pub fn words(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.lower.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when `phrase` occurs as a contiguous run of whole words.
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        let needle: Vec<String> = phrase.split_whitespace().map(|w| w.to_lowercase()).collect();
        if needle.is_empty() || needle.len() > self.tokens.len() {
            return false;
        }
        self.tokens
            .windows(needle.len())
            .any(|w| w.iter().zip(&needle).all(|(t, n)| &t.lower == n))
    }

    /// Candidate drink phrases: two-token compounds (noun-noun, adjective-noun)
    /// plus every single noun and proper noun. De-duplicated, ordered by
    /// position; a compound precedes the single word it starts with.
    ///
    /// Recognizers capitalise freely ("an Apple juice", "a Green Tea"), so a
    /// proper noun pairs like a plain noun.
    pub fn candidate_phrases(&self) -> Vec<CandidatePhrase> {
        let mut found: Vec<CandidatePhrase> = Vec::new();

        for (i, pair) in self.tokens.windows(2).enumerate() {
            let (first, second) = (pair[0].tag, pair[1].tag);
            let matches = second.is_nominal()
                && (first.is_nominal() || first == PosTag::Adjective);
            if matches {
                found.push(CandidatePhrase {
                    text: format!("{} {}", pair[0].lower, pair[1].lower),
                    kind: PhraseKind::Compound,
                    start: i,
                });
            }
        }

        for (i, token) in self.tokens.iter().enumerate() {
            let kind = match token.tag {
                PosTag::Noun => PhraseKind::Noun,
                PosTag::ProperNoun => PhraseKind::ProperNoun,
                _ => continue,
            };
            found.push(CandidatePhrase {
                text: token.lower.clone(),
                kind,
                start: i,
            });
        }

        // Stable sort keeps compounds ahead of singles at the same start.
        found.sort_by_key(|c| c.start);

        let mut out: Vec<CandidatePhrase> = Vec::with_capacity(found.len());
        for c in found {
            if !out.iter().any(|o| o.text == c.text) {
                out.push(c);
            }
        }
        out
    }

    /// First number in the utterance, digits ("15") or words ("twenty one").
    pub fn number(&self) -> Option<u32> {
        let start = self.tokens.iter().position(|t| t.tag == PosTag::Number)?;
        let first = &self.tokens[start];
        if let Ok(n) = first.lower.parse::<u32>() {
            return Some(n);
        }

        let mut total: u32 = 0;
        let mut seen = false;
        for token in self.tokens[start..].iter().take_while(|t| t.tag == PosTag::Number) {
            match token.lower.as_str() {
                "hundred" => {
                    total = total.max(1).saturating_mul(100);
                    seen = true;
                }
                w => match NUMBER_WORDS.get(w) {
                    Some(&v) => {
                        total = total.saturating_add(v);
                        seen = true;
                    }
                    None => break,
                },
            }
        }
        if seen {
            Some(total)
        } else {
            None
        }
    }
}

/// Parser boundary. Implementations must be deterministic for a given text.
pub trait LanguageUnderstanding: Send + Sync {
    fn parse(&self, text: &str) -> ParsedUtterance;
}

/// Diagnostic hook called after each parse.
pub trait ParseObserver {
    fn on_parse(&self, parsed: &ParsedUtterance);
}

/// Logs tagged tokens and candidates at `debug` level.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ParseObserver for TracingObserver {
    fn on_parse(&self, parsed: &ParsedUtterance) {
        let tagged: Vec<String> = parsed
            .tokens()
            .iter()
            .map(|t| format!("{}_{:?}", t.text, t.tag))
            .collect();
        let candidates: Vec<String> = parsed
            .candidate_phrases()
            .into_iter()
            .map(|c| c.text)
            .collect();
        debug!(
            utterance = parsed.raw(),
            tokens = %tagged.join(" "),
            candidates = ?candidates,
            "parsed utterance"
        );
    }
}

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]+(?:['\-][A-Za-z]+)*|\d+").expect("token regex is valid"));

static NUMBER_WORDS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    [
        ("zero", 0),
        ("one", 1),
        ("two", 2),
        ("three", 3),
        ("four", 4),
        ("five", 5),
        ("six", 6),
        ("seven", 7),
        ("eight", 8),
        ("nine", 9),
        ("ten", 10),
        ("eleven", 11),
        ("twelve", 12),
        ("thirteen", 13),
        ("fourteen", 14),
        ("fifteen", 15),
        ("sixteen", 16),
        ("seventeen", 17),
        ("eighteen", 18),
        ("nineteen", 19),
        ("twenty", 20),
        ("thirty", 30),
        ("forty", 40),
        ("fifty", 50),
        ("sixty", 60),
        ("seventy", 70),
        ("eighty", 80),
        ("ninety", 90),
    ]
    .into_iter()
    .collect()
});

static LEXICON: Lazy<HashMap<&'static str, PosTag>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let groups: [(PosTag, &[&str]); 7] = [
        (
            PosTag::Determiner,
            &[
                "a", "an", "the", "some", "any", "this", "that", "these", "those", "my", "your",
                "our", "another", "each", "every", "all", "both",
            ],
        ),
        (
            PosTag::Pronoun,
            &[
                "i", "me", "you", "he", "she", "it", "we", "they", "us", "them", "myself",
                "something", "anything", "nothing", "everything", "i'd", "i'm", "i'll", "i've",
                "we'd", "we'll", "it's", "what", "which",
            ],
        ),
        (
            PosTag::Verb,
            &[
                "want", "wants", "wanted", "would", "like", "love", "get", "give", "have", "has",
                "take", "order", "ordered", "need", "bring", "make", "am", "is", "are", "be",
                "was", "were", "can", "could", "may", "might", "will", "shall", "should", "do",
                "does", "did", "don't", "prefer", "grab", "try", "serve", "pour", "let", "go",
                "drink", "think", "see",
            ],
        ),
        (
            PosTag::Adposition,
            &["of", "for", "with", "without", "in", "on", "at", "to", "from", "by", "about"],
        ),
        (
            PosTag::Conjunction,
            &["and", "or", "but", "plus", "then", "also", "as", "well"],
        ),
        (
            PosTag::Adjective,
            &[
                "green", "black", "white", "red", "hot", "cold", "iced", "small", "large", "big",
                "medium", "double", "single", "warm", "sweet", "fresh", "sparkling", "strong",
                "light", "dark", "little", "nice", "good", "great", "tall", "extra", "old",
                "young", "else",
            ],
        ),
        (
            PosTag::Other,
            &[
                "please", "just", "too", "very", "really", "now", "here", "there", "maybe",
                "yes", "yeah", "no", "not", "hello", "hi", "hey", "okay", "ok", "so", "oh",
                "um", "uh", "right", "actually", "again",
            ],
        ),
    ];
    for (tag, words) in groups {
        for w in words {
            m.insert(*w, tag);
        }
    }
    for w in NUMBER_WORDS.keys() {
        m.insert(*w, PosTag::Number);
    }
    m.insert("hundred", PosTag::Number);
    m
});

/// Rule-based tokenizer and tagger.
#[derive(Debug, Default, Clone)]
pub struct LexiconParser;

impl LexiconParser {
    pub fn new() -> Self {
        Self
    }

    fn tag(word: &str, lower: &str, position: usize) -> PosTag {
        if word.chars().all(|c| c.is_ascii_digit()) {
            return PosTag::Number;
        }
        if let Some(tag) = LEXICON.get(lower) {
            return *tag;
        }
        let capitalized = word.chars().next().map(|c| c.is_uppercase()).unwrap_or(false);
        if capitalized && position > 0 {
            PosTag::ProperNoun
        } else {
            PosTag::Noun
        }
    }
}

impl LanguageUnderstanding for LexiconParser {
    fn parse(&self, text: &str) -> ParsedUtterance {
        let tokens = TOKEN_RE
            .find_iter(text)
            .enumerate()
            .map(|(i, m)| {
                let word = m.as_str();
                let lower = word.to_lowercase();
                let tag = Self::tag(word, &lower, i);
                Token {
                    text: word.to_string(),
                    lower,
                    tag,
                }
            })
            .collect();
        ParsedUtterance::new(text, tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(p: &ParsedUtterance) -> Vec<String> {
        p.candidate_phrases().into_iter().map(|c| c.text).collect()
    }

    #[test]
    fn extracts_compounds_in_order() {
        let p = LexiconParser.parse("I want a cola and a green tea");
        assert_eq!(texts(&p), vec!["cola", "green tea", "tea"]);
    }

    #[test]
    fn noun_noun_compounds() {
        let p = LexiconParser.parse("an orange juice and an ice tea please");
        assert_eq!(
            texts(&p),
            vec!["orange juice", "orange", "juice", "ice tea", "ice", "tea"]
        );
    }

    #[test]
    fn proper_nouns() {
        let p = LexiconParser.parse("give me a Coca Cola");
        let c = p.candidate_phrases();
        assert_eq!(c[0].text, "coca cola");
        assert_eq!(c[0].kind, PhraseKind::Compound);
        assert_eq!(c[1].kind, PhraseKind::ProperNoun);
    }

    #[test]
    fn no_candidates_in_small_talk() {
        let p = LexiconParser.parse("hello, I would like it");
        assert!(p.candidate_phrases().is_empty());
    }

    #[test]
    fn duplicates_collapse() {
        let p = LexiconParser.parse("cola and cola and cola");
        assert_eq!(texts(&p), vec!["cola"]);
    }

    #[test]
    fn contains_phrase_matches_whole_words() {
        let p = LexiconParser.parse("No thanks, I'm fine");
        assert!(p.contains_phrase("no thanks"));
        assert!(p.contains_phrase("no"));
        assert!(!p.contains_phrase("thanks no"));
        assert!(!p.contains_phrase("fin"));
    }

    #[test]
    fn numbers_from_digits_and_words() {
        assert_eq!(LexiconParser.parse("I am 15 years old").number(), Some(15));
        assert_eq!(LexiconParser.parse("twenty one").number(), Some(21));
        assert_eq!(LexiconParser.parse("seventeen").number(), Some(17));
        assert_eq!(LexiconParser.parse("I'm old enough").number(), None);
    }

    #[test]
    fn hundred_alone_is_a_number() {
        assert_eq!(LexiconParser.parse("hundred").number(), Some(100));
        assert_eq!(LexiconParser.parse("one hundred").number(), Some(100));
    }

    #[test]
    fn capitalised_drink_names_still_compound() {
        let p = LexiconParser.parse("I want an Apple juice");
        assert_eq!(texts(&p), vec!["apple juice", "apple", "juice"]);

        let p = LexiconParser.parse("I'd like a Green Tea");
        assert_eq!(texts(&p), vec!["green tea", "tea"]);
    }

    #[test]
    fn tags_known_words() {
        let p = LexiconParser.parse("give me vodka");
        let tags: Vec<PosTag> = p.tokens().iter().map(|t| t.tag).collect();
        assert_eq!(tags, vec![PosTag::Verb, PosTag::Pronoun, PosTag::Noun]);
    }
}
