//! Bar configuration: menu, phrases, dialogue limits and voice settings.
//!
//! Built once at startup and passed by reference. Precedence (lowest first):
//! built-in defaults → TOML file → `BARKEEP__SECTION__KEY` environment variables.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | BARKEEP_CONFIG | config/barkeep | Path of the TOML file (extension optional). |
//! | BARKEEP__LANGUAGE | en | Language tag handed to speech recognition. |
//! | BARKEEP__LEGAL_AGE | 18 | Minimum age for alcoholic drinks. |
//! | BARKEEP__DIALOGUE__MAX_ATTEMPTS | 5 | Re-prompts before giving up; 0 = never give up. |
//! | BARKEEP__VOICE__MODE | console | `console` (stdin/stdout) or `speech` (microphone + TTS). |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::BarResult;

const DEFAULT_CONFIG_PATH: &str = "config/barkeep";
const ENV_PREFIX: &str = "BARKEEP";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Drink lists as they appear in the config file. Validated into a [`crate::Menu`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuConfig {
    pub hot: Vec<String>,
    pub cold: Vec<String>,
    /// Varieties offered when a guest just asks for "tea". Must be on the menu.
    pub tea: Vec<String>,
    /// Drinks behind the age gate. Must be on the menu.
    pub alcohol: Vec<String>,
    /// Words or phrases that end the session ("no thanks", "nothing", ...).
    pub rejection: Vec<String>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            hot: strings(&[
                "black tea",
                "green tea",
                "jasmine",
                "coffee",
                "cappuccino",
                "latte",
                "americano",
                "espresso",
            ]),
            cold: strings(&[
                "ice tea",
                "lemon juice",
                "orange juice",
                "cola",
                "fanta",
                "apple juice",
                "pineapple juice",
                "sprite",
                "vodka",
                "whiskey",
                "jaeger",
                "rum",
                "brandy",
            ]),
            tea: strings(&["black tea", "jasmine", "green tea"]),
            alcohol: strings(&["vodka", "whiskey", "jaeger", "rum", "brandy"]),
            rejection: strings(&["no thanks", "no", "nothing", "thanks"]),
        }
    }
}

/// Fixed lines the bartender speaks outside of order answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phrases {
    pub another_order: String,
    pub repeat: String,
    pub goodbye: String,
    /// Spoken when a sub-dialogue runs out of attempts.
    pub give_up: String,
    pub tea_retry: String,
    pub age_repeat: String,
    pub age_unclear: String,
}

impl Default for Phrases {
    fn default() -> Self {
        Self {
            another_order: "Do you want to get something else?".to_string(),
            repeat: "I could not understand. Could you please repeat it?".to_string(),
            goodbye: "It was nice to have you. See you later!".to_string(),
            give_up: "Let's try that later.".to_string(),
            tea_retry: "I could not understand. Could you please repeat?".to_string(),
            age_repeat: "Could you please repeat your age?".to_string(),
            age_unclear: "Sorry, I could not understand. Could you please tell me how old you are?"
                .to_string(),
        }
    }
}

/// Limits for the conversational retry loops.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DialogueConfig {
    /// Attempts per question before giving up. 0 keeps asking forever.
    pub max_attempts: u32,
    /// Read the menu aloud when the session starts.
    pub introduce_menu: bool,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            introduce_menu: true,
        }
    }
}

impl DialogueConfig {
    /// Whether `attempts` failed tries have used up the budget.
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts != 0 && attempts >= self.max_attempts
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceMode {
    /// Type orders in the terminal, read answers on stdout.
    #[default]
    Console,
    /// Microphone capture + STT, TTS playback.
    Speech,
}

/// Voice adapter settings (consumed by the daemon when wiring `barkeep-voice`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceSettings {
    pub mode: VoiceMode,
    /// Seconds to wait for speech before reporting silence.
    pub listen_timeout_secs: u64,
    /// Silence after speech that ends an utterance.
    pub gap_ms: u64,
    /// Shorter speech bursts are dropped as noise.
    pub min_speech_ms: u64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            mode: VoiceMode::Console,
            listen_timeout_secs: 10,
            gap_ms: 800,
            min_speech_ms: 200,
        }
    }
}

/// Complete bar configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarConfig {
    /// Language tag passed through to speech recognition (e.g. "en").
    pub language: String,
    pub legal_age: u32,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub phrases: Phrases,
    #[serde(default)]
    pub dialogue: DialogueConfig,
    #[serde(default)]
    pub voice: VoiceSettings,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            legal_age: 18,
            menu: MenuConfig::default(),
            phrases: Phrases::default(),
            dialogue: DialogueConfig::default(),
            voice: VoiceSettings::default(),
        }
    }
}

impl BarConfig {
    /// Load config from defaults, file and environment. File: env `BARKEEP_CONFIG` > `config/barkeep.toml`.
    pub fn load() -> BarResult<Self> {
        let path = std::env::var("BARKEEP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let env = config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true);
        Self::load_with(Some(&path), env)
    }

    /// Load with an explicit file path and environment source. A missing file is skipped.
    pub fn load_with(path: Option<&Path>, env: config::Environment) -> BarResult<Self> {
        let defaults = config::Config::try_from(&BarConfig::default())?;
        let builder = config::Config::builder().add_source(defaults);

        let builder = match path {
            Some(p) => builder.add_source(config::File::from(p).required(false)),
            None => builder,
        };

        let built = builder.add_source(env).build()?;
        let cfg: BarConfig = built.try_deserialize()?;
        Ok(cfg)
    }

    /// Render as TOML (used to print a starter config file).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
