//! Barkeep: a voice-driven bar ordering assistant.
//!
//! Usage:
//!   cargo run -p barkeep-daemon -- [--console | --speech] [--print-config] [--list-devices]
//!
//! Config: `BARKEEP_CONFIG` or `config/barkeep.toml`, overridden by `BARKEEP__SECTION__KEY`.
//! Speech mode reads STT_* / TTS_* / WHISPER_MODEL_PATH from the environment (or `.env`).

use barkeep_core::{
    BarConfig, Conversation, LexiconParser, Menu, SessionSummary, TracingObserver, VoiceIo,
    VoiceMode,
};
use barkeep_voice::{AudioCapture, ConsoleVoice, SpokenVoice};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type MainResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn main() -> MainResult<()> {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[barkeep] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = BarConfig::load()?;
    if args.iter().any(|a| a == "--console") {
        config.voice.mode = VoiceMode::Console;
    }
    if args.iter().any(|a| a == "--speech") {
        config.voice.mode = VoiceMode::Speech;
    }

    if args.iter().any(|a| a == "--print-config") {
        print!("{}", config.to_toml()?);
        return Ok(());
    }
    if args.iter().any(|a| a == "--list-devices") {
        for name in AudioCapture::list_input_devices()? {
            println!("{}", name);
        }
        return Ok(());
    }

    let menu = Menu::from_config(&config.menu)?;
    info!(
        mode = ?config.voice.mode,
        language = %config.language,
        legal_age = config.legal_age,
        max_attempts = config.dialogue.max_attempts,
        "🍸 Barkeep starting"
    );

    let summary = match config.voice.mode {
        VoiceMode::Console => {
            let mut voice = ConsoleVoice::stdio();
            serve(&config, &menu, &mut voice)?
        }
        VoiceMode::Speech => {
            let mut voice = SpokenVoice::from_config(&config)?;
            serve(&config, &menu, &mut voice)?
        }
    };

    info!(
        served = summary.turns_served,
        abandoned = summary.turns_abandoned,
        "Barkeep closed"
    );
    Ok(())
}

fn serve(config: &BarConfig, menu: &Menu, voice: &mut dyn VoiceIo) -> MainResult<SessionSummary> {
    let parser = LexiconParser::new();
    let observer = TracingObserver;
    let summary = Conversation::new(config, menu, &parser, voice)
        .with_observer(&observer)
        .run()?;
    Ok(summary)
}

fn print_usage() {
    eprintln!("Barkeep - voice bar ordering assistant");
    eprintln!("  --console         Type orders in the terminal (default)");
    eprintln!("  --speech          Use the microphone and speaker");
    eprintln!("  --print-config    Print the effective configuration as TOML and exit");
    eprintln!("  --list-devices    List audio input devices and exit");
    eprintln!();
    eprintln!("Speech mode: STT_API_KEY / TTS_API_KEY for OpenAI-compatible APIs,");
    eprintln!("or WHISPER_MODEL_PATH with the `whisper` feature for local recognition.");
}
