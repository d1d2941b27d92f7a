//! Integration tests for the voice adapters
//!
//! The microphone tests need audio hardware and are ignored by default.

use barkeep_core::{BarConfig, Conversation, LexiconParser, Menu, SessionEnd};
use barkeep_voice::{ConsoleVoice, Microphone, MicrophoneConfig};
use std::io::Cursor;
use std::time::Duration;

#[test]
fn console_session_end_to_end() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut config = BarConfig::default();
    config.dialogue.introduce_menu = false;
    let menu = Menu::from_config(&config.menu).expect("valid menu");
    let parser = LexiconParser::new();

    let input = Cursor::new("a vodka and a fanta\n17\nno thanks\n");
    let mut voice = ConsoleVoice::new(input, Vec::new());
    let summary = Conversation::new(&config, &menu, &parser, &mut voice)
        .run()
        .expect("session runs");
    assert_eq!(summary.ended, SessionEnd::Farewell);

    let out = String::from_utf8(voice.into_output()).unwrap();
    assert!(out.contains("bartender> You have ordered vodka, which is an alcoholic drink"), "{out}");
    assert!(out.contains("However, your fanta is coming right now!"), "{out}");
    assert!(out.contains(&config.phrases.goodbye));
}

#[test]
fn closed_input_gives_up() {
    let mut config = BarConfig::default();
    config.dialogue.introduce_menu = false;
    config.dialogue.max_attempts = 2;
    let menu = Menu::from_config(&config.menu).unwrap();
    let parser = LexiconParser::new();

    let mut voice = ConsoleVoice::new(Cursor::new(""), Vec::new());
    let summary = Conversation::new(&config, &menu, &parser, &mut voice)
        .run()
        .unwrap();
    assert_eq!(summary.ended, SessionEnd::GaveUp);
}

#[test]
#[ignore] // Requires a microphone
fn microphone_times_out_in_silence() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let config = MicrophoneConfig {
        listen_timeout: Duration::from_secs(2),
        ..MicrophoneConfig::default()
    };
    let mut mic = Microphone::open(config).expect("Failed to open microphone");
    println!("\n🤫 Stay quiet for two seconds...");
    let heard = mic.listen_once().expect("capture failed");
    assert!(heard.is_none());
}

#[test]
#[ignore] // Requires a microphone and a speaker
fn microphone_captures_an_utterance() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let config = MicrophoneConfig {
        listen_timeout: Duration::from_secs(10),
        ..MicrophoneConfig::default()
    };
    let mut mic = Microphone::open(config).expect("Failed to open microphone");
    println!("\n🎤 Order a drink within 10 seconds...");
    match mic.listen_once().expect("capture failed") {
        Some(u) => {
            println!("✅ {:.1}s, {} samples", u.duration.as_secs_f32(), u.samples.len());
            assert_eq!(u.sample_rate, 16000);
            assert!(!u.samples.is_empty());
        }
        None => println!("⏱️ Nothing heard; expected if you stayed silent."),
    }
}
