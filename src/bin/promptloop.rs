//! Prompt loop entrypoint: record a clip, transcribe it with the external
//! recognizer, confirm aloud, and publish the transcript for the inference
//! service. Rounds repeat until interrupted; a failed round backs off
//! instead of exiting.

use anyhow::Result;
use std::sync::atomic::Ordering;
use std::time::Duration;
use visionloop::audio::Recorder;
use visionloop::config::AppConfig;
use visionloop::cycle::sleep_interruptible;
use visionloop::interrupt::install_interrupt_handler;
use visionloop::prompt::PromptPublisher;
use visionloop::speech::EspeakSpeaker;
use visionloop::stt::Transcriber;
use visionloop::{init_logging, init_tracing, log_debug, SpeechSink};

const ROUND_RETRY: Duration = Duration::from_secs(5);

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    init_tracing(&config);
    let interrupt = install_interrupt_handler();

    let recorder = Recorder::from_config(&config);
    let transcriber = Transcriber::from_config(&config)?;
    let mut speaker = EspeakSpeaker::from_config(&config);
    let publisher = PromptPublisher::from_config(&config);
    publisher.clear()?;

    let _ = speaker.speak("voice prompt loop started");
    eprintln!("listening; publishing prompts to {}", publisher.path().display());

    while !interrupt.load(Ordering::Relaxed) {
        match run_round(&recorder, &transcriber, &mut speaker, &publisher) {
            Ok(text) => {
                log_debug(&format!("promptloop: published {} chars", text.chars().count()));
            }
            Err(err) => {
                log_debug(&format!("promptloop: round failed: {err:#}"));
                eprintln!("round failed: {err:#}");
                let _ = speaker.speak("voice recognition failed");
                if !sleep_interruptible(ROUND_RETRY, interrupt) {
                    break;
                }
            }
        }
    }

    let _ = speaker.speak("voice prompt loop stopped");
    eprintln!("interrupted, shutting down");
    Ok(())
}

fn run_round(
    recorder: &Recorder,
    transcriber: &Transcriber,
    speaker: &mut EspeakSpeaker,
    publisher: &PromptPublisher,
) -> Result<String> {
    let wav = recorder.record_mono()?;
    let text = transcriber.transcribe(&wav)?;
    // Confirm aloud, but publish the raw transcript so the service gets the
    // plain instruction.
    let _ = speaker.speak(&format!("received, {text}"));
    publisher.publish(&text)?;
    Ok(text)
}
