//! Text-to-speech output through espeak-ng and aplay.
//!
//! Rendering and playback are separate tools on the target boards, so the
//! text is rendered to a scratch WAV first and the WAV is removed afterward
//! on every path.

use crate::config::AppConfig;
use crate::cycle::SpeechSink;
use crate::log_debug;
use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

pub struct EspeakSpeaker {
    espeak_cmd: String,
    aplay_cmd: String,
    voice: String,
    rate: u32,
    wav_path: PathBuf,
}

impl EspeakSpeaker {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            espeak_cmd: config.espeak_cmd.clone(),
            aplay_cmd: config.aplay_cmd.clone(),
            voice: config.voice.clone(),
            rate: config.speech_rate,
            wav_path: env::temp_dir().join(format!("visionloop_tts_{}.wav", std::process::id())),
        }
    }

    fn render_and_play(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            log_debug("speech: skipping empty text");
            return Ok(());
        }

        let render = Command::new(&self.espeak_cmd)
            .args(["-v", &self.voice, "-s", &self.rate.to_string()])
            .arg(text)
            .arg("-w")
            .arg(&self.wav_path)
            .output()
            .with_context(|| format!("failed to run {}", self.espeak_cmd))?;
        if !render.status.success() {
            let _ = fs::remove_file(&self.wav_path);
            bail!(
                "{} failed: {}",
                self.espeak_cmd,
                String::from_utf8_lossy(&render.stderr).trim()
            );
        }

        let playback = Command::new(&self.aplay_cmd)
            .arg(&self.wav_path)
            .output()
            .with_context(|| format!("failed to run {}", self.aplay_cmd));
        let _ = fs::remove_file(&self.wav_path);

        let playback = playback?;
        if !playback.status.success() {
            bail!(
                "{} failed: {}",
                self.aplay_cmd,
                String::from_utf8_lossy(&playback.stderr).trim()
            );
        }
        Ok(())
    }
}

impl SpeechSink for EspeakSpeaker {
    fn speak(&mut self, text: &str) -> Result<()> {
        self.render_and_play(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn speaker_with(espeak: &str, aplay: &str) -> EspeakSpeaker {
        let config = AppConfig::parse_from([
            "visionloop",
            "--espeak-cmd",
            espeak,
            "--aplay-cmd",
            aplay,
        ]);
        EspeakSpeaker::from_config(&config)
    }

    #[test]
    fn empty_text_is_skipped_without_running_anything() {
        let mut speaker = speaker_with("/no/such/espeak", "/no/such/aplay");
        assert!(speaker.speak("   ").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn stub_tools_round_trip_and_leave_no_wav() {
        let mut speaker = speaker_with("true", "true");
        assert!(speaker.speak("hello").is_ok());
        assert!(!speaker.wav_path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn renderer_failure_is_reported() {
        let mut speaker = speaker_with("false", "true");
        let err = speaker.speak("hello").unwrap_err();
        assert!(err.to_string().contains("false failed"));
    }

    #[cfg(unix)]
    #[test]
    fn playback_failure_is_reported() {
        let mut speaker = speaker_with("true", "false");
        let err = speaker.speak("hello").unwrap_err();
        assert!(err.to_string().contains("false failed"));
    }
}
