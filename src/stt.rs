//! Speech recognition through an external recognizer process.
//!
//! The recognizer is whatever command the operator configures; it receives
//! the WAV path, model name, and language as trailing arguments and prints
//! progress plus the transcript to stdout. The last non-empty line is the
//! transcript, matching how the packaged recognizers report.

use crate::config::AppConfig;
use crate::log_debug;
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

pub struct Transcriber {
    argv: Vec<String>,
    model: String,
    lang: String,
}

impl Transcriber {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            argv: config.asr_argv()?,
            model: config.asr_model.clone(),
            lang: config.lang.clone(),
        })
    }

    /// Run the recognizer over one WAV and return the transcript.
    pub fn transcribe(&self, wav: &Path) -> Result<String> {
        let Some((program, args)) = self.argv.split_first() else {
            bail!("recognizer command is empty");
        };

        let output = Command::new(program)
            .args(args)
            .arg(wav)
            .arg(&self.model)
            .arg(&self.lang)
            .output()
            .with_context(|| format!("failed to run recognizer `{program}`"))?;

        if !output.status.success() {
            bail!(
                "recognizer `{program}` failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let transcript = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string);

        match transcript {
            Some(text) => {
                log_debug("stt: transcript extracted");
                Ok(text)
            }
            None => bail!("recognizer `{program}` produced no transcript"),
        }
    }
}
