use super::defaults::{
    MAX_COMPLETION_TIMEOUT_SECS, MAX_READY_TIMEOUT_SECS, MAX_READ_RETRIES, MAX_RECORD_SECS,
    MIN_RECORD_SECS,
};
use super::AppConfig;
use anyhow::{bail, Context, Result};
use clap::Parser;
use regex::Regex;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize command strings.
    pub fn validate(&mut self) -> Result<()> {
        if self.ready_timeout_secs == 0 || self.ready_timeout_secs > MAX_READY_TIMEOUT_SECS {
            bail!(
                "--ready-timeout-secs must be between 1 and {MAX_READY_TIMEOUT_SECS}, got {}",
                self.ready_timeout_secs
            );
        }
        if self.completion_timeout_secs == 0
            || self.completion_timeout_secs > MAX_COMPLETION_TIMEOUT_SECS
        {
            bail!(
                "--completion-timeout-secs must be between 1 and {MAX_COMPLETION_TIMEOUT_SECS}, got {}",
                self.completion_timeout_secs
            );
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms >= self.completion_timeout_secs * 1000
        {
            bail!(
                "--poll-interval-ms must be nonzero and below the completion budget ({} ms)",
                self.completion_timeout_secs * 1000
            );
        }
        if self.read_retries == 0 || self.read_retries > MAX_READ_RETRIES {
            bail!(
                "--read-retries must be between 1 and {MAX_READ_RETRIES}, got {}",
                self.read_retries
            );
        }
        if !(MIN_RECORD_SECS..=MAX_RECORD_SECS).contains(&self.record_secs) {
            bail!(
                "--record-secs must be between {MIN_RECORD_SECS} and {MAX_RECORD_SECS}, got {}",
                self.record_secs
            );
        }
        if !(8_000..=96_000).contains(&self.sample_rate) {
            bail!(
                "--sample-rate must be between 8000 and 96000 Hz, got {}",
                self.sample_rate
            );
        }
        if !(40..=450).contains(&self.speech_rate) {
            bail!(
                "--speech-rate must be between 40 and 450 wpm, got {}",
                self.speech_rate
            );
        }

        self.service_argv()
            .context("--service-cmd is not a valid command line")?;
        self.asr_argv()
            .context("--asr-cmd is not a valid command line")?;
        self.ready_regex()
            .context("--ready-phrase is not a valid regex")?;

        Ok(())
    }

    /// Service launch command split into argv.
    pub fn service_argv(&self) -> Result<Vec<String>> {
        parse_command(&self.service_cmd, "--service-cmd")
    }

    /// Recognizer command split into argv; the wav path, model, and language
    /// are appended at call time.
    pub fn asr_argv(&self) -> Result<Vec<String>> {
        parse_command(&self.asr_cmd, "--asr-cmd")
    }

    /// Compiled readiness fallback pattern.
    pub fn ready_regex(&self) -> Result<Regex> {
        Regex::new(&self.ready_phrase).context("invalid readiness phrase")
    }
}

fn parse_command(raw: &str, flag: &str) -> Result<Vec<String>> {
    let argv = shell_words::split(raw).with_context(|| format!("{flag}: bad quoting"))?;
    if argv.is_empty() {
        bail!("{flag} must not be empty");
    }
    Ok(argv)
}
