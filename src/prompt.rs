//! Publishes the latest transcript for the inference service to pick up.
//!
//! The file always holds exactly one prompt. Writes go through the same
//! atomic staging as the command handoff so a reader never sees a
//! half-written prompt.

use crate::config::AppConfig;
use crate::ipc::write_atomic;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;

pub struct PromptPublisher {
    path: PathBuf,
}

impl PromptPublisher {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.prompt_path())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Remove a prompt left over from a previous run.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to clear stale prompt {}", self.path.display())),
        }
    }

    /// Overwrite the published prompt with the newest transcript.
    pub fn publish(&self, text: &str) -> Result<()> {
        write_atomic(&self.path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn scratch_prompt() -> PromptPublisher {
        let unique = format!(
            "{}_{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        );
        PromptPublisher::new(std::env::temp_dir().join(format!("visionloop_prompt_{unique}.txt")))
    }

    #[test]
    fn publish_then_read_round_trips() {
        let publisher = scratch_prompt();
        publisher.publish("turn on the light").unwrap();
        assert_eq!(
            fs::read_to_string(publisher.path()).unwrap(),
            "turn on the light"
        );
        publisher.clear().unwrap();
    }

    #[test]
    fn publish_overwrites_the_previous_prompt() {
        let publisher = scratch_prompt();
        publisher.publish("first").unwrap();
        publisher.publish("second").unwrap();
        assert_eq!(fs::read_to_string(publisher.path()).unwrap(), "second");
        publisher.clear().unwrap();
    }

    #[test]
    fn clear_is_idempotent() {
        let publisher = scratch_prompt();
        assert!(publisher.clear().is_ok());
        publisher.publish("text").unwrap();
        assert!(publisher.clear().is_ok());
        assert!(publisher.clear().is_ok());
        assert!(!publisher.path().exists());
    }
}
