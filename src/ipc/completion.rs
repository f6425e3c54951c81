use super::SentinelFiles;
use crate::log_debug;
use anyhow::Result;
use std::fs;
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of waiting for one job's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Lock observed and the response read back successfully.
    Payload(String),
    /// Lock observed but the response was blank or unreadable after every
    /// retry. The sentinels were still retired.
    Empty,
    /// No lock within the budget. Nothing was deleted; a slow service may
    /// still finish, so the caller decides whether to force-reset.
    TimedOut,
}

/// Polls for the lock file and consumes the paired response.
pub struct CompletionWatcher {
    sentinels: SentinelFiles,
    poll_interval: Duration,
    read_retries: u32,
    read_retry_delay: Duration,
}

impl CompletionWatcher {
    pub fn new(
        sentinels: SentinelFiles,
        poll_interval: Duration,
        read_retries: u32,
        read_retry_delay: Duration,
    ) -> Self {
        Self {
            sentinels,
            poll_interval,
            read_retries,
            read_retry_delay,
        }
    }

    /// Block until the lock file appears or `max_wait` elapses.
    ///
    /// The lock is created by the service strictly after the response is
    /// fully written, so its presence is the only read trigger. Metadata
    /// propagation can still lag on some filesystems, hence the bounded
    /// read retries once the lock is seen.
    pub fn await_completion(&self, max_wait: Duration) -> Completion {
        let deadline = Instant::now() + max_wait;
        loop {
            if self.sentinels.lock.exists() {
                break;
            }
            // Interrupts unwind through this wait point as a timeout; the
            // caller's defensive reset still runs before teardown.
            if crate::interrupt::interrupted() {
                return Completion::TimedOut;
            }
            let now = Instant::now();
            if now >= deadline {
                return Completion::TimedOut;
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        }

        let payload = self.read_response();
        // Retire both files even when the read failed; a stale lock would
        // poison the next cycle.
        self.retire_response_pair();

        match payload {
            Some(text) if !text.trim().is_empty() => Completion::Payload(text.trim().to_string()),
            Some(_) => Completion::Empty,
            None => Completion::Empty,
        }
    }

    fn read_response(&self) -> Option<String> {
        for attempt in 1..=self.read_retries {
            match fs::read_to_string(&self.sentinels.response) {
                Ok(text) => return Some(text),
                Err(err) => {
                    log_debug(&format!(
                        "completion: response read attempt {attempt}/{} failed: {err}",
                        self.read_retries
                    ));
                    if attempt < self.read_retries {
                        thread::sleep(self.read_retry_delay);
                    }
                }
            }
        }
        None
    }

    fn retire_response_pair(&self) {
        for path in [&self.sentinels.response, &self.sentinels.lock] {
            if let Err(err) = remove_quietly(path) {
                log_debug(&format!(
                    "completion: failed to retire {}: {err:#}",
                    path.display()
                ));
            }
        }
    }
}

fn remove_quietly(path: &std::path::Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
