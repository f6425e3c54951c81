use super::SentinelFiles;
use crate::log_debug;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use regex::Regex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// How long to wait for the next log line before re-checking the signal file.
const LINE_WAIT_TICK: Duration = Duration::from_millis(250);

/// Grace period after a phrase-only match so the signal file can settle.
const HEURISTIC_SETTLE: Duration = Duration::from_millis(200);

/// What convinced the watcher the service is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadySource {
    /// The ready-signal file appeared. Authoritative.
    SignalFile,
    /// The service logged its final startup phrase. Best-effort fallback for
    /// a delayed signal file; logged distinctly so phrase drift is visible.
    LogPhrase,
}

impl ReadySource {
    pub fn label(self) -> &'static str {
        match self {
            ReadySource::SignalFile => "signal file",
            ReadySource::LogPhrase => "log phrase",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready(ReadySource),
    TimedOut,
    /// The operator asked to stop while waiting. Not a failure; the caller
    /// takes the same teardown path as a normal exit.
    Interrupted,
}

/// Watches the service's combined output stream and the filesystem until the
/// service is ready to accept work, bounded by a wall-clock budget.
pub struct ReadinessWatcher {
    lines: Receiver<String>,
    signal_path: PathBuf,
    phrase: Regex,
}

impl ReadinessWatcher {
    pub fn new(lines: Receiver<String>, sentinels: &SentinelFiles, phrase: Regex) -> Self {
        Self {
            lines,
            signal_path: sentinels.ready_signal.clone(),
            phrase,
        }
    }

    /// Consume startup log lines until the service looks ready, `max_wait`
    /// elapses (measured from the call, not from the last line), or the
    /// interrupt flag is raised. Lines are forward-only; once readiness is
    /// declared the stream is left alone.
    pub fn await_ready(&self, max_wait: Duration, interrupt: &AtomicBool) -> Readiness {
        let deadline = Instant::now() + max_wait;
        let mut stream_open = true;

        while Instant::now() < deadline {
            if interrupt.load(Ordering::Relaxed) {
                return Readiness::Interrupted;
            }
            let tick = remaining_tick(deadline);
            if stream_open {
                match self.lines.recv_timeout(tick) {
                    Ok(line) => {
                        let line = line.trim();
                        log_debug(&format!("service: {line}"));
                        if self.signal_path.exists() {
                            return Readiness::Ready(ReadySource::SignalFile);
                        }
                        if self.phrase.is_match(line) {
                            log_debug(
                                "readiness: log phrase matched before the signal file appeared",
                            );
                            thread::sleep(HEURISTIC_SETTLE);
                            return Readiness::Ready(ReadySource::LogPhrase);
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if self.signal_path.exists() {
                            return Readiness::Ready(ReadySource::SignalFile);
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        // Stream closed (service exited or redirected its
                        // output); keep watching the filesystem alone.
                        log_debug("readiness: service output stream closed");
                        stream_open = false;
                    }
                }
            } else {
                if self.signal_path.exists() {
                    return Readiness::Ready(ReadySource::SignalFile);
                }
                thread::sleep(tick);
            }
        }

        // Close the race where the signal landed between the last read and
        // the deadline check.
        if self.signal_path.exists() {
            return Readiness::Ready(ReadySource::SignalFile);
        }
        Readiness::TimedOut
    }
}

fn remaining_tick(deadline: Instant) -> Duration {
    LINE_WAIT_TICK.min(deadline.saturating_duration_since(Instant::now()))
}
