//! Drives the capture → submit → wait → speak loop, one job in flight.
//!
//! The controller is the only place recoverable failures are handled; they
//! never escape the loop. A completion timeout costs the current job and
//! triggers a defensive sentinel reset so the next cycle starts clean.

use crate::config::{AppConfig, LoopTimings};
use crate::ipc::{Completion, CompletionWatcher, JobHandoff, SentinelFiles};
use crate::report;
use crate::{log_debug, log_debug_content};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Slice length for sleeps so an interrupt is noticed promptly.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Produces one work descriptor per cycle (a captured frame path).
pub trait CaptureSource {
    fn capture(&mut self) -> Result<PathBuf>;
}

/// Consumes the service's answer. Failures are logged, never fatal.
pub trait SpeechSink {
    fn speak(&mut self, text: &str) -> Result<()>;
}

/// Where the controller currently is inside one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Submitting,
    WaitingForResult,
    Consuming,
    /// The loop has stopped for good (interrupt or fatal condition);
    /// control belongs to the lifecycle manager now.
    Aborted,
}

/// How one cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Response received and handed to the speech sink.
    Spoke(String),
    /// Lock observed but the response was blank or unreadable.
    EmptyResponse,
    /// The capture collaborator produced nothing; retry after backoff.
    CaptureFailed,
    /// The command file could not be written; sentinels were reset.
    SubmitFailed,
    /// No response within budget; sentinels were reset, job discarded.
    TimedOut,
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Spoke(_) => "spoke",
            CycleOutcome::EmptyResponse => "empty_response",
            CycleOutcome::CaptureFailed => "capture_failed",
            CycleOutcome::SubmitFailed => "submit_failed",
            CycleOutcome::TimedOut => "timed_out",
        }
    }
}

pub struct CycleController {
    handoff: JobHandoff,
    completion: CompletionWatcher,
    sentinels: SentinelFiles,
    timings: LoopTimings,
    phase: CyclePhase,
    cycles_run: u64,
}

impl CycleController {
    pub fn new(
        sentinels: SentinelFiles,
        completion: CompletionWatcher,
        timings: LoopTimings,
    ) -> Self {
        Self {
            handoff: JobHandoff::new(sentinels.clone()),
            completion,
            sentinels,
            timings,
            phase: CyclePhase::Idle,
            cycles_run: 0,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let sentinels = SentinelFiles::in_dir(&config.ipc_dir);
        let completion = CompletionWatcher::new(
            sentinels.clone(),
            config.poll_interval(),
            config.read_retries,
            config.read_retry_delay(),
        );
        Self::new(sentinels, completion, config.loop_timings())
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    /// Run one full request/response cycle and return how it ended.
    pub fn run_once(
        &mut self,
        capture: &mut dyn CaptureSource,
        speech: &mut dyn SpeechSink,
    ) -> CycleOutcome {
        let started = Instant::now();
        self.cycles_run += 1;
        self.phase = CyclePhase::Idle;

        let descriptor = match capture.capture() {
            Ok(path) => path,
            Err(err) => {
                log_debug(&format!("cycle: capture failed: {err:#}"));
                return self.finish(CycleOutcome::CaptureFailed, started);
            }
        };

        self.phase = CyclePhase::Submitting;
        if let Err(err) = self.handoff.submit(&descriptor.display().to_string()) {
            log_debug(&format!("cycle: submit failed: {err:#}"));
            self.defensive_reset("submit failure");
            return self.finish(CycleOutcome::SubmitFailed, started);
        }

        self.phase = CyclePhase::WaitingForResult;
        let outcome = match self.completion.await_completion(self.timings.completion_timeout) {
            Completion::Payload(text) => {
                self.phase = CyclePhase::Consuming;
                log_debug_content(&format!("cycle: response: {text}"));
                if let Err(err) = speech.speak(&text) {
                    log_debug(&format!("cycle: speech output failed: {err:#}"));
                }
                // The response pair is already retired; the command file was
                // consumed by the service.
                CycleOutcome::Spoke(text)
            }
            Completion::Empty => {
                log_debug("cycle: response was empty or unreadable");
                CycleOutcome::EmptyResponse
            }
            Completion::TimedOut => {
                log_debug("cycle: completion wait timed out, discarding job");
                self.defensive_reset("completion timeout");
                CycleOutcome::TimedOut
            }
        };
        self.finish(outcome, started)
    }

    /// Loop until the interrupt flag is raised. Every wait point observes
    /// the flag so an operator stop unwinds promptly.
    pub fn run(
        &mut self,
        capture: &mut dyn CaptureSource,
        speech: &mut dyn SpeechSink,
        interrupt: &AtomicBool,
    ) {
        while !interrupt.load(Ordering::Relaxed) {
            let outcome = self.run_once(capture, speech);
            let delay = match outcome {
                CycleOutcome::CaptureFailed => self.timings.capture_retry,
                _ => self.timings.cycle_delay,
            };
            if !sleep_interruptible(delay, interrupt) {
                break;
            }
        }
        self.phase = CyclePhase::Aborted;
        log_debug(&format!("cycle: loop stopped after {} cycles", self.cycles_run));
    }

    fn finish(&mut self, outcome: CycleOutcome, started: Instant) -> CycleOutcome {
        self.phase = CyclePhase::Idle;
        tracing::info!(
            cycle = self.cycles_run,
            outcome = outcome.label(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cycle finished"
        );
        report::record_cycle(self.cycles_run, &outcome, started.elapsed());
        outcome
    }

    fn defensive_reset(&self, reason: &str) {
        if let Err(err) = self.sentinels.reset() {
            log_debug(&format!("cycle: reset after {reason} failed: {err:#}"));
        }
    }
}

/// Sleep in short slices; returns false if the interrupt fired.
pub fn sleep_interruptible(total: Duration, interrupt: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    while Instant::now() < deadline {
        if interrupt.load(Ordering::Relaxed) {
            return false;
        }
        thread::sleep(SLEEP_SLICE.min(deadline.saturating_duration_since(Instant::now())));
    }
    !interrupt.load(Ordering::Relaxed)
}
