//! Per-cycle outcome records, appended as JSON lines next to the trace log.

use crate::cycle::CycleOutcome;
use crate::logging;
use serde::Serialize;
use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Serialize)]
pub struct CycleRecord {
    pub cycle: u64,
    pub outcome: &'static str,
    pub elapsed_ms: u64,
    pub response_chars: usize,
}

pub fn report_path() -> PathBuf {
    env::var("VISIONLOOP_CYCLE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("visionloop_cycles.jsonl"))
}

pub(crate) fn record_cycle(cycle: u64, outcome: &CycleOutcome, elapsed: Duration) {
    if !logging::logging_enabled() {
        return;
    }
    let record = CycleRecord {
        cycle,
        outcome: outcome.label(),
        elapsed_ms: elapsed.as_millis() as u64,
        response_chars: match outcome {
            CycleOutcome::Spoke(text) => text.chars().count(),
            _ => 0,
        },
    };
    append(&record);
}

fn append(record: &CycleRecord) {
    let Ok(line) = serde_json::to_string(record) else {
        return;
    };
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(report_path())
    {
        let _ = writeln!(file, "{line}");
    }
}
