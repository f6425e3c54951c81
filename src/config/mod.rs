//! Command-line parsing and validation helpers.

mod defaults;
#[cfg(test)]
mod tests;
mod validation;

use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use defaults::{
    DEFAULT_CAMERA_WARMUP_MS, DEFAULT_CAPTURE_RETRY_SECS, DEFAULT_COMPLETION_TIMEOUT_SECS,
    DEFAULT_CYCLE_DELAY_SECS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_READY_PHRASE,
    DEFAULT_READY_TIMEOUT_SECS, DEFAULT_READ_RETRIES, DEFAULT_READ_RETRY_DELAY_MS,
    DEFAULT_RECORD_SECS, DEFAULT_SAMPLE_RATE, DEFAULT_SERVICE_CMD, DEFAULT_SPEECH_RATE,
};

/// CLI options shared by the vision loop and the prompt loop. Validated values
/// keep downstream subprocesses safe.
#[derive(Debug, Parser, Clone)]
#[command(about = "VisionLoop assistant", author, version)]
pub struct AppConfig {
    /// Command line that launches the inference service (shell-style quoting)
    #[arg(
        long = "service-cmd",
        env = "VISIONLOOP_SERVICE_CMD",
        default_value = DEFAULT_SERVICE_CMD
    )]
    pub service_cmd: String,

    /// Working directory the service is launched from
    #[arg(long = "service-dir", env = "VISIONLOOP_SERVICE_DIR", default_value = ".")]
    pub service_dir: PathBuf,

    /// Directory holding the sentinel files shared with the service
    #[arg(long = "ipc-dir", env = "VISIONLOOP_IPC_DIR", default_value = "/tmp")]
    pub ipc_dir: PathBuf,

    /// Regex matched against service log lines as a readiness fallback
    #[arg(long = "ready-phrase", default_value = DEFAULT_READY_PHRASE)]
    pub ready_phrase: String,

    /// Budget for the service to signal readiness (seconds)
    #[arg(long = "ready-timeout-secs", default_value_t = DEFAULT_READY_TIMEOUT_SECS)]
    pub ready_timeout_secs: u64,

    /// Budget for one job to complete (seconds)
    #[arg(
        long = "completion-timeout-secs",
        default_value_t = DEFAULT_COMPLETION_TIMEOUT_SECS
    )]
    pub completion_timeout_secs: u64,

    /// Interval between lock-file existence checks (milliseconds)
    #[arg(long = "poll-interval-ms", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Pause between completed cycles (seconds)
    #[arg(long = "cycle-delay-secs", default_value_t = DEFAULT_CYCLE_DELAY_SECS)]
    pub cycle_delay_secs: u64,

    /// Backoff after a failed camera capture (seconds)
    #[arg(long = "capture-retry-secs", default_value_t = DEFAULT_CAPTURE_RETRY_SECS)]
    pub capture_retry_secs: u64,

    /// Attempts to read the response file once the lock appears
    #[arg(long = "read-retries", default_value_t = DEFAULT_READ_RETRIES)]
    pub read_retries: u32,

    /// Delay between response read attempts (milliseconds)
    #[arg(long = "read-retry-delay-ms", default_value_t = DEFAULT_READ_RETRY_DELAY_MS)]
    pub read_retry_delay_ms: u64,

    /// V4L2 camera device captured from
    #[arg(long = "camera-device", default_value = "/dev/video0")]
    pub camera_device: String,

    /// Directory captured frames are written to (defaults to a temp subdir)
    #[arg(long = "capture-dir")]
    pub capture_dir: Option<PathBuf>,

    /// FFmpeg binary location
    #[arg(long = "ffmpeg-cmd", default_value = "ffmpeg")]
    pub ffmpeg_cmd: String,

    /// Delay before grabbing a frame so the sensor can settle (milliseconds)
    #[arg(long = "camera-warmup-ms", default_value_t = DEFAULT_CAMERA_WARMUP_MS)]
    pub camera_warmup_ms: u64,

    /// Text-to-speech binary location
    #[arg(long = "espeak-cmd", default_value = "espeak-ng")]
    pub espeak_cmd: String,

    /// Playback binary location
    #[arg(long = "aplay-cmd", default_value = "aplay")]
    pub aplay_cmd: String,

    /// Voice passed to the TTS engine
    #[arg(long, default_value = "en")]
    pub voice: String,

    /// Speech rate in words per minute
    #[arg(long = "speech-rate", default_value_t = DEFAULT_SPEECH_RATE)]
    pub speech_rate: u32,

    /// Recording binary location
    #[arg(long = "arecord-cmd", default_value = "arecord")]
    pub arecord_cmd: String,

    /// ALSA capture device name
    #[arg(long = "audio-device", default_value = "default")]
    pub audio_device: String,

    /// Recording duration in seconds
    #[arg(long = "record-secs", default_value_t = DEFAULT_RECORD_SECS)]
    pub record_secs: u64,

    /// Sample rate for recorded audio (Hz)
    #[arg(long = "sample-rate", default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,

    /// Command line for the external speech recognizer (shell-style quoting)
    #[arg(
        long = "asr-cmd",
        env = "VISIONLOOP_ASR_CMD",
        default_value = "python3 -m useful_transformers.transcribe_wav"
    )]
    pub asr_cmd: String,

    /// Model name appended to the recognizer invocation
    #[arg(long = "asr-model", default_value = "base")]
    pub asr_model: String,

    /// Language passed to the recognizer and the TTS voice selection
    #[arg(long, default_value = "en")]
    pub lang: String,

    /// File the prompt loop publishes the latest transcript to
    #[arg(long = "prompt-file")]
    pub prompt_file: Option<PathBuf>,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "VISIONLOOP_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "VISIONLOOP_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging transcript/response snippets (debug log only)
    #[arg(
        long = "log-content",
        env = "VISIONLOOP_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

impl AppConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn read_retry_delay(&self) -> Duration {
        Duration::from_millis(self.read_retry_delay_ms)
    }

    pub fn camera_warmup(&self) -> Duration {
        Duration::from_millis(self.camera_warmup_ms)
    }

    /// Where captured frames land; falls back to a temp-dir subdirectory.
    pub fn capture_dir(&self) -> PathBuf {
        self.capture_dir
            .clone()
            .unwrap_or_else(|| env::temp_dir().join("visionloop_captures"))
    }

    /// Path the prompt loop overwrites; falls back to the IPC directory.
    pub fn prompt_path(&self) -> PathBuf {
        self.prompt_file
            .clone()
            .unwrap_or_else(|| self.ipc_dir.join("latest_prompt.txt"))
    }

    /// Delays the cycle controller runs with.
    pub fn loop_timings(&self) -> LoopTimings {
        LoopTimings {
            completion_timeout: self.completion_timeout(),
            capture_retry: Duration::from_secs(self.capture_retry_secs),
            cycle_delay: Duration::from_secs(self.cycle_delay_secs),
        }
    }
}

/// Wall-clock budgets driving one submit/wait/consume cycle.
#[derive(Debug, Clone, Copy)]
pub struct LoopTimings {
    pub completion_timeout: Duration,
    pub capture_retry: Duration,
    pub cycle_delay: Duration,
}
