//! Default values shared between the CLI definition and validation.

pub const DEFAULT_SERVICE_CMD: &str = "./demo 1024 1024";

/// Log line the service prints right before it starts watching the command
/// file. Matching it is a fallback for a delayed ready-signal file.
pub const DEFAULT_READY_PHRASE: &str = "entering file listen mode";

pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 45;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;
pub const DEFAULT_CYCLE_DELAY_SECS: u64 = 3;
pub const DEFAULT_CAPTURE_RETRY_SECS: u64 = 5;
pub const DEFAULT_READ_RETRIES: u32 = 3;
pub const DEFAULT_READ_RETRY_DELAY_MS: u64 = 100;

pub const DEFAULT_CAMERA_WARMUP_MS: u64 = 1000;
pub const DEFAULT_SPEECH_RATE: u32 = 150;
pub const DEFAULT_RECORD_SECS: u64 = 10;
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

pub const MAX_READY_TIMEOUT_SECS: u64 = 600;
pub const MAX_COMPLETION_TIMEOUT_SECS: u64 = 600;
pub const MAX_READ_RETRIES: u32 = 10;
pub const MIN_RECORD_SECS: u64 = 1;
pub const MAX_RECORD_SECS: u64 = 60;
