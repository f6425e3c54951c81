pub mod audio;
pub mod capture;
pub mod config;
pub mod cycle;
pub mod interrupt;
pub mod ipc;
mod logging;
pub mod prompt;
pub mod report;
pub mod service;
pub mod speech;
pub mod stt;
mod telemetry;

pub use cycle::{CaptureSource, CycleController, CycleOutcome, SpeechSink};
pub use logging::{init_logging, log_debug, log_debug_content, log_file_path};
pub use telemetry::init_tracing;
