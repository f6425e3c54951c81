//! File-based handshake with the out-of-process inference service.
//!
//! The service cannot be linked in-process, so work moves through four
//! sentinel paths in a shared directory: the service announces readiness by
//! touching a signal file, the orchestrator hands over one job by atomically
//! writing a command file, and the service answers by writing the response
//! file followed by a lock file. The lock is the only valid cue that the
//! response is complete; ownership of each path alternates by protocol
//! phase rather than by any filesystem locking primitive.

mod completion;
mod handoff;
mod readiness;
mod sentinel;

pub use completion::{Completion, CompletionWatcher};
pub use handoff::{write_atomic, JobHandoff};
pub use readiness::{Readiness, ReadinessWatcher, ReadySource};
pub use sentinel::SentinelFiles;
