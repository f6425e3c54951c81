use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The four protocol paths shared with the inference service.
///
/// `ready_signal` and `lock` carry meaning by existence alone; `command` and
/// `response` carry a single payload each. File names are fixed, only the
/// directory moves.
#[derive(Debug, Clone)]
pub struct SentinelFiles {
    pub ready_signal: PathBuf,
    pub command: PathBuf,
    pub response: PathBuf,
    pub lock: PathBuf,
}

impl SentinelFiles {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            ready_signal: dir.join("service_ready.signal"),
            command: dir.join("command.txt"),
            response: dir.join("response.txt"),
            lock: dir.join("response.lock"),
        }
    }

    fn all(&self) -> [&Path; 4] {
        [&self.ready_signal, &self.command, &self.response, &self.lock]
    }

    /// Delete every sentinel that exists. Missing files are fine; this runs
    /// before startup, after timeouts, and during teardown, so it must be
    /// callable from any protocol state.
    pub fn reset(&self) -> Result<()> {
        for path in self.all() {
            remove_if_exists(path)?;
        }
        Ok(())
    }

    /// True when no sentinel is on disk (the pre-job state).
    pub fn is_clear(&self) -> bool {
        self.all().iter().all(|path| !path.exists())
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => {
            Err(err).with_context(|| format!("failed to remove sentinel {}", path.display()))
        }
    }
}
