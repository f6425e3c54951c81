use super::SentinelFiles;
use crate::log_debug;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes one work descriptor into the command file.
///
/// The service watches the command path and may open it at any moment, so
/// the descriptor is staged in a temporary sibling and renamed into place.
/// Rename within one directory is atomic on POSIX filesystems, which keeps a
/// truncated command from ever being observable.
pub struct JobHandoff {
    sentinels: SentinelFiles,
}

impl JobHandoff {
    pub fn new(sentinels: SentinelFiles) -> Self {
        Self { sentinels }
    }

    /// Hand one descriptor to the service. The caller guarantees no other
    /// job is outstanding; no acknowledgment is read back here.
    pub fn submit(&self, descriptor: &str) -> Result<()> {
        write_atomic(&self.sentinels.command, descriptor)?;
        log_debug(&format!(
            "handoff: submitted command to {}",
            self.sentinels.command.display()
        ));
        Ok(())
    }
}

/// Write `contents` to `path` with no observable partial-write window.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = staging_path(path);
    {
        let mut file = fs::File::create(&tmp)
            .with_context(|| format!("failed to create {}", tmp.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("failed to flush {}", tmp.display()))?;
    }
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err).with_context(|| format!("failed to move {} into place", path.display()));
    }
    Ok(())
}

fn staging_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
