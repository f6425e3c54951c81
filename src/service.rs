//! Lifecycle of the external inference service process.
//!
//! The service is a separately-built binary with its own resource domain, so
//! it is launched as a child with both output streams piped. Lines are
//! forwarded into a channel for the readiness watcher. Shutdown (including
//! drop on panic or early return) terminates the process and resets the
//! sentinel files, so no run can leave stale protocol state behind.

use crate::config::AppConfig;
use crate::ipc::SentinelFiles;
use crate::log_debug;
use anyhow::{bail, Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long the service gets to exit after SIGTERM before SIGKILL.
const TERM_GRACE: Duration = Duration::from_secs(5);

const EXIT_POLL: Duration = Duration::from_millis(50);

/// Handle to the running inference service.
///
/// Owns the child process and the line-forwarder threads. `shutdown` runs on
/// drop, so holding this on the stack gives cleanup on every exit path.
#[derive(Debug)]
pub struct ServiceProcess {
    child: Option<Child>,
    sentinels: SentinelFiles,
    lines: Receiver<String>,
    forwarders: Vec<JoinHandle<()>>,
}

impl ServiceProcess {
    /// Reset the sentinel set, then launch the service with its combined
    /// output captured line by line.
    pub fn start(config: &AppConfig, sentinels: SentinelFiles) -> Result<Self> {
        sentinels
            .reset()
            .context("failed to clear stale sentinel files before startup")?;

        let argv = config.service_argv()?;
        let Some((program, args)) = argv.split_first() else {
            bail!("service command is empty");
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&config.service_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to launch inference service `{program}`"))?;
        log_debug(&format!("service: launched `{program}` (pid {})", child.id()));

        let (tx, rx) = unbounded();
        let mut forwarders = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            forwarders.push(spawn_line_forwarder(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            forwarders.push(spawn_line_forwarder(stderr, tx));
        }

        Ok(Self {
            child: Some(child),
            sentinels,
            lines: rx,
            forwarders,
        })
    }

    /// Stream of the service's stdout and stderr, one line per message. The
    /// sender side closes when the service exits.
    pub fn lines(&self) -> Receiver<String> {
        self.lines.clone()
    }

    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Request graceful termination, escalate if ignored, then reset the
    /// sentinel files regardless of how the service died. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(mut child) = self.child.take() {
            log_debug("service: requesting termination");
            request_terminate(&mut child);
            if !wait_with_deadline(&mut child, TERM_GRACE) {
                log_debug("service: unresponsive, escalating to SIGKILL");
                let _ = child.kill();
                let _ = child.wait();
            }
            for handle in self.forwarders.drain(..) {
                let _ = handle.join();
            }
        }
        if let Err(err) = self.sentinels.reset() {
            log_debug(&format!("service: sentinel reset during shutdown failed: {err:#}"));
        }
    }
}

impl Drop for ServiceProcess {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_line_forwarder<R>(stream: R, tx: Sender<String>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    })
}

fn request_terminate(child: &mut Child) {
    #[cfg(unix)]
    unsafe {
        if libc::kill(child.id() as i32, libc::SIGTERM) != 0 {
            log_debug(&format!(
                "service: failed to send SIGTERM to pid {}: {}",
                child.id(),
                std::io::Error::last_os_error()
            ));
        }
    }

    #[cfg(not(unix))]
    {
        // No graceful signal available; go straight to kill.
        let _ = child.kill();
    }
}

fn wait_with_deadline(child: &mut Child, grace: Duration) -> bool {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                log_debug(&format!("service: exited with {status}"));
                return true;
            }
            Ok(None) => {}
            Err(err) => {
                log_debug(&format!("service: wait failed: {err}"));
                return false;
            }
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(EXIT_POLL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

    struct TestDir {
        path: PathBuf,
    }

    impl TestDir {
        fn new(prefix: &str) -> Self {
            let unique = format!(
                "{}_{}_{}",
                prefix,
                std::process::id(),
                DIR_COUNTER.fetch_add(1, Ordering::SeqCst)
            );
            let path = std::env::temp_dir().join(format!("visionloop_service_{unique}"));
            fs::create_dir_all(&path).unwrap();
            Self { path }
        }
    }

    impl Drop for TestDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    fn config_with_service(cmd: &str) -> AppConfig {
        let mut config = AppConfig::parse_from(["visionloop", "--service-cmd", cmd]);
        config.validate().unwrap();
        config
    }

    #[cfg(unix)]
    #[test]
    fn start_clears_stale_sentinels_first() {
        let dir = TestDir::new("stale");
        let sentinels = SentinelFiles::in_dir(&dir.path);
        fs::write(&sentinels.command, "stale job").unwrap();
        fs::write(&sentinels.lock, b"").unwrap();

        let config = config_with_service("sleep 30");
        let mut service = ServiceProcess::start(&config, sentinels.clone()).unwrap();
        assert!(sentinels.is_clear());
        service.shutdown();
    }

    #[cfg(unix)]
    #[test]
    fn shutdown_terminates_promptly_and_resets_sentinels() {
        let dir = TestDir::new("shutdown");
        let sentinels = SentinelFiles::in_dir(&dir.path);
        let config = config_with_service("sleep 30");

        let mut service = ServiceProcess::start(&config, sentinels.clone()).unwrap();
        fs::write(&sentinels.response, "half-finished").unwrap();
        fs::write(&sentinels.lock, b"").unwrap();

        let started = std::time::Instant::now();
        service.shutdown();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(sentinels.is_clear());

        // Second shutdown on an already-dead service is a no-op.
        service.shutdown();
    }

    #[cfg(unix)]
    #[test]
    fn drop_runs_the_cleanup_path() {
        let dir = TestDir::new("drop");
        let sentinels = SentinelFiles::in_dir(&dir.path);
        let config = config_with_service("sleep 30");
        {
            let service = ServiceProcess::start(&config, sentinels.clone()).unwrap();
            fs::write(&sentinels.command, "in flight").unwrap();
            drop(service);
        }
        assert!(sentinels.is_clear());
    }

    #[cfg(unix)]
    #[test]
    fn output_lines_are_forwarded() {
        let dir = TestDir::new("lines");
        let sentinels = SentinelFiles::in_dir(&dir.path);
        let config = config_with_service("sh -c \"echo one; echo two >&2\"");

        let mut service = ServiceProcess::start(&config, sentinels).unwrap();
        let lines = service.lines();
        let mut seen = Vec::new();
        while let Ok(line) = lines.recv_timeout(Duration::from_secs(5)) {
            seen.push(line);
            if seen.len() == 2 {
                break;
            }
        }
        service.shutdown();

        seen.sort();
        assert_eq!(seen, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn missing_binary_is_a_startup_failure() {
        let dir = TestDir::new("missing");
        let sentinels = SentinelFiles::in_dir(&dir.path);
        let config = config_with_service("/no/such/binary-visionloop");
        let err = ServiceProcess::start(&config, sentinels).unwrap_err();
        assert!(err.to_string().contains("failed to launch"));
    }
}
