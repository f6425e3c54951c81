//! Vision loop entrypoint: start the inference service, wait until it is
//! ready, then capture, submit, and speak until interrupted. The service
//! handle cleans up the process and the sentinel files on every exit path,
//! including the error returns below.

use anyhow::{bail, Result};
use visionloop::capture::FrameCapture;
use visionloop::config::AppConfig;
use visionloop::interrupt::install_interrupt_handler;
use visionloop::ipc::{Readiness, ReadinessWatcher, SentinelFiles};
use visionloop::service::ServiceProcess;
use visionloop::speech::EspeakSpeaker;
use visionloop::{init_logging, init_tracing, log_debug, CycleController};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    init_tracing(&config);
    let interrupt = install_interrupt_handler();

    let sentinels = SentinelFiles::in_dir(&config.ipc_dir);
    let service = ServiceProcess::start(&config, sentinels.clone())?;
    eprintln!("inference service launched, waiting for readiness...");

    let watcher = ReadinessWatcher::new(service.lines(), &sentinels, config.ready_regex()?);
    match watcher.await_ready(config.ready_timeout(), interrupt) {
        Readiness::Ready(source) => {
            log_debug(&format!("main: service ready via {}", source.label()));
            eprintln!("service ready ({})", source.label());
        }
        Readiness::TimedOut => {
            bail!(
                "inference service did not become ready within {}s",
                config.ready_timeout_secs
            );
        }
        Readiness::Interrupted => {
            // An operator stop during startup is not a failure; take the
            // same teardown path as a normal exit.
            log_debug("main: interrupted during readiness wait");
            eprintln!("interrupted, shutting down");
            return Ok(());
        }
    }

    let mut capture = FrameCapture::from_config(&config);
    let mut speaker = EspeakSpeaker::from_config(&config);
    let mut controller = CycleController::from_config(&config);
    controller.run(&mut capture, &mut speaker, interrupt);

    eprintln!("interrupted, shutting down");
    Ok(())
}
