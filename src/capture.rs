//! Single-frame camera capture via ffmpeg's V4L2 input.

use crate::config::AppConfig;
use crate::cycle::{sleep_interruptible, CaptureSource};
use crate::interrupt;
use crate::log_debug;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Grabs one JPEG per cycle from a V4L2 device.
pub struct FrameCapture {
    ffmpeg_cmd: String,
    device: String,
    output_dir: PathBuf,
    warmup: Duration,
    interrupt: &'static AtomicBool,
}

impl FrameCapture {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            ffmpeg_cmd: config.ffmpeg_cmd.clone(),
            device: config.camera_device.clone(),
            output_dir: config.capture_dir(),
            warmup: config.camera_warmup(),
            interrupt: interrupt::flag(),
        }
    }

    fn grab_frame(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("failed to create capture dir {}", self.output_dir.display())
        })?;

        // Cheap sensors need a moment after the device opens; without this
        // the first frame comes back dark or torn. The wait is sliced so an
        // operator stop is not held up behind it.
        if !self.warmup.is_zero() && !sleep_interruptible(self.warmup, self.interrupt) {
            bail!("camera warm-up interrupted");
        }

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let frame_path = self.output_dir.join(format!("capture_{stamp}.jpg"));

        let output = Command::new(&self.ffmpeg_cmd)
            .args(["-f", "v4l2", "-i", &self.device, "-frames:v", "1", "-y"])
            .arg(&frame_path)
            .output()
            .with_context(|| format!("failed to run {}", self.ffmpeg_cmd))?;

        if !output.status.success() {
            bail!(
                "frame grab from {} failed: {}",
                self.device,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        if !frame_path.exists() {
            bail!(
                "{} reported success but wrote no frame to {}",
                self.ffmpeg_cmd,
                frame_path.display()
            );
        }

        log_debug(&format!("capture: saved frame {}", frame_path.display()));
        Ok(frame_path)
    }
}

impl CaptureSource for FrameCapture {
    fn capture(&mut self) -> Result<PathBuf> {
        self.grab_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn capture_with(ffmpeg: &str) -> FrameCapture {
        let config = AppConfig::parse_from([
            "visionloop",
            "--ffmpeg-cmd",
            ffmpeg,
            "--camera-warmup-ms",
            "0",
        ]);
        FrameCapture::from_config(&config)
    }

    #[test]
    fn missing_ffmpeg_is_an_error() {
        let mut capture = capture_with("/no/such/ffmpeg-visionloop");
        let err = capture.capture().unwrap_err();
        assert!(err.to_string().contains("failed to run"));
    }

    #[cfg(unix)]
    #[test]
    fn tool_exiting_zero_without_output_is_an_error() {
        // `true` swallows the arguments and writes nothing.
        let mut capture = capture_with("true");
        let err = capture.capture().unwrap_err();
        assert!(err.to_string().contains("wrote no frame"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_surfaces_its_stderr_status() {
        let mut capture = capture_with("false");
        let err = capture.capture().unwrap_err();
        assert!(err.to_string().contains("frame grab"));
    }

    #[test]
    fn warmup_wait_observes_the_stop_flag() {
        let mut capture = capture_with("/no/such/ffmpeg-visionloop");
        capture.warmup = Duration::from_secs(10);
        capture.interrupt = Box::leak(Box::new(AtomicBool::new(true)));

        let started = std::time::Instant::now();
        let err = capture.capture().unwrap_err();

        assert!(err.to_string().contains("warm-up interrupted"));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
