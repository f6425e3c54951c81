//! Microphone recording through arecord, downmixed with ffmpeg.
//!
//! The capture hardware only exposes a stereo front end, so recording is a
//! two-step: grab stereo S16_LE with arecord, then downmix to 16 kHz mono
//! for the recognizer. The intermediate stereo file never outlives a round.

use crate::config::AppConfig;
use crate::log_debug;
use anyhow::{bail, Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Channel count the hardware insists on for capture.
const RECORD_CHANNELS: u32 = 2;

pub struct Recorder {
    arecord_cmd: String,
    ffmpeg_cmd: String,
    device: String,
    seconds: u64,
    sample_rate: u32,
    work_dir: PathBuf,
}

impl Recorder {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            arecord_cmd: config.arecord_cmd.clone(),
            ffmpeg_cmd: config.ffmpeg_cmd.clone(),
            device: config.audio_device.clone(),
            seconds: config.record_secs,
            sample_rate: config.sample_rate,
            work_dir: std::env::temp_dir().join("visionloop_audio"),
        }
    }

    /// Record one clip and return the path of the mono WAV.
    pub fn record_mono(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.work_dir)
            .with_context(|| format!("failed to create {}", self.work_dir.display()))?;
        let stereo = self.work_dir.join("record_stereo.wav");
        let mono = self.work_dir.join("record_mono.wav");
        for stale in [&stereo, &mono] {
            remove_if_exists(stale)?;
        }

        let record = Command::new(&self.arecord_cmd)
            .args(["-D", &self.device])
            .args(["-d", &self.seconds.to_string()])
            .args(["-r", &self.sample_rate.to_string()])
            .args(["-c", &RECORD_CHANNELS.to_string()])
            .args(["-f", "S16_LE"])
            .arg(&stereo)
            .output()
            .with_context(|| format!("failed to run {}", self.arecord_cmd))?;
        if !record.status.success() {
            bail!(
                "{} failed on {}: {}",
                self.arecord_cmd,
                self.device,
                String::from_utf8_lossy(&record.stderr).trim()
            );
        }
        if !stereo.exists() {
            bail!("{} exited cleanly but produced no recording", self.arecord_cmd);
        }

        let convert = Command::new(&self.ffmpeg_cmd)
            .arg("-i")
            .arg(&stereo)
            .args(["-ac", "1"])
            .args(["-ar", &self.sample_rate.to_string()])
            .arg("-y")
            .arg(&mono)
            .output()
            .with_context(|| format!("failed to run {}", self.ffmpeg_cmd));
        let _ = fs::remove_file(&stereo);

        let convert = convert?;
        if !convert.status.success() {
            bail!(
                "{} downmix failed: {}",
                self.ffmpeg_cmd,
                String::from_utf8_lossy(&convert.stderr).trim()
            );
        }
        if !mono.exists() {
            bail!("{} exited cleanly but produced no mono file", self.ffmpeg_cmd);
        }

        log_debug(&format!("audio: recorded {}", mono.display()));
        Ok(mono)
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
    }
}
