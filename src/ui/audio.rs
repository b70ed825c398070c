use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::timers::AlarmSound;

#[cfg(target_os = "macos")]
const DEFAULT_PLAYER: &str = "afplay";
#[cfg(target_os = "windows")]
const DEFAULT_PLAYER: &str = "cmd /C start \"\" /min";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const DEFAULT_PLAYER: &str = "paplay";

/// Plays alarm sound files through an external audio player
pub struct AlarmPlayer {
    sound_dir: PathBuf,
    program: String,
    args: Vec<String>,
}

impl AlarmPlayer {
    /// `command` is split with shell quoting rules; the sound path is appended
    pub fn new(sound_dir: PathBuf, command: Option<&str>) -> Self {
        let command = command.unwrap_or(DEFAULT_PLAYER);
        let mut parts = shlex::split(command).unwrap_or_default().into_iter();
        let program = parts.next().unwrap_or_else(|| DEFAULT_PLAYER.to_string());
        let args = parts.collect();

        info!("Alarm player: {} (sounds in {})", program, sound_dir.display());
        Self {
            sound_dir,
            program,
            args,
        }
    }

    /// Path of the file played for `alarm`
    pub fn sound_path(&self, alarm: AlarmSound) -> Option<PathBuf> {
        alarm.file_name().map(|file| self.sound_dir.join(file))
    }

    /// Start playback without waiting for it to finish
    pub fn play(&self, alarm: AlarmSound) {
        let Some(path) = self.sound_path(alarm) else {
            return;
        };

        if !path.exists() {
            warn!("Alarm sound {} not found", path.display());
            return;
        }

        debug!("Playing alarm {}", path.display());
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            .spawn();

        match spawned {
            Ok(mut child) => {
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if !status.success() => {
                            warn!("Alarm player exited with {}", status)
                        }
                        Err(e) => warn!("Alarm player failed: {}", e),
                        _ => {}
                    }
                });
            }
            Err(e) => warn!("Failed to start alarm player {}: {}", self.program, e),
        }
    }
}
