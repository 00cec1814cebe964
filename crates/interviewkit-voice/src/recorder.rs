//! Microphone capture through an external recording command.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::process::{Child, Command};

use interviewkit_core::traits::{AudioClip, AudioRecorder};

use crate::error::VoiceError;
use crate::player::expand_args;

const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(3);

struct ActiveRecording {
    child: Child,
    // Kept alive until the clip has been read back.
    _dir: TempDir,
    path: PathBuf,
}

/// Runs a recorder command (e.g. `sox -d {file}`) that writes to a
/// temporary file until it is interrupted.
pub struct CommandRecorder {
    command: String,
    args: Vec<String>,
    format: String,
    stop_grace: Duration,
    active: Mutex<Option<ActiveRecording>>,
}

impl CommandRecorder {
    /// `format` is the file extension the recorder writes (e.g. "wav").
    pub fn new(command: impl Into<String>, args: Vec<String>, format: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args,
            format: format.into(),
            stop_grace: DEFAULT_STOP_GRACE,
            active: Mutex::new(None),
        }
    }

    /// How long to wait for the recorder to exit after an interrupt before
    /// killing it.
    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    fn mime_type(&self) -> String {
        match self.format.as_str() {
            "mp3" => "audio/mpeg".to_string(),
            other => format!("audio/{other}"),
        }
    }
}

/// Ask the recorder to finish cleanly so it can flush its file.
#[cfg(unix)]
async fn interrupt(child: &Child) {
    if let Some(pid) = child.id() {
        let _ = Command::new("kill")
            .arg("-INT")
            .arg(pid.to_string())
            .status()
            .await;
    }
}

#[cfg(not(unix))]
async fn interrupt(_child: &Child) {}

#[async_trait]
impl AudioRecorder for CommandRecorder {
    async fn start(&self) -> Result<()> {
        if self.active.lock().is_some() {
            return Err(VoiceError::Recording("already recording".into()).into());
        }
        let dir = TempDir::new().context("failed to create recording directory")?;
        let path = dir.path().join(format!("recording.{}", self.format));
        let file = path.to_string_lossy().into_owned();

        let child = Command::new(&self.command)
            .args(expand_args(&self.args, &file))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to start recorder '{}'", self.command))?;

        tracing::debug!("recorder '{}' writing to {}", self.command, path.display());
        *self.active.lock() = Some(ActiveRecording {
            child,
            _dir: dir,
            path,
        });
        Ok(())
    }

    async fn stop(&self) -> Result<AudioClip> {
        let Some(mut recording) = self.active.lock().take() else {
            return Err(VoiceError::Recording("not recording".into()).into());
        };

        interrupt(&recording.child).await;
        match tokio::time::timeout(self.stop_grace, recording.child.wait()).await {
            Ok(status) => {
                let status = status.context("failed to wait for recorder")?;
                tracing::debug!("recorder exited with {status}");
            }
            Err(_) => {
                tracing::warn!(
                    "recorder '{}' ignored interrupt, killing it",
                    self.command
                );
                recording
                    .child
                    .kill()
                    .await
                    .context("failed to kill recorder")?;
            }
        }

        let data = match tokio::fs::read(&recording.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read recording {}", recording.path.display())
                })
            }
        };
        Ok(AudioClip::new(data, self.mime_type()))
    }
}
