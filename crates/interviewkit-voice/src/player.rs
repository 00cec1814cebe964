//! Audio playback through an external command.

use std::io::Write;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use crate::error::VoiceError;

/// Placeholder replaced with the audio file path in command arguments.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Plays encoded audio, resolving when playback has finished.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, audio: &[u8], extension: &str) -> Result<()>;
}

/// Discards audio.
pub struct NullPlayer;

#[async_trait]
impl AudioPlayer for NullPlayer {
    async fn play(&self, _audio: &[u8], _extension: &str) -> Result<()> {
        Ok(())
    }
}

/// Substitute `{file}` in `args`, appending the path if no argument
/// mentions it.
pub fn expand_args(args: &[String], file: &str) -> Vec<String> {
    let mut expanded: Vec<String> = args
        .iter()
        .map(|a| a.replace(FILE_PLACEHOLDER, file))
        .collect();
    if !args.iter().any(|a| a.contains(FILE_PLACEHOLDER)) {
        expanded.push(file.to_string());
    }
    expanded
}

/// Writes audio to a temporary file and runs a player command on it.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    command: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, audio: &[u8], extension: &str) -> Result<()> {
        let mut file = tempfile::Builder::new()
            .prefix("interviewkit-")
            .suffix(&format!(".{extension}"))
            .tempfile()
            .context("failed to create temp audio file")?;
        file.write_all(audio)
            .context("failed to write temp audio file")?;
        file.flush()?;

        let path = file.path().to_string_lossy().into_owned();
        // Dropping this future (narration timeout, shutdown) must stop the audio.
        let mut child = Command::new(&self.command)
            .args(expand_args(&self.args, &path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to run audio player '{}'", self.command))?;
        let status = child
            .wait()
            .await
            .with_context(|| format!("failed to wait for audio player '{}'", self.command))?;

        if !status.success() {
            return Err(VoiceError::Playback(format!("'{}' exited with {status}", self.command)).into());
        }
        Ok(())
    }
}
