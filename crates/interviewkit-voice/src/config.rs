//! Configuration loading and collaborator factories.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use interviewkit_core::controller::ControllerConfig;
use interviewkit_core::traits::{AudioRecorder, Narrator, SilentNarrator, Transcriber};

use crate::openai::{OpenAiNarrator, OpenAiTranscriber, DEFAULT_BASE_URL};
use crate::player::{AudioPlayer, CommandPlayer, NullPlayer};
use crate::recorder::CommandRecorder;

/// Voices accepted by the speech endpoint.
pub const VOICES: [&str; 6] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

/// Environment variable that overrides `voice.api_key`.
pub const API_KEY_ENV: &str = "INTERVIEWKIT_OPENAI_KEY";

/// An external command with a `{file}` placeholder in its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Speech settings.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Supports `${VAR}` references.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    #[serde(default = "default_player")]
    pub player: CommandSpec,
    #[serde(default = "default_recorder")]
    pub recorder: CommandSpec,
    /// File format the recorder writes.
    #[serde(default = "default_recording_format")]
    pub recording_format: String,
}

impl std::fmt::Debug for VoiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.api_key.is_empty() { "" } else { "***" };
        f.debug_struct("VoiceConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &key)
            .field("base_url", &self.base_url)
            .field("voice", &self.voice)
            .field("tts_model", &self.tts_model)
            .field("speed", &self.speed)
            .field("transcription_model", &self.transcription_model)
            .field("player", &self.player)
            .field("recorder", &self.recorder)
            .field("recording_format", &self.recording_format)
            .finish()
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            base_url: default_base_url(),
            voice: default_voice(),
            tts_model: default_tts_model(),
            speed: default_speed(),
            transcription_model: default_transcription_model(),
            player: default_player(),
            recorder: default_recorder(),
            recording_format: default_recording_format(),
        }
    }
}

impl VoiceConfig {
    /// Whether an API key is available for the HTTP collaborators.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if !VOICES.contains(&self.voice.as_str()) {
            anyhow::bail!(
                "unknown voice '{}' (expected one of: {})",
                self.voice,
                VOICES.join(", ")
            );
        }
        if !(0.25..=4.0).contains(&self.speed) {
            anyhow::bail!("voice speed must be between 0.25 and 4.0, got {}", self.speed);
        }
        Ok(())
    }
}

/// Daily usage limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
        }
    }
}

/// Presentation delays and collaborator timeouts, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_intro_settle")]
    pub intro_settle_ms: u64,
    #[serde(default = "default_feedback_settle")]
    pub feedback_settle_ms: u64,
    #[serde(default = "default_first_question_delay")]
    pub first_question_delay_ms: u64,
    #[serde(default = "default_next_question_delay")]
    pub next_question_delay_ms: u64,
    /// Caps one whole narration: synthesis with its retries, then playback.
    #[serde(default = "default_narration_timeout")]
    pub narration_timeout_ms: u64,
    #[serde(default = "default_transcription_timeout")]
    pub transcription_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            intro_settle_ms: default_intro_settle(),
            feedback_settle_ms: default_feedback_settle(),
            first_question_delay_ms: default_first_question_delay(),
            next_question_delay_ms: default_next_question_delay(),
            narration_timeout_ms: default_narration_timeout(),
            transcription_timeout_ms: default_transcription_timeout(),
        }
    }
}

/// Top-level interviewkit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewkitConfig {
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    /// Where the daily interview count is kept.
    #[serde(default = "default_usage_file")]
    pub usage_file: PathBuf,
    /// TOML question bank file or directory; the built-in bank when unset.
    #[serde(default)]
    pub question_bank: Option<PathBuf>,
}

impl Default for InterviewkitConfig {
    fn default() -> Self {
        Self {
            voice: VoiceConfig::default(),
            limits: LimitsConfig::default(),
            timing: TimingConfig::default(),
            usage_file: default_usage_file(),
            question_bank: None,
        }
    }
}

impl InterviewkitConfig {
    /// Controller settings derived from `[limits]`, `[timing]` and `voice.enabled`.
    pub fn controller_config(&self) -> ControllerConfig {
        let t = &self.timing;
        ControllerConfig {
            daily_limit: self.limits.daily_limit,
            voice_enabled: self.voice.enabled,
            intro_settle: Duration::from_millis(t.intro_settle_ms),
            feedback_settle: Duration::from_millis(t.feedback_settle_ms),
            first_question_delay: Duration::from_millis(t.first_question_delay_ms),
            next_question_delay: Duration::from_millis(t.next_question_delay_ms),
            narration_timeout: Duration::from_millis(t.narration_timeout_ms),
            transcription_timeout: Duration::from_millis(t.transcription_timeout_ms),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_voice() -> String {
    "alloy".to_string()
}
fn default_tts_model() -> String {
    "tts-1-hd".to_string()
}
fn default_speed() -> f64 {
    1.15
}
fn default_transcription_model() -> String {
    "whisper-1".to_string()
}
fn default_player() -> CommandSpec {
    if cfg!(target_os = "macos") {
        CommandSpec {
            command: "afplay".into(),
            args: vec!["{file}".into()],
        }
    } else {
        CommandSpec {
            command: "ffplay".into(),
            args: vec![
                "-nodisp".into(),
                "-autoexit".into(),
                "-loglevel".into(),
                "quiet".into(),
                "{file}".into(),
            ],
        }
    }
}
fn default_recorder() -> CommandSpec {
    CommandSpec {
        command: "sox".into(),
        args: vec![
            "-q".into(),
            "-d".into(),
            "-c".into(),
            "1".into(),
            "-r".into(),
            "16000".into(),
            "{file}".into(),
        ],
    }
}
fn default_recording_format() -> String {
    "wav".to_string()
}
fn default_daily_limit() -> u32 {
    3
}
fn default_intro_settle() -> u64 {
    2000
}
fn default_feedback_settle() -> u64 {
    2000
}
fn default_first_question_delay() -> u64 {
    4000
}
fn default_next_question_delay() -> u64 {
    500
}
fn default_narration_timeout() -> u64 {
    90_000
}
fn default_transcription_timeout() -> u64 {
    30_000
}
fn default_usage_file() -> PathBuf {
    dirs_path()
        .map(|d| d.join("usage.json"))
        .unwrap_or_else(|| PathBuf::from(".interviewkit-usage.json"))
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `interviewkit.toml` in the current directory
/// 2. `~/.config/interviewkit/config.toml`
///
/// Environment variable override: `INTERVIEWKIT_OPENAI_KEY`.
pub fn load_config() -> Result<InterviewkitConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<InterviewkitConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("interviewkit.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => InterviewkitConfig::default(),
    };

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        config.voice.api_key = key;
    }
    config.voice.api_key = resolve_env_vars(&config.voice.api_key);
    config.voice.base_url = resolve_env_vars(&config.voice.base_url);

    if config.voice.enabled && !config.voice.has_api_key() {
        tracing::warn!("no OpenAI API key configured; voice disabled (set {API_KEY_ENV})");
        config.voice.enabled = false;
    }

    Ok(config)
}

/// Parse and validate a configuration document.
pub fn parse_config(content: &str) -> Result<InterviewkitConfig> {
    let config: InterviewkitConfig = toml::from_str(content)?;
    config.voice.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("interviewkit"))
}

/// Create the narrator for a voice configuration.
///
/// Falls back to a silent narrator when voice is disabled or no key is set.
pub fn create_narrator(config: &VoiceConfig) -> Result<Arc<dyn Narrator>> {
    if !config.enabled || !config.has_api_key() {
        return Ok(Arc::new(SilentNarrator));
    }
    let player = create_player(config);
    Ok(Arc::new(OpenAiNarrator::new(
        &config.api_key,
        Some(config.base_url.clone()),
        &config.tts_model,
        &config.voice,
        config.speed,
        player,
    )?))
}

/// Create the transcriber, if an API key is available.
pub fn create_transcriber(config: &VoiceConfig) -> Result<Option<Arc<dyn Transcriber>>> {
    if !config.has_api_key() {
        return Ok(None);
    }
    Ok(Some(Arc::new(OpenAiTranscriber::new(
        &config.api_key,
        Some(config.base_url.clone()),
        &config.transcription_model,
    )?)))
}

/// Create the recorder, if a recorder command is configured.
pub fn create_recorder(config: &VoiceConfig) -> Option<Arc<dyn AudioRecorder>> {
    if config.recorder.command.trim().is_empty() {
        return None;
    }
    Some(Arc::new(CommandRecorder::new(
        config.recorder.command.clone(),
        config.recorder.args.clone(),
        config.recording_format.clone(),
    )))
}

fn create_player(config: &VoiceConfig) -> Arc<dyn AudioPlayer> {
    if config.player.command.trim().is_empty() {
        Arc::new(NullPlayer)
    } else {
        Arc::new(CommandPlayer::new(
            config.player.command.clone(),
            config.player.args.clone(),
        ))
    }
}
