//! interviewkit-voice provides speech, transcription and audio collaborators.
//!
//! Implements the `Narrator`, `Transcriber` and `AudioRecorder` traits from
//! `interviewkit-core` on top of an OpenAI-compatible HTTP API and external
//! playback/recording commands, plus configuration loading.

pub mod config;
pub mod error;
pub mod mock;
pub mod openai;
pub mod player;
pub mod recorder;

pub use config::{
    create_narrator, create_recorder, create_transcriber, load_config, load_config_from,
    InterviewkitConfig, VoiceConfig,
};
pub use error::VoiceError;
