//! Collaborator trait definitions.
//!
//! The controller talks to speech synthesis, transcription, audio capture,
//! the daily usage counter and the clock only through these traits. The
//! `interviewkit-voice` crate provides HTTP and process-backed
//! implementations.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Narration and transcription
// ---------------------------------------------------------------------------

/// Speaks text aloud.
///
/// `speak` resolves once narration has finished playing. An `Err` is the
/// "failed" signal; the controller logs it and carries on.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Human-readable narrator name (e.g. "openai").
    fn name(&self) -> &str;

    /// Speak `text`, resolving when playback completes.
    async fn speak(&self, text: &str) -> anyhow::Result<()>;
}

/// A narrator that says nothing and completes immediately.
pub struct SilentNarrator;

#[async_trait]
impl Narrator for SilentNarrator {
    fn name(&self) -> &str {
        "silent"
    }

    async fn speak(&self, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Captured audio waiting to be transcribed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioClip {
    /// Encoded audio bytes.
    pub data: Vec<u8>,
    /// MIME type (e.g. "audio/wav").
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// File extension for the MIME type, used when uploading.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/ogg" => "ogg",
            "audio/flac" => "flac",
            "audio/mp4" | "audio/m4a" => "m4a",
            _ => "webm",
        }
    }
}

/// Converts recorded speech to text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &str;

    async fn transcribe(&self, clip: &AudioClip) -> anyhow::Result<String>;
}

/// Captures audio from a microphone or similar source.
///
/// The controller guarantees `start` and `stop` alternate.
#[async_trait]
pub trait AudioRecorder: Send + Sync {
    async fn start(&self) -> anyhow::Result<()>;

    async fn stop(&self) -> anyhow::Result<AudioClip>;
}

// ---------------------------------------------------------------------------
// Usage counter and clock
// ---------------------------------------------------------------------------

/// Counts interviews started per calendar day.
///
/// Counts for a date never decrease; an unseen date reads as zero.
pub trait UsageStore: Send + Sync {
    /// Interviews started on `date_key` so far.
    fn get(&self, date_key: &str) -> anyhow::Result<u32>;

    /// Record one more interview on `date_key`, returning the new count.
    fn increment(&self, date_key: &str) -> anyhow::Result<u32>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at one instant, for tests and replays.
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Usage-store key for a date (`YYYY-MM-DD`).
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_key_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(date_key(date), "2026-03-07");
    }

    #[test]
    fn fixed_clock_today() {
        let now = Local.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let clock = FixedClock(now);
        assert_eq!(date_key(clock.today()), "2026-10-18");
    }

    #[test]
    fn clip_extension() {
        assert_eq!(AudioClip::new(vec![1], "audio/wav").extension(), "wav");
        assert_eq!(AudioClip::new(vec![], "audio/webm").extension(), "webm");
        assert!(AudioClip::new(vec![], "audio/webm").is_empty());
    }

    #[tokio::test]
    async fn silent_narrator_completes() {
        SilentNarrator.speak("hello").await.unwrap();
        assert_eq!(SilentNarrator.name(), "silent");
    }
}
