//! Mock collaborators for testing the controller without audio hardware or
//! network access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use interviewkit_core::traits::{AudioClip, AudioRecorder, Narrator, Transcriber};

use crate::error::VoiceError;
use crate::player::AudioPlayer;

/// A narrator that records what it was asked to say.
///
/// Optionally waits before completing, or fails every call.
#[derive(Default)]
pub struct MockNarrator {
    delay: Duration,
    fail: bool,
    call_count: AtomicU32,
    spoken: Mutex<Vec<String>>,
}

impl MockNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take `delay` to finish each narration.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Fail every narration.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Everything spoken so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

#[async_trait]
impl Narrator for MockNarrator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn speak(&self, text: &str) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.spoken.lock().push(text.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(VoiceError::Playback("mock narrator failure".into()).into());
        }
        Ok(())
    }
}

/// A transcriber returning scripted results in order, then a fixed default.
pub struct MockTranscriber {
    scripted: Mutex<VecDeque<Result<String, String>>>,
    default_text: String,
    delay: Duration,
    call_count: AtomicU32,
    last_clip: Mutex<Option<AudioClip>>,
}

impl MockTranscriber {
    /// Always transcribe to `text`.
    pub fn with_text(text: &str) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            default_text: text.to_string(),
            delay: Duration::ZERO,
            call_count: AtomicU32::new(0),
            last_clip: Mutex::new(None),
        }
    }

    /// Return `results` one per call (`Err` becomes a failure), then `""`.
    pub fn scripted(results: Vec<Result<String, String>>) -> Self {
        Self {
            scripted: Mutex::new(results.into()),
            ..Self::with_text("")
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_clip(&self) -> Option<AudioClip> {
        self.last_clip.lock().clone()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcribe(&self, clip: &AudioClip) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_clip.lock() = Some(clip.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.scripted.lock().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(VoiceError::ApiError {
                status: 500,
                message,
            }
            .into()),
            None => Ok(self.default_text.clone()),
        }
    }
}

/// A recorder that hands back a fixed clip.
pub struct MockRecorder {
    clip: AudioClip,
    fail_start: bool,
    starts: AtomicU32,
    stops: AtomicU32,
}

impl MockRecorder {
    pub fn new(clip: AudioClip) -> Self {
        Self {
            clip,
            fail_start: false,
            starts: AtomicU32::new(0),
            stops: AtomicU32::new(0),
        }
    }

    /// A recorder whose `start` always fails, like a denied microphone.
    pub fn denied() -> Self {
        Self {
            fail_start: true,
            ..Self::new(AudioClip::new(Vec::new(), "audio/wav"))
        }
    }

    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::Relaxed)
    }

    pub fn stops(&self) -> u32 {
        self.stops.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AudioRecorder for MockRecorder {
    async fn start(&self) -> anyhow::Result<()> {
        if self.fail_start {
            return Err(VoiceError::Recording("microphone access denied".into()).into());
        }
        self.starts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<AudioClip> {
        self.stops.fetch_add(1, Ordering::Relaxed);
        Ok(self.clip.clone())
    }
}

/// A player that keeps every clip it was given.
#[derive(Default)]
pub struct MockPlayer {
    played: Mutex<Vec<(Vec<u8>, String)>>,
}

impl MockPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(audio, extension)` pairs in playback order.
    pub fn played(&self) -> Vec<(Vec<u8>, String)> {
        self.played.lock().clone()
    }
}

#[async_trait]
impl AudioPlayer for MockPlayer {
    async fn play(&self, audio: &[u8], extension: &str) -> anyhow::Result<()> {
        self.played
            .lock()
            .push((audio.to_vec(), extension.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn narrator_records_calls() {
        let narrator = MockNarrator::new();
        narrator.speak("one").await.unwrap();
        narrator.speak("two").await.unwrap();
        assert_eq!(narrator.call_count(), 2);
        assert_eq!(narrator.spoken(), vec!["one", "two"]);

        let failing = MockNarrator::failing();
        assert!(failing.speak("x").await.is_err());
        assert_eq!(failing.spoken(), vec!["x"]);
    }

    #[tokio::test]
    async fn transcriber_scripted_then_default() {
        let transcriber =
            MockTranscriber::scripted(vec![Ok("first".into()), Err("upstream down".into())]);
        let clip = AudioClip::new(vec![9], "audio/wav");

        assert_eq!(transcriber.transcribe(&clip).await.unwrap(), "first");
        let err = transcriber.transcribe(&clip).await.unwrap_err();
        assert!(err.to_string().contains("upstream down"));
        assert_eq!(transcriber.transcribe(&clip).await.unwrap(), "");
        assert_eq!(transcriber.call_count(), 3);
        assert_eq!(transcriber.last_clip().unwrap().data, vec![9]);
    }

    #[tokio::test]
    async fn recorder_counts_and_denial() {
        let recorder = MockRecorder::new(AudioClip::new(vec![1, 2], "audio/wav"));
        recorder.start().await.unwrap();
        assert_eq!(recorder.stop().await.unwrap().data, vec![1, 2]);
        assert_eq!((recorder.starts(), recorder.stops()), (1, 1));

        let denied = MockRecorder::denied();
        let err = denied.start().await.unwrap_err();
        assert!(err.to_string().contains("denied"));
    }
}
