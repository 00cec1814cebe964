//! OpenAI-compatible speech synthesis and transcription.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use interviewkit_core::traits::{AudioClip, Narrator, Transcriber};

use crate::error::VoiceError;
use crate::player::AudioPlayer;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
/// Per-request timeout for speech synthesis.
pub const SPEECH_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Per-request timeout for transcription uploads.
pub const TRANSCRIPTION_REQUEST_TIMEOUT: Duration = Duration::from_secs(25);
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BASE: Duration = Duration::from_secs(1);
const SPEECH_FORMAT: &str = "mp3";

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

fn send_error(e: reqwest::Error, timeout: Duration) -> VoiceError {
    if e.is_timeout() {
        VoiceError::Timeout(timeout.as_millis() as u64)
    } else {
        VoiceError::NetworkError(e.to_string())
    }
}

/// Map a non-success response to a `VoiceError`.
async fn status_error(response: reqwest::Response) -> VoiceError {
    let status = response.status().as_u16();
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1)
            * 1000;
        return VoiceError::RateLimited {
            retry_after_ms: retry_after,
        };
    }
    let body = response.text().await.unwrap_or_default();
    if status == 401 {
        return VoiceError::AuthenticationFailed(body);
    }
    VoiceError::ApiError {
        status,
        message: body,
    }
}

// ---------------------------------------------------------------------------
// Narrator
// ---------------------------------------------------------------------------

/// Text-to-speech through `/v1/audio/speech`, played with an [`AudioPlayer`].
pub struct OpenAiNarrator {
    api_key: String,
    base_url: String,
    model: String,
    voice: String,
    speed: f64,
    max_retries: u32,
    retry_base: Duration,
    request_timeout: Duration,
    player: Arc<dyn AudioPlayer>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    speed: f64,
    response_format: &'a str,
}

impl OpenAiNarrator {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        model: &str,
        voice: &str,
        speed: f64,
        player: Arc<dyn AudioPlayer>,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.to_string(),
            voice: voice.to_string(),
            speed,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base: DEFAULT_RETRY_BASE,
            request_timeout: SPEECH_REQUEST_TIMEOUT,
            player,
            client: http_client(SPEECH_REQUEST_TIMEOUT)?,
        })
    }

    /// Replace the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = http_client(timeout)?;
        self.request_timeout = timeout;
        Ok(self)
    }

    /// Retry retryable failures up to `max_retries` times, waiting
    /// `base`, `2 * base`, `4 * base`, ... between attempts.
    pub fn with_retry_policy(mut self, max_retries: u32, base: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_base = base;
        self
    }

    /// Longest time synthesis can take before giving up: every attempt
    /// running into the request timeout, plus the backoff between them.
    /// Playback comes on top of this, and a narration timeout must cover both.
    pub fn synthesis_budget(&self) -> Duration {
        let attempts = self.max_retries + 1;
        let backoff: Duration = (0..self.max_retries)
            .map(|n| self.retry_base * 2u32.pow(n))
            .sum();
        self.request_timeout * attempts + backoff
    }

    /// Synthesize `text` once, returning the encoded audio.
    #[instrument(skip(self, text), fields(model = %self.model, voice = %self.voice, chars = text.len()))]
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        let body = SpeechRequest {
            model: &self.model,
            voice: &self.voice,
            input: text,
            speed: self.speed,
            response_format: SPEECH_FORMAT,
        };

        let response = self
            .client
            .post(format!("{}/v1/audio/speech", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, self.request_timeout))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let audio = response
            .bytes()
            .await
            .map_err(|e| send_error(e, self.request_timeout))?;
        Ok(audio.to_vec())
    }

    async fn synthesize_with_retry(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        let mut attempt = 0u32;
        loop {
            match self.synthesize(text).await {
                Ok(audio) => return Ok(audio),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.retry_base * 2u32.pow(attempt);
                    attempt += 1;
                    tracing::warn!(
                        "speech request failed ({e}), retry {attempt}/{} in {}ms",
                        self.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Narrator for OpenAiNarrator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn speak(&self, text: &str) -> anyhow::Result<()> {
        let audio = self.synthesize_with_retry(text).await?;
        self.player.play(&audio, SPEECH_FORMAT).await
    }
}

// ---------------------------------------------------------------------------
// Transcriber
// ---------------------------------------------------------------------------

/// Speech-to-text through `/v1/audio/transcriptions`.
pub struct OpenAiTranscriber {
    api_key: String,
    base_url: String,
    model: String,
    request_timeout: Duration,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiTranscriber {
    pub fn new(api_key: &str, base_url: Option<String>, model: &str) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.to_string(),
            request_timeout: TRANSCRIPTION_REQUEST_TIMEOUT,
            client: http_client(TRANSCRIPTION_REQUEST_TIMEOUT)?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, clip), fields(model = %self.model, bytes = clip.data.len()))]
    async fn transcribe(&self, clip: &AudioClip) -> anyhow::Result<String> {
        let file = reqwest::multipart::Part::bytes(clip.data.clone())
            .file_name(format!("recording.{}", clip.extension()))
            .mime_str(&clip.mime_type)
            .with_context(|| format!("invalid audio MIME type '{}'", clip.mime_type))?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("model", self.model.clone());

        let response = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| send_error(e, self.request_timeout))?;

        if !response.status().is_success() {
            return Err(status_error(response).await.into());
        }

        let parsed: TranscriptionResponse =
            response.json().await.map_err(|e| VoiceError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;
        Ok(parsed.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPlayer;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn narrator(server: &MockServer, player: Arc<MockPlayer>) -> OpenAiNarrator {
        OpenAiNarrator::new("test-key", Some(server.uri()), "tts-1-hd", "alloy", 1.15, player)
            .unwrap()
            .with_retry_policy(3, Duration::from_millis(5))
    }

    #[tokio::test]
    async fn speak_synthesizes_and_plays() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_json(serde_json::json!({
                "model": "tts-1-hd",
                "voice": "alloy",
                "input": "Hello there",
                "speed": 1.15,
                "response_format": "mp3"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3fake".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let player = Arc::new(MockPlayer::new());
        narrator(&server, player.clone())
            .speak("Hello there")
            .await
            .unwrap();

        let played = player.played();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].0, b"ID3fake");
        assert_eq!(played[0].1, "mp3");
    }

    #[tokio::test]
    async fn speak_retries_server_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .with_priority(2)
            .mount(&server)
            .await;

        let player = Arc::new(MockPlayer::new());
        narrator(&server, player.clone()).speak("retry me").await.unwrap();
        assert_eq!(player.played().len(), 1);
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn speak_gives_up_after_max_retries() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let player = Arc::new(MockPlayer::new());
        let err = narrator(&server, player.clone())
            .speak("busy")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("rate limited"));
        // One attempt plus three retries.
        assert_eq!(server.received_requests().await.unwrap().len(), 4);
        assert!(player.played().is_empty());
    }

    #[test]
    fn synthesis_budget_counts_every_attempt_and_backoff() {
        let player = Arc::new(MockPlayer::new());
        let narrator = OpenAiNarrator::new("k", None, "tts-1", "alloy", 1.0, player).unwrap();
        // Three attempts at 15s plus 1s and 2s of backoff.
        assert_eq!(narrator.synthesis_budget(), Duration::from_secs(48));

        let narrator = narrator.with_retry_policy(0, Duration::from_secs(1));
        assert_eq!(narrator.synthesis_budget(), SPEECH_REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn slow_speech_response_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"late".to_vec())
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let player = Arc::new(MockPlayer::new());
        let err = narrator(&server, player.clone())
            .with_request_timeout(Duration::from_millis(50))
            .unwrap()
            .speak("too slow")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VoiceError>(),
            Some(VoiceError::Timeout(50))
        ));
        // Timeouts are not retried.
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
        assert!(player.played().is_empty());
    }

    #[tokio::test]
    async fn auth_failure_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = narrator(&server, Arc::new(MockPlayer::new()))
            .speak("hi")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VoiceError>(),
            Some(VoiceError::AuthenticationFailed(body)) if body == "bad key"
        ));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transcribe_uploads_multipart() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_string_contains("whisper-1"))
            .and(body_string_contains("recording.wav"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"text": "I would use a hash map"})),
            )
            .mount(&server)
            .await;

        let transcriber =
            OpenAiTranscriber::new("test-key", Some(server.uri()), "whisper-1").unwrap();
        let clip = AudioClip::new(b"RIFF....WAVE".to_vec(), "audio/wav");
        let text = transcriber.transcribe(&clip).await.unwrap();
        assert_eq!(text, "I would use a hash map");
    }

    #[tokio::test]
    async fn transcribe_error_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let transcriber = OpenAiTranscriber::new("key", Some(server.uri()), "whisper-1").unwrap();
        let clip = AudioClip::new(vec![0; 16], "audio/webm");
        let err = transcriber.transcribe(&clip).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
