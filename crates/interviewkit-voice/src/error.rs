//! Voice collaborator error types.

use thiserror::Error;

/// Errors from the speech, transcription and audio collaborators.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The audio player failed.
    #[error("playback failed: {0}")]
    Playback(String),

    /// The audio recorder failed.
    #[error("recording failed: {0}")]
    Recording(String),
}

impl VoiceError {
    /// Whether the request may succeed if sent again (429 and 5xx).
    pub fn is_retryable(&self) -> bool {
        match self {
            VoiceError::RateLimited { .. } => true,
            VoiceError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
