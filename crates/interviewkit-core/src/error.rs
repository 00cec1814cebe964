//! Error and rejection types.
//!
//! `CollaboratorError` covers failures of the narration, transcription and
//! recording collaborators. It lives in `interviewkit-core` so the controller
//! can downcast and classify failures without string matching.
//!
//! `Rejection` is not a failure: it explains why an operation was a no-op.

use thiserror::Error;

/// Failure of an external collaborator (speech, transcription, recording).
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The operation did not complete in time.
    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// The collaborator is not configured or not reachable.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The collaborator ran and reported a failure.
    #[error("failed: {0}")]
    Failed(String),
}

impl CollaboratorError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CollaboratorError::Timeout(_))
    }
}

/// Why a controller operation was rejected without changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The pending answer is empty or whitespace.
    #[error("answer is empty")]
    EmptyAnswer,

    /// An answer for the current question is still being graded.
    #[error("an answer is already being graded")]
    GradingInFlight,

    /// The session is not in the interview stage.
    #[error("no interview in progress")]
    NotInterviewing,

    /// Already at the first question.
    #[error("already at the first question")]
    AtFirstQuestion,

    /// Role, level or duration has not been chosen.
    #[error("role, level and duration must all be selected")]
    IncompleteSetup,

    /// The operation is not valid in the current stage.
    #[error("not allowed in the current stage")]
    WrongStage,

    /// A recording is already running.
    #[error("already recording")]
    RecordingActive,

    /// No recording is running.
    #[error("not recording")]
    NotRecording,

    /// The question bank has nothing for the selected role.
    #[error("no questions available for the selected role")]
    NoQuestions,
}

/// Outcome of a failed voice-input operation.
///
/// Either the controller refused the call, or the recorder/transcriber
/// failed. In both cases the pending answer is left untouched.
#[derive(Debug, Error)]
pub enum VoiceInputError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("voice input failed: {0:#}")]
    Failed(anyhow::Error),
}

impl VoiceInputError {
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            VoiceInputError::Rejected(r) => Some(*r),
            VoiceInputError::Failed(_) => None,
        }
    }
}
