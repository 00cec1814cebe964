//! Interview session state and answer records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{PartialConfig, Question, Stage};
use crate::scoring::ScoreResult;

/// One scored submission. Created once per submitted answer, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// The question this answers.
    pub question_id: String,
    /// The submitted text, trimmed.
    pub answer: String,
    /// When the answer was submitted.
    pub submitted_at: DateTime<Utc>,
    /// Score in 0..=100.
    pub score: u32,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

impl AnswerRecord {
    pub fn new(
        question_id: impl Into<String>,
        answer: impl Into<String>,
        submitted_at: DateTime<Utc>,
        result: ScoreResult,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            answer: answer.into(),
            submitted_at,
            score: result.score,
            feedback: result.feedback,
            strengths: result.strengths,
            improvements: result.improvements,
        }
    }
}

/// Everything the controller knows about the current session.
///
/// Snapshots handed out by the controller are copies; the live state is only
/// mutated by the controller itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Changes on every reset.
    pub id: Uuid,
    pub stage: Stage,
    /// Role, level and duration chosen so far.
    pub setup: PartialConfig,
    /// Questions for the selected role, fixed when the interview starts.
    pub questions: Vec<Question>,
    /// 0-based index into `questions`.
    pub current_index: usize,
    /// Seconds counted since the first question was narrated.
    pub elapsed_seconds: u64,
    /// Gates `elapsed_seconds`.
    pub timer_started: bool,
    /// Append-only log of scored answers.
    pub answers: Vec<AnswerRecord>,
    /// Answer text typed or transcribed but not yet submitted.
    pub pending_answer: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: Stage::Setup,
            setup: PartialConfig::default(),
            questions: Vec::new(),
            current_index: 0,
            elapsed_seconds: 0,
            timer_started: false,
            answers: Vec::new(),
            pending_answer: String::new(),
        }
    }
}

impl SessionState {
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    /// Progress through the question list as a percentage.
    pub fn progress_percent(&self) -> f64 {
        if self.questions.is_empty() {
            0.0
        } else {
            (self.current_index + 1) as f64 / self.questions.len() as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Difficulty};

    fn q(id: &str) -> Question {
        Question {
            id: id.into(),
            category: Category::Technical,
            prompt: "p".into(),
            difficulty: Difficulty::Easy,
            hints: vec![],
            expected_keywords: vec![],
            follow_up: None,
        }
    }

    #[test]
    fn fresh_state_is_setup() {
        let state = SessionState::default();
        assert_eq!(state.stage, Stage::Setup);
        assert!(state.answers.is_empty());
        assert!(state.current_question().is_none());
        assert_eq!(state.progress_percent(), 0.0);
        assert_ne!(state.id, SessionState::default().id);
    }

    #[test]
    fn progress_and_last_question() {
        let mut state = SessionState {
            questions: vec![q("a"), q("b"), q("c"), q("d")],
            ..Default::default()
        };
        assert_eq!(state.progress_percent(), 25.0);
        assert!(!state.is_last_question());
        state.current_index = 3;
        assert!(state.is_last_question());
        assert_eq!(state.current_question().unwrap().id, "d");
    }
}
