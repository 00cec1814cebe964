//! Session-level aggregates: overall score, per-category averages, summary
//! rendering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Category, Question};
use crate::session::{AnswerRecord, SessionState};

/// Score at or above which an answer counts as excellent.
pub const EXCELLENT_THRESHOLD: u32 = 85;
/// Score at or above which an answer counts as good.
pub const GOOD_THRESHOLD: u32 = 70;

/// Overall session score: the rounded mean of all answer scores, 0 if none.
pub fn overall_score(answers: &[AnswerRecord]) -> u32 {
    if answers.is_empty() {
        return 0;
    }
    let sum: u32 = answers.iter().map(|a| a.score).sum();
    (sum as f64 / answers.len() as f64).round() as u32
}

/// Format seconds as `MM:SS`. Minutes are not wrapped at 60.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Coarse quality band for a single answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Band {
    Excellent,
    Good,
    NeedsWork,
}

impl Band {
    pub fn for_score(score: u32) -> Self {
        match score {
            s if s >= EXCELLENT_THRESHOLD => Band::Excellent,
            s if s >= GOOD_THRESHOLD => Band::Good,
            _ => Band::NeedsWork,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Excellent => "excellent",
            Band::Good => "good",
            Band::NeedsWork => "needs-work",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSummary {
    pub question_id: String,
    /// The question prompt, if the question is still known.
    pub prompt: Option<String>,
    pub category: Option<Category>,
    pub score: u32,
    pub band: Band,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

/// End-of-session report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub overall_score: u32,
    pub answered: usize,
    pub total_questions: usize,
    /// Answers scoring at or above [`EXCELLENT_THRESHOLD`].
    pub excellent: usize,
    pub elapsed_seconds: u64,
    pub per_category: BTreeMap<Category, u32>,
    pub answers: Vec<AnswerSummary>,
}

impl SessionSummary {
    pub fn from_state(state: &SessionState) -> Self {
        Self::build(&state.answers, &state.questions, state.elapsed_seconds)
    }

    pub fn build(answers: &[AnswerRecord], questions: &[Question], elapsed_seconds: u64) -> Self {
        let find = |id: &str| questions.iter().find(|q| q.id == id);

        let mut by_category: BTreeMap<Category, Vec<u32>> = BTreeMap::new();
        let rows: Vec<AnswerSummary> = answers
            .iter()
            .map(|a| {
                let question = find(&a.question_id);
                if let Some(q) = question {
                    by_category.entry(q.category).or_default().push(a.score);
                }
                AnswerSummary {
                    question_id: a.question_id.clone(),
                    prompt: question.map(|q| q.prompt.clone()),
                    category: question.map(|q| q.category),
                    score: a.score,
                    band: Band::for_score(a.score),
                    feedback: a.feedback.clone(),
                    strengths: a.strengths.clone(),
                    improvements: a.improvements.clone(),
                }
            })
            .collect();

        let per_category = by_category
            .into_iter()
            .map(|(cat, scores)| {
                let avg = scores.iter().sum::<u32>() as f64 / scores.len() as f64;
                (cat, avg.round() as u32)
            })
            .collect();

        Self {
            overall_score: overall_score(answers),
            answered: answers.len(),
            total_questions: questions.len(),
            excellent: answers
                .iter()
                .filter(|a| a.score >= EXCELLENT_THRESHOLD)
                .count(),
            elapsed_seconds,
            per_category,
            answers: rows,
        }
    }

    pub fn elapsed(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }

    /// Render the summary as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("# Interview Summary\n\n");
        md.push_str(&format!("- **Overall score:** {}%\n", self.overall_score));
        md.push_str(&format!(
            "- **Questions answered:** {}/{}\n",
            self.answered, self.total_questions
        ));
        md.push_str(&format!("- **Excellent answers:** {}\n", self.excellent));
        md.push_str(&format!("- **Time:** {}\n\n", self.elapsed()));

        if !self.per_category.is_empty() {
            md.push_str("## By Category\n\n");
            md.push_str("| Category | Average |\n|----------|---------|\n");
            for (cat, avg) in &self.per_category {
                md.push_str(&format!("| {cat} | {avg}% |\n"));
            }
            md.push('\n');
        }

        md.push_str("## Answers\n\n");
        for (i, row) in self.answers.iter().enumerate() {
            let title = row.prompt.as_deref().unwrap_or(&row.question_id);
            md.push_str(&format!(
                "### {}. {} ({}%, {})\n\n",
                i + 1,
                title,
                row.score,
                row.band
            ));
            md.push_str(&format!("{}\n\n", row.feedback));
            for s in &row.strengths {
                md.push_str(&format!("- ✓ {s}\n"));
            }
            for s in &row.improvements {
                md.push_str(&format!("- → {s}\n"));
            }
            if !row.strengths.is_empty() || !row.improvements.is_empty() {
                md.push('\n');
            }
        }
        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use chrono::Utc;

    fn record(id: &str, score: u32) -> AnswerRecord {
        AnswerRecord {
            question_id: id.into(),
            answer: "a".into(),
            submitted_at: Utc::now(),
            score,
            feedback: "fb".into(),
            strengths: vec!["clear".into()],
            improvements: vec![],
        }
    }

    fn question(id: &str, category: Category) -> Question {
        Question {
            id: id.into(),
            category,
            prompt: format!("prompt {id}"),
            difficulty: Difficulty::Medium,
            hints: vec![],
            expected_keywords: vec![],
            follow_up: None,
        }
    }

    #[test]
    fn overall_score_rounds_mean() {
        assert_eq!(overall_score(&[]), 0);
        assert_eq!(overall_score(&[record("a", 80), record("b", 91)]), 86);
        assert_eq!(overall_score(&[record("a", 70), record("b", 71)]), 71);
        assert_eq!(overall_score(&[record("a", 33)]), 33);
    }

    #[test]
    fn elapsed_format() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3600), "60:00");
    }

    #[test]
    fn bands() {
        assert_eq!(Band::for_score(85), Band::Excellent);
        assert_eq!(Band::for_score(84), Band::Good);
        assert_eq!(Band::for_score(70), Band::Good);
        assert_eq!(Band::for_score(69), Band::NeedsWork);
        assert_eq!(Band::NeedsWork.to_string(), "needs-work");
    }

    #[test]
    fn summary_aggregates_by_category() {
        let questions = vec![
            question("q1", Category::Technical),
            question("q2", Category::Technical),
            question("q3", Category::Coding),
            question("q4", Category::Behavioral),
        ];
        let answers = vec![record("q1", 90), record("q2", 71), record("q3", 60)];
        let summary = SessionSummary::build(&answers, &questions, 125);

        assert_eq!(summary.overall_score, 74);
        assert_eq!(summary.answered, 3);
        assert_eq!(summary.total_questions, 4);
        assert_eq!(summary.excellent, 1);
        assert_eq!(summary.elapsed(), "02:05");
        assert_eq!(summary.per_category[&Category::Technical], 81);
        assert_eq!(summary.per_category[&Category::Coding], 60);
        assert!(!summary.per_category.contains_key(&Category::Behavioral));
        assert_eq!(summary.answers[2].band, Band::NeedsWork);
    }

    #[test]
    fn summary_tolerates_unknown_questions() {
        let summary = SessionSummary::build(&[record("gone", 50)], &[], 0);
        assert_eq!(summary.answers[0].prompt, None);
        assert!(summary.per_category.is_empty());
        assert!(summary.to_markdown().contains("### 1. gone (50%, needs-work)"));
    }

    #[test]
    fn markdown_rendering() {
        let questions = vec![question("q1", Category::Coding)];
        let md = SessionSummary::build(&[record("q1", 88)], &questions, 61).to_markdown();
        assert!(md.starts_with("# Interview Summary"));
        assert!(md.contains("**Overall score:** 88%"));
        assert!(md.contains("**Questions answered:** 1/1"));
        assert!(md.contains("**Time:** 01:01"));
        assert!(md.contains("| coding | 88% |"));
        assert!(md.contains("### 1. prompt q1 (88%, excellent)"));
        assert!(md.contains("- ✓ clear"));
    }
}
