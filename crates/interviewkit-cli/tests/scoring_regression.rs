//! Scoring regression tests over the built-in question bank.
//!
//! Guards the properties interview feedback depends on: scores stay in
//! range, richer answers never score lower, and known answers keep their
//! scores.

use chrono::{TimeZone, Utc};

use interviewkit_core::bank::QuestionBank;
use interviewkit_core::model::{Category, Question, Role};
use interviewkit_core::scoring::{score_answer, score_breakdown};
use interviewkit_core::session::AnswerRecord;
use interviewkit_core::statistics::{Band, SessionSummary};

const FILLER: &str = "I would approach it step by step";

/// An answer that mentions every expected keyword, explains why, and gives
/// an example.
fn model_answer(question: &Question) -> String {
    let mut answer = format!(
        "{}. For example, I would implement a function because this ensures performance, scale, architecture and design all hold up.",
        question.expected_keywords.join(", ")
    );
    if question.category == Category::Coding {
        answer.push_str(" const run = () => { return cache; }");
    }
    answer
}

fn all_questions() -> Vec<(Role, Question)> {
    QuestionBank::builtin()
        .iter()
        .map(|(role, q)| (role, q.clone()))
        .collect()
}

#[test]
fn builtin_bank_covers_every_role() {
    let bank = QuestionBank::builtin();
    for role in Role::ALL {
        assert_eq!(bank.questions_for(role).len(), 4, "{role}");
    }
    assert_eq!(bank.len(), 20);
}

#[test]
fn minimal_answers_score_low() {
    for (role, q) in all_questions() {
        let result = score_answer(&q, "ok");
        assert!(
            result.score < 40,
            "{role}/{}: minimal answer scored {}",
            q.id,
            result.score
        );
        assert!(!result.improvements.is_empty());
    }
}

#[test]
fn model_answers_score_excellent() {
    for (role, q) in all_questions() {
        let b = score_breakdown(&q, &model_answer(&q));
        assert_eq!(b.matched_keywords, b.total_keywords, "{role}/{}", q.id);
        assert!(b.has_reasoning && b.has_examples);
        assert!(
            b.total >= 85,
            "{role}/{}: model answer scored {}",
            q.id,
            b.total
        );
        assert_eq!(Band::for_score(b.total), Band::Excellent);
        assert!(b.total <= 100);
    }
}

#[test]
fn more_keywords_never_lower_the_score() {
    for (role, q) in all_questions() {
        let mut previous = 0;
        for k in 0..=q.expected_keywords.len() {
            let answer = format!("{FILLER} {}", q.expected_keywords[..k].join(" "));
            let score = score_answer(&q, &answer).score;
            assert!(
                score >= previous,
                "{role}/{}: {k} keywords scored {score}, fewer scored {previous}",
                q.id
            );
            previous = score;
        }
    }
}

#[test]
fn scoring_is_deterministic() {
    for (_, q) in all_questions() {
        let answer = model_answer(&q);
        assert_eq!(score_answer(&q, &answer), score_answer(&q, &answer));
    }
}

#[test]
fn keyword_matching_ignores_case() {
    let bank = QuestionBank::builtin();
    let q = bank.find(Role::Backend, "be-2").unwrap();
    let lower = score_breakdown(q, "cap consistency availability partition distributed");
    let upper = score_breakdown(q, "CAP CONSISTENCY AVAILABILITY PARTITION DISTRIBUTED");
    assert_eq!(lower.matched_keywords, 5);
    assert_eq!(lower.total, upper.total);
}

#[test]
fn known_debounce_answer_scores_82() {
    let bank = QuestionBank::builtin();
    let q = bank.find(Role::Frontend, "fe-3").unwrap();
    let result = score_answer(
        q,
        "I would use setTimeout to delay the function call and clearTimeout to cancel the previous one, which improves performance by reducing API calls.",
    );
    assert_eq!(result.score, 82);
    assert!(result.feedback.starts_with("Good answer (82/100)."));
}

#[test]
fn summary_of_model_answers() {
    let bank = QuestionBank::builtin();
    let questions = bank.questions_for(Role::Data).to_vec();
    let at = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    let answers: Vec<AnswerRecord> = questions
        .iter()
        .map(|q| {
            let answer = model_answer(q);
            let result = score_answer(q, &answer);
            AnswerRecord::new(q.id.as_str(), answer, at, result)
        })
        .collect();

    let summary = SessionSummary::build(&answers, &questions, 754);
    assert_eq!(summary.answered, 4);
    assert_eq!(summary.excellent, 4);
    assert!(summary.overall_score >= 85);
    assert_eq!(summary.elapsed(), "12:34");
    assert!(summary.per_category.values().all(|s| *s >= 85));
}
