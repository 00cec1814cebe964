//! Deterministic answer scoring.
//!
//! An answer is scored on five weighted factors, summed, adjusted for the
//! question's difficulty, then clamped to 0..=100:
//!
//! | Factor               | Weight |
//! |----------------------|--------|
//! | Keyword coverage     | 33     |
//! | Completeness         | 12     |
//! | Explanation quality  | 18     |
//! | Technical depth      | 22     |
//! | Reasoning            | 15     |
//!
//! Scoring is pure pattern matching: no I/O, no randomness. Identical inputs
//! always yield identical results.

use serde::{Deserialize, Serialize};

use crate::model::{Category, Difficulty, Question};

pub const KEYWORD_WEIGHT: u32 = 33;
pub const COMPLETENESS_WEIGHT: u32 = 12;
pub const EXPLANATION_WEIGHT: u32 = 18;
pub const DEPTH_WEIGHT: u32 = 22;
pub const REASONING_WEIGHT: u32 = 15;

/// Bonus for a coding answer that shows code and covers at least half the keywords.
pub const CODING_BONUS: u32 = 5;

/// Case-sensitive substrings that mark an answer as containing code.
const CODE_MARKERS: &[&str] = &[
    "```", "function", "const", "let", "var", "class", "def", "public", "private", "{", "}",
    "=>",
];

/// Phrases that signal the answer includes an example.
const EXAMPLE_PHRASES: &[&str] = &["example", "for instance", "such as", "like when", "e.g."];

/// Generic engineering vocabulary used as a proxy for technical depth.
const TECHNICAL_TERMS: &[&str] = &[
    "implement",
    "architecture",
    "design",
    "optimize",
    "performance",
    "scale",
    "algorithm",
    "complexity",
    "pattern",
    "best practice",
    "framework",
    "library",
    "api",
    "database",
    "cache",
    "async",
    "sync",
    "thread",
    "memory",
    "latency",
    "component",
    "function",
    "method",
    "class",
    "interface",
    "module",
    "service",
    "system",
    "return",
    "parameter",
    "variable",
    "loop",
    "condition",
    "array",
    "object",
    "string",
    "number",
];

/// Causal connectives that show the candidate justified their approach.
const REASONING_PHRASES: &[&str] = &[
    "because",
    "therefore",
    "thus",
    "so",
    "since",
    "due to",
    "as a result",
    "this allows",
    "this ensures",
    "this helps",
    "this way",
    "in order to",
];

/// The outcome of scoring one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Final score in 0..=100.
    pub score: u32,
    /// Bracketed feedback message.
    pub feedback: String,
    /// What the answer did well, in factor order.
    pub strengths: Vec<String>,
    /// What the answer should improve, in factor order.
    pub improvements: Vec<String>,
}

/// Per-factor detail behind a [`ScoreResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Expected keywords found in the answer.
    pub matched_keywords: usize,
    /// Number of expected keywords on the question.
    pub total_keywords: usize,
    /// `matched / max(1, total)`.
    pub coverage: f64,
    pub keyword_points: u32,
    pub word_count: usize,
    pub has_code: bool,
    pub completeness_points: u32,
    pub sentence_count: usize,
    pub has_examples: bool,
    pub explanation_points: u32,
    /// Distinct technical terms found.
    pub technical_terms: usize,
    pub depth_points: u32,
    pub has_reasoning: bool,
    pub reasoning_points: u32,
    /// Sum of the five factors before any adjustment.
    pub raw_total: u32,
    /// Signed difficulty adjustment actually applied after clamping.
    pub difficulty_adjustment: i32,
    pub coding_bonus: u32,
    /// Final clamped score.
    pub total: u32,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

/// Score an answer to a question.
///
/// Callers must not pass empty or whitespace-only answers; the result for
/// those is unspecified.
pub fn score_answer(question: &Question, answer: &str) -> ScoreResult {
    let breakdown = score_breakdown(question, answer);
    let feedback = feedback_for(breakdown.total, &breakdown.improvements);
    ScoreResult {
        score: breakdown.total,
        feedback,
        strengths: breakdown.strengths,
        improvements: breakdown.improvements,
    }
}

/// Compute every scoring factor for an answer.
pub fn score_breakdown(question: &Question, answer: &str) -> ScoreBreakdown {
    let lower = answer.to_lowercase();
    let mut strengths = Vec::new();
    let mut improvements = Vec::new();

    // 1. Keyword coverage
    let total_keywords = question.expected_keywords.len();
    let matched_keywords = question
        .expected_keywords
        .iter()
        .filter(|k| lower.contains(&k.to_lowercase()))
        .count();
    let coverage = matched_keywords as f64 / total_keywords.max(1) as f64;
    let keyword_points = keyword_points(coverage, question.difficulty);

    if coverage >= 0.7 {
        strengths.push(format!(
            "Excellent technical accuracy ({matched_keywords}/{total_keywords} key concepts)"
        ));
    } else if coverage >= 0.5 {
        strengths.push("Good grasp of core concepts".to_string());
    } else if coverage >= 0.3 {
        improvements.push(format!(
            "Cover more key concepts ({matched_keywords}/{total_keywords})"
        ));
    } else {
        improvements.push(format!(
            "Missing critical concepts ({matched_keywords}/{total_keywords})"
        ));
    }

    // 2. Completeness
    let word_count = answer.split_whitespace().count();
    let has_code = contains_code(answer);
    let is_coding = question.category == Category::Coding;

    let completeness_points = if is_coding && has_code {
        strengths.push("Provided code implementation".to_string());
        COMPLETENESS_WEIGHT
    } else if is_coding {
        improvements.push("Include actual code implementation".to_string());
        4
    } else if word_count >= 50 {
        COMPLETENESS_WEIGHT
    } else if word_count >= 30 {
        8
    } else {
        improvements.push("Provide more complete explanation".to_string());
        5
    };

    // 3. Explanation quality
    let sentence_count = count_sentences(answer);
    let has_examples = EXAMPLE_PHRASES.iter().any(|p| lower.contains(p));
    let mut explanation_points = 6;
    if sentence_count >= 2 {
        explanation_points += 6;
    }
    if has_examples {
        explanation_points += 6;
        strengths.push("Included helpful examples".to_string());
    }
    let explanation_points = explanation_points.min(EXPLANATION_WEIGHT);

    // 4. Technical depth
    let technical_terms = TECHNICAL_TERMS
        .iter()
        .filter(|t| lower.contains(*t))
        .count();
    let depth_points = match technical_terms {
        n if n >= 5 => {
            strengths.push(format!("Excellent technical depth ({n} technical terms)"));
            DEPTH_WEIGHT
        }
        n if n >= 3 => {
            strengths.push("Good technical detail".to_string());
            18
        }
        n if n >= 1 => 13,
        _ => {
            improvements.push("Add more specific technical details".to_string());
            8
        }
    };

    // 5. Reasoning
    let has_reasoning = REASONING_PHRASES.iter().any(|p| lower.contains(p));
    let reasoning_points = if has_reasoning {
        strengths.push("Explained reasoning clearly".to_string());
        REASONING_WEIGHT
    } else {
        improvements.push("Explain WHY your solution works".to_string());
        8
    };

    let raw_total =
        keyword_points + completeness_points + explanation_points + depth_points + reasoning_points;

    let adjusted = adjust_for_difficulty(raw_total, question.difficulty);
    let difficulty_adjustment = adjusted as i32 - raw_total as i32;

    let coding_bonus = if is_coding && has_code && coverage >= 0.5 {
        strengths.push("Provided working code solution".to_string());
        CODING_BONUS
    } else {
        0
    };
    let total = (adjusted + coding_bonus).min(100);

    ScoreBreakdown {
        matched_keywords,
        total_keywords,
        coverage,
        keyword_points,
        word_count,
        has_code,
        completeness_points,
        sentence_count,
        has_examples,
        explanation_points,
        technical_terms,
        depth_points,
        has_reasoning,
        reasoning_points,
        raw_total,
        difficulty_adjustment,
        coding_bonus: total - adjusted,
        total,
        strengths,
        improvements,
    }
}

/// Points for keyword coverage: full credit at the difficulty's target coverage.
pub fn keyword_points(coverage: f64, difficulty: Difficulty) -> u32 {
    let scaled = (coverage / difficulty.target_coverage()) * KEYWORD_WEIGHT as f64;
    scaled.round().min(KEYWORD_WEIGHT as f64) as u32
}

/// Apply the difficulty adjustment to a raw factor total.
///
/// Easy answers under 70 lose 2 points; medium answers at 60 or above gain 5;
/// hard answers at 55 or above gain 10. The result never exceeds 100.
pub fn adjust_for_difficulty(raw: u32, difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy if raw < 70 => raw.saturating_sub(2),
        Difficulty::Medium if raw >= 60 => (raw + 5).min(100),
        Difficulty::Hard if raw >= 55 => (raw + 10).min(100),
        _ => raw.min(100),
    }
}

/// Whether the answer contains code-like tokens.
pub fn contains_code(answer: &str) -> bool {
    CODE_MARKERS.iter().any(|m| answer.contains(m))
}

/// Number of non-blank clauses delimited by `.`, `!` or `?`.
fn count_sentences(answer: &str) -> usize {
    answer
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// Feedback message for a final score, quoting the leading improvement notes.
pub fn feedback_for(score: u32, improvements: &[String]) -> String {
    let first = |n: usize| {
        improvements
            .iter()
            .take(n)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ")
    };

    match score {
        95.. => format!(
            "Exceptional answer ({score}/100)! You demonstrated mastery with comprehensive technical details, clear examples, and strong analytical thinking."
        ),
        85.. => {
            let area = improvements
                .first()
                .map(|i| i.to_lowercase())
                .unwrap_or_else(|| "structure".to_string());
            format!(
                "Excellent response ({score}/100)! You covered the key concepts well with good technical depth. Minor improvements possible in {area}."
            )
        }
        75.. => format!(
            "Good answer ({score}/100). You hit the main points but there's room to strengthen your response. Focus on: {}.",
            first(2)
        ),
        65.. => format!(
            "Adequate attempt ({score}/100). You touched on some concepts but need more depth. Key areas to improve: {}.",
            first(2)
        ),
        50.. => format!(
            "Below expectations ({score}/100). Your answer lacks sufficient detail and technical accuracy. Critical improvements needed: {}.",
            first(3)
        ),
        _ => format!(
            "Needs significant improvement ({score}/100). The answer is incomplete and missing key concepts. Please review the question and provide: {}.",
            first(3)
        ),
    }
}
