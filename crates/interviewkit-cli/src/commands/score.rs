//! The `interviewkit score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use interviewkit_core::model::Role;
use interviewkit_core::scoring::{feedback_for, score_breakdown};

use super::load_question_bank;

pub fn execute(
    role: Role,
    question_id: String,
    answer: String,
    bank_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let bank = load_question_bank(bank_path.as_deref())?;
    let question = bank
        .find(role, &question_id)
        .with_context(|| format!("no question '{question_id}' for role '{role}'"))?;
    anyhow::ensure!(!answer.trim().is_empty(), "answer is empty");

    let breakdown = score_breakdown(question, &answer);
    let feedback = feedback_for(breakdown.total, &breakdown.improvements);

    if json {
        let output = serde_json::json!({
            "question_id": question.id,
            "score": breakdown.total,
            "feedback": feedback,
            "breakdown": breakdown,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} [{} / {}]", question.prompt, question.category, question.difficulty);
    println!("\nScore: {}/100", breakdown.total);
    println!("{feedback}");
    println!(
        "\nKeywords: {}/{}   words: {}   sentences: {}",
        breakdown.matched_keywords,
        breakdown.total_keywords,
        breakdown.word_count,
        breakdown.sentence_count
    );
    if !breakdown.strengths.is_empty() {
        println!("\nStrengths:");
        for s in &breakdown.strengths {
            println!("  + {s}");
        }
    }
    if !breakdown.improvements.is_empty() {
        println!("\nImprovements:");
        for s in &breakdown.improvements {
            println!("  - {s}");
        }
    }
    Ok(())
}
