pub mod init;
pub mod questions;
pub mod run;
pub mod score;
pub mod usage;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use interviewkit_core::bank::QuestionBank;
use interviewkit_core::parser;

/// Load the bank at `path`, or the built-in bank when no path is given.
pub fn load_question_bank(path: Option<&Path>) -> Result<QuestionBank> {
    match path {
        Some(path) => parser::load_bank(path),
        None => Ok(QuestionBank::builtin()),
    }
}
