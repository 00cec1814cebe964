//! TOML question bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bank::QuestionBank;
use crate::model::{Category, Difficulty, Question, Role};

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    role: String,
    id: String,
    category: String,
    prompt: String,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default)]
    hints: Vec<String>,
    #[serde(default)]
    expected_keywords: Vec<String>,
    #[serde(default)]
    follow_up: Option<String>,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank`.
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut bank = QuestionBank::new(parsed.bank.id, parsed.bank.name);

    for q in parsed.questions {
        let role: Role = q
            .role
            .parse()
            .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;
        let category: Category = q
            .category
            .parse()
            .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;
        let difficulty: Difficulty = q
            .difficulty
            .parse()
            .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;

        bank.push(
            role,
            Question {
                id: q.id,
                category,
                prompt: q.prompt,
                difficulty,
                hints: q.hints,
                expected_keywords: q.expected_keywords,
                follow_up: q.follow_up,
            },
        );
    }

    Ok(bank)
}

/// Recursively load all `.toml` banks from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// Load a bank from a file, or merge every bank found under a directory.
pub fn load_bank(path: &Path) -> Result<QuestionBank> {
    if path.is_dir() {
        let banks = load_bank_directory(path)?;
        let mut iter = banks.into_iter();
        let Some(mut merged) = iter.next() else {
            anyhow::bail!("no question banks found in {}", path.display());
        };
        for bank in iter {
            merged.extend(bank);
        }
        Ok(merged)
    } else {
        parse_bank(path)
    }
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a bank for common issues.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = std::collections::HashSet::new();
    for (_, q) in bank.iter() {
        if !seen_ids.insert(q.id.as_str()) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("duplicate question ID: {}", q.id),
            });
        }
    }

    for (_, q) in bank.iter() {
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "prompt is empty".into(),
            });
        }
    }

    // Without keywords an answer can never earn coverage points.
    for (_, q) in bank.iter() {
        if q.expected_keywords.is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "no expected_keywords; keyword coverage will always be 0".into(),
            });
        }
    }

    for role in Role::ALL {
        if bank.questions_for(role).is_empty() {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("role '{role}' has no questions"),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[bank]
id = "rust-backend"
name = "Rust Backend"

[[questions]]
role = "backend"
id = "rb-1"
category = "technical"
difficulty = "hard"
prompt = "Explain how async runtimes schedule tasks."
hints = ["Executors", "Wakers"]
expected_keywords = ["executor", "waker", "future", "poll"]
follow_up = "How does work stealing help?"

[[questions]]
role = "backend"
id = "rb-2"
category = "coding"
prompt = "Write a function that merges two sorted vectors."
expected_keywords = ["merge", "sorted"]
"#;

    #[test]
    fn parse_valid_toml() {
        let bank = parse_bank_str(VALID_TOML, &PathBuf::from("bank.toml")).unwrap();
        assert_eq!(bank.id, "rust-backend");
        assert_eq!(bank.len(), 2);
        let qs = bank.questions_for(Role::Backend);
        assert_eq!(qs[0].id, "rb-1");
        assert_eq!(qs[0].difficulty, Difficulty::Hard);
        assert_eq!(qs[0].hints, vec!["Executors", "Wakers"]);
        assert_eq!(qs[1].category, Category::Coding);
        assert_eq!(qs[1].difficulty, Difficulty::Medium);
        assert!(qs[1].follow_up.is_none());
    }

    #[test]
    fn parse_unknown_role() {
        let toml = r#"
[bank]
id = "bad"
name = "Bad"

[[questions]]
role = "devops"
id = "x"
category = "technical"
prompt = "?"
"#;
        let err = parse_bank_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown role"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_bank_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_reports_issues() {
        let toml = r#"
[bank]
id = "dupes"
name = "Dupes"

[[questions]]
role = "frontend"
id = "same"
category = "technical"
prompt = "First"
expected_keywords = ["a"]

[[questions]]
role = "frontend"
id = "same"
category = "technical"
prompt = "   "
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("dupes.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message == "prompt is empty"));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("no expected_keywords")));
        assert!(warnings
            .iter()
            .any(|w| w.message == "role 'ml' has no questions"));
    }

    #[test]
    fn builtin_bank_validates_clean() {
        assert!(validate_bank(&QuestionBank::builtin()).is_empty());
    }

    #[test]
    fn load_directory_merges_banks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "nope = [").unwrap();
        std::fs::write(
            dir.path().join("b.toml"),
            r#"
[bank]
id = "ml"
name = "ML"

[[questions]]
role = "ml"
id = "m-1"
category = "technical"
prompt = "What is regularization?"
expected_keywords = ["penalty"]
"#,
        )
        .unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 2);

        let merged = load_bank(dir.path()).unwrap();
        assert_eq!(merged.id, "rust-backend");
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.questions_for(Role::Ml)[0].id, "m-1");
    }

    #[test]
    fn load_empty_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_bank(dir.path()).is_err());
    }
}
