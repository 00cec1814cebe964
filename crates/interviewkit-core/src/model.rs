//! Core data model types for interviewkit.
//!
//! Questions, their categories and difficulties, and the role/level/duration
//! selection that configures an interview session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single interview question. Supplied by a question bank, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier (e.g. "fe-3").
    pub id: String,
    /// What kind of question this is.
    pub category: Category,
    /// The question text read to the candidate.
    pub prompt: String,
    /// How hard the question is; drives scoring targets and bonuses.
    pub difficulty: Difficulty,
    /// Optional hints the candidate may reveal.
    #[serde(default)]
    pub hints: Vec<String>,
    /// Concepts a good answer is expected to mention.
    #[serde(default)]
    pub expected_keywords: Vec<String>,
    /// Optional follow-up question.
    #[serde(default)]
    pub follow_up: Option<String>,
}

/// Question category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Behavioral,
    Technical,
    Coding,
    SystemDesign,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Behavioral => write!(f, "behavioral"),
            Category::Technical => write!(f, "technical"),
            Category::Coding => write!(f, "coding"),
            Category::SystemDesign => write!(f, "system-design"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "behavioral" | "behavioural" => Ok(Category::Behavioral),
            "technical" => Ok(Category::Technical),
            "coding" => Ok(Category::Coding),
            "system-design" | "system_design" | "systemdesign" => Ok(Category::SystemDesign),
            other => Err(format!("unknown question category: {other}")),
        }
    }
}

/// Question difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Keyword coverage that earns full keyword credit.
    ///
    /// Harder questions need fewer of their expected keywords.
    pub fn target_coverage(self) -> f64 {
        match self {
            Difficulty::Hard => 0.5,
            Difficulty::Medium => 0.6,
            Difficulty::Easy => 0.7,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// The job role an interview targets. Selects the question set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Frontend,
    Backend,
    Fullstack,
    Data,
    Ml,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Frontend,
        Role::Backend,
        Role::Fullstack,
        Role::Data,
        Role::Ml,
    ];

    /// Human-readable job title.
    pub fn label(self) -> &'static str {
        match self {
            Role::Frontend => "Frontend Engineer",
            Role::Backend => "Backend Engineer",
            Role::Fullstack => "Full Stack Engineer",
            Role::Data => "Data Engineer",
            Role::Ml => "ML Engineer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Frontend => write!(f, "frontend"),
            Role::Backend => write!(f, "backend"),
            Role::Fullstack => write!(f, "fullstack"),
            Role::Data => write!(f, "data"),
            Role::Ml => write!(f, "ml"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "frontend" | "fe" => Ok(Role::Frontend),
            "backend" | "be" => Ok(Role::Backend),
            "fullstack" | "full-stack" | "fs" => Ok(Role::Fullstack),
            "data" | "de" => Ok(Role::Data),
            "ml" => Ok(Role::Ml),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Candidate seniority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Entry,
    Mid,
    Senior,
}

impl Level {
    pub fn label(self) -> &'static str {
        match self {
            Level::Entry => "Entry Level",
            Level::Mid => "Mid Level",
            Level::Senior => "Senior Level",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Level::Entry => "0-2 years experience",
            Level::Mid => "2-5 years experience",
            Level::Senior => "5+ years experience",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Entry => write!(f, "entry"),
            Level::Mid => write!(f, "mid"),
            Level::Senior => write!(f, "senior"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entry" | "junior" => Ok(Level::Entry),
            "mid" => Ok(Level::Mid),
            "senior" => Ok(Level::Senior),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// A complete interview selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewConfig {
    pub role: Role,
    pub level: Level,
    /// Planned length in minutes. Advisory only; never enforced as a cutoff.
    pub duration_minutes: u32,
}

/// The selection being built during the setup stage.
///
/// Each field is chosen independently; the interview can only start once
/// all three are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialConfig {
    pub role: Option<Role>,
    pub level: Option<Level>,
    pub duration_minutes: Option<u32>,
}

impl PartialConfig {
    /// Returns the full config if role, level and a non-zero duration are all set.
    pub fn complete(&self) -> Option<InterviewConfig> {
        match (self.role, self.level, self.duration_minutes) {
            (Some(role), Some(level), Some(duration_minutes)) if duration_minutes > 0 => {
                Some(InterviewConfig {
                    role,
                    level,
                    duration_minutes,
                })
            }
            _ => None,
        }
    }
}

impl From<InterviewConfig> for PartialConfig {
    fn from(config: InterviewConfig) -> Self {
        Self {
            role: Some(config.role),
            level: Some(config.level),
            duration_minutes: Some(config.duration_minutes),
        }
    }
}

/// A stage of the interview state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Setup,
    Intro,
    Interview,
    Complete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Setup => write!(f, "setup"),
            Stage::Intro => write!(f, "intro"),
            Stage::Interview => write!(f, "interview"),
            Stage::Complete => write!(f, "complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_display_and_parse() {
        assert_eq!(Category::SystemDesign.to_string(), "system-design");
        assert_eq!(
            "system-design".parse::<Category>().unwrap(),
            Category::SystemDesign
        );
        assert_eq!("Coding".parse::<Category>().unwrap(), Category::Coding);
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("full-stack".parse::<Role>().unwrap(), Role::Fullstack);
        assert_eq!("ML".parse::<Role>().unwrap(), Role::Ml);
        assert_eq!("senior".parse::<Level>().unwrap(), Level::Senior);
        assert!("devops".parse::<Role>().is_err());
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn target_coverage_by_difficulty() {
        assert_eq!(Difficulty::Hard.target_coverage(), 0.5);
        assert_eq!(Difficulty::Medium.target_coverage(), 0.6);
        assert_eq!(Difficulty::Easy.target_coverage(), 0.7);
    }

    #[test]
    fn partial_config_requires_all_fields() {
        let mut partial = PartialConfig::default();
        assert!(partial.complete().is_none());
        partial.role = Some(Role::Frontend);
        partial.level = Some(Level::Entry);
        assert!(partial.complete().is_none());
        partial.duration_minutes = Some(0);
        assert!(partial.complete().is_none());
        partial.duration_minutes = Some(15);
        let config = partial.complete().unwrap();
        assert_eq!(config.role, Role::Frontend);
        assert_eq!(config.duration_minutes, 15);
    }

    #[test]
    fn question_serde_roundtrip() {
        let question = Question {
            id: "q-1".into(),
            category: Category::SystemDesign,
            prompt: "Design a cache".into(),
            difficulty: Difficulty::Hard,
            hints: vec![],
            expected_keywords: vec!["eviction".into()],
            follow_up: None,
        };
        let json = serde_json::to_string(&question).unwrap();
        assert!(json.contains("\"system-design\""));
        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(back, question);
    }
}
