//! Core data model types for quizsmith.
//!
//! These are the fundamental types that the entire quizsmith system uses
//! to represent quiz parameters, questions, and what the presentation
//! boundary is allowed to see of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SessionError;

/// Number of answer choices every question must carry.
pub const CHOICES_PER_QUESTION: usize = 4;

/// Inclusive school-grade range accepted at session start.
pub const GRADE_RANGE: std::ops::RangeInclusive<u8> = 1..=12;

/// Quiz subject area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Language,
    Math,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Language => write!(f, "language"),
            Topic::Math => write!(f, "math"),
        }
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "language" | "english" => Ok(Topic::Language),
            "math" | "maths" => Ok(Topic::Math),
            other => Err(format!("unknown topic: {other}")),
        }
    }
}

/// Parameters that configure one quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Subject area to generate questions for.
    pub topic: Topic,
    /// School grade of the student, 1 through 12.
    pub grade: u8,
    /// How many questions the quiz should have.
    pub target_count: usize,
    /// Optional emphasis within the topic (e.g. "fractions").
    #[serde(default)]
    pub subtopic_hint: Option<String>,
}

impl QuizConfig {
    /// Check the start parameters before any session is created.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.target_count < 1 {
            return Err(SessionError::InvalidConfiguration(format!(
                "target_count must be at least 1, got {}",
                self.target_count
            )));
        }
        if !GRADE_RANGE.contains(&self.grade) {
            return Err(SessionError::InvalidConfiguration(format!(
                "grade must be within {}..={}, got {}",
                GRADE_RANGE.start(),
                GRADE_RANGE.end(),
                self.grade
            )));
        }
        Ok(())
    }
}

/// A validated multiple-choice question, immutable once buffered.
///
/// `text` is the session-wide deduplication key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    /// Exactly four distinct options.
    pub choices: Vec<String>,
    /// Always a member of `choices`.
    pub answer: String,
    /// Zero or more topic tags, used for the missed-concepts tally.
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

/// What the rendering collaborator sees of the current question.
///
/// Carries neither the answer nor the explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionView {
    pub text: String,
    pub choices: Vec<String>,
    /// Zero-based position within the quiz.
    pub index: usize,
    /// The number of questions originally requested.
    pub total: usize,
    pub progress_percent: u8,
}

/// Information about a model a question source can generate with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Source name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_display_and_parse() {
        assert_eq!(Topic::Math.to_string(), "math");
        assert_eq!(Topic::Language.to_string(), "language");
        assert_eq!("math".parse::<Topic>().unwrap(), Topic::Math);
        assert_eq!("Maths".parse::<Topic>().unwrap(), Topic::Math);
        assert_eq!("english".parse::<Topic>().unwrap(), Topic::Language);
        assert!("history".parse::<Topic>().is_err());
    }

    #[test]
    fn config_accepts_valid_bounds() {
        let config = QuizConfig {
            topic: Topic::Math,
            grade: 5,
            target_count: 3,
            subtopic_hint: None,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_zero_target() {
        let config = QuizConfig {
            topic: Topic::Math,
            grade: 5,
            target_count: 0,
            subtopic_hint: None,
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("target_count"));
    }

    #[test]
    fn config_rejects_out_of_range_grade() {
        for grade in [0u8, 13] {
            let config = QuizConfig {
                topic: Topic::Language,
                grade,
                target_count: 1,
                subtopic_hint: None,
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("grade"), "grade {grade} accepted");
        }
    }

    #[test]
    fn question_serde_roundtrip() {
        let question = Question {
            text: "What is 2 + 2?".into(),
            choices: vec!["3".into(), "4".into(), "5".into(), "6".into()],
            answer: "4".into(),
            concepts: vec!["arithmetic".into()],
            explanation: "Two plus two equals four.".into(),
        };
        let json = serde_json::to_string(&question).unwrap();
        let deserialized: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, question);
    }
}
