//! The adaptive difficulty ladder.
//!
//! Three levels, single step up on a correct answer, single step down on an
//! incorrect one, bounded at both ends. The same transition function drives
//! both the per-answer ladder and the generation-progress ladder in the
//! block generator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generation and adaptive difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Position on the ladder, for ordering checks.
    pub fn rank(self) -> u8 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
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

/// What a correct answer does at the top of the ladder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CeilingPolicy {
    /// Stay at hard.
    #[default]
    Saturate,
    /// Drop back to medium.
    Oscillate,
}

/// The difficulty transition table, total over all inputs.
pub fn next_difficulty(
    current: Difficulty,
    was_correct: bool,
    ceiling: CeilingPolicy,
) -> Difficulty {
    use Difficulty::*;

    match (current, was_correct) {
        (Easy, true) => Medium,
        (Medium, true) => Hard,
        (Hard, true) => match ceiling {
            CeilingPolicy::Saturate => Hard,
            CeilingPolicy::Oscillate => Medium,
        },
        (Easy, false) => Easy,
        (Medium, false) => Easy,
        (Hard, false) => Medium,
    }
}
