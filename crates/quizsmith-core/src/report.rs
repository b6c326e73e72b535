//! Final report aggregation with JSON persistence.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::difficulty::Difficulty;
use crate::model::Topic;
use crate::session::Session;

/// How many missed concepts the report surfaces.
const TOP_MISSED_LIMIT: usize = 5;

/// A scored summary of one finished session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub topic: Topic,
    pub grade: u8,
    /// Correct answers.
    pub score: usize,
    /// Questions actually answered; lower than `requested` when the
    /// session terminated early.
    pub total: usize,
    /// Questions originally requested.
    pub requested: usize,
    pub ended_early: bool,
    /// Per-question log join, in answer order.
    pub outcomes: Vec<QuestionOutcome>,
    pub difficulty_trace: Vec<Difficulty>,
    pub time_trace: Vec<u64>,
    /// Concepts tallied over missed questions, worst first, at most five.
    pub top_missed_concepts: Vec<ConceptMisses>,
}

/// One answered question joined with its logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub text: String,
    pub submitted: String,
    pub expected: String,
    pub correct: bool,
    pub explanation: String,
    pub concepts: Vec<String>,
    pub elapsed_ms: u64,
    /// Difficulty level after this answer was applied to the ladder.
    pub difficulty_after: Difficulty,
}

/// Miss tally for one concept tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptMisses {
    pub concept: String,
    pub misses: usize,
}

/// Reduce a session's logs into the final report.
pub fn summarize(session: &Session) -> Report {
    let answered = session.current_index;
    let outcomes: Vec<QuestionOutcome> = (0..answered)
        .map(|i| {
            let question = &session.questions[i];
            QuestionOutcome {
                text: question.text.clone(),
                submitted: session.answer_log[i].clone(),
                expected: question.answer.clone(),
                correct: session.correct_log[i],
                explanation: session.explanation_log[i].clone(),
                concepts: question.concepts.clone(),
                elapsed_ms: session.time_log[i],
                difficulty_after: session.difficulty_log[i],
            }
        })
        .collect();

    Report {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        topic: session.config.topic,
        grade: session.config.grade,
        score: session.score,
        total: answered,
        requested: session.config.target_count,
        ended_early: answered < session.config.target_count,
        difficulty_trace: session.difficulty_log.clone(),
        time_trace: session.time_log.clone(),
        top_missed_concepts: top_missed_concepts(&outcomes),
        outcomes,
    }
}

/// Tally concept tags over incorrectly answered questions: descending miss
/// count, ties broken by first-encountered order, at most five entries.
pub fn top_missed_concepts(outcomes: &[QuestionOutcome]) -> Vec<ConceptMisses> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for outcome in outcomes.iter().filter(|o| !o.correct) {
        for concept in &outcome.concepts {
            let concept = concept.as_str();
            if !counts.contains_key(concept) {
                order.push(concept);
            }
            *counts.entry(concept).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<ConceptMisses> = order
        .into_iter()
        .map(|concept| ConceptMisses {
            concept: concept.to_string(),
            misses: counts[concept],
        })
        .collect();
    // stable sort keeps first-encountered order on ties
    ranked.sort_by(|a, b| b.misses.cmp(&a.misses));
    ranked.truncate(TOP_MISSED_LIMIT);
    ranked
}

impl Report {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: Report =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
