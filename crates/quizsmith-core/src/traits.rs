//! The question source trait and its request/candidate types.
//!
//! The trait is implemented by the `quizsmith-providers` crate for each
//! generation backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::error::GenerationError;
use crate::model::{ModelInfo, Topic};

// ---------------------------------------------------------------------------
// Question source trait
// ---------------------------------------------------------------------------

/// Trait for backends that generate question candidates from a structured
/// request.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable source name (e.g. "openai").
    fn name(&self) -> &str;

    /// Generate up to `request.count` raw candidates.
    ///
    /// Candidates are best-effort parses and may be structurally invalid —
    /// validity is the caller's concern, and retries happen above this
    /// layer, not inside it.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<RawCandidate>, GenerationError>;

    /// List the models this source can generate with.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// One structured generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: Topic,
    pub grade: u8,
    pub difficulty: Difficulty,
    /// How many candidates to ask for, at least 1.
    pub count: usize,
    #[serde(default)]
    pub subtopic_hint: Option<String>,
}

/// A raw, unvalidated question structure returned by a source.
///
/// Every field is best-effort: missing or mistyped fields deserialize to
/// their defaults and are left for the validator to reject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    #[serde(default, alias = "text")]
    pub question: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

// ---------------------------------------------------------------------------
// Prompt building
// ---------------------------------------------------------------------------

/// Default system prompt for question sources.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a quiz generation assistant. Respond ONLY with JSON. Do not include prose, markdown formatting, or commentary outside the JSON.";

/// Build the user prompt for a generation request.
///
/// Asks for a JSON list of question objects so the response can be parsed
/// structurally; see `parser::parse_candidates` for the accepted shapes.
pub fn quiz_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "Generate a short practice quiz for a grade {} student. \
         Focus on {}. Difficulty level: {}. \
         Provide {} multiple choice questions. ",
        request.grade, request.topic, request.difficulty, request.count
    );
    if let Some(hint) = &request.subtopic_hint {
        prompt.push_str(&format!("Emphasize {hint}. "));
    }
    prompt.push_str(
        "Return JSON formatted as a list of objects with fields 'question', \
         'choices' (a list of exactly 4 distinct options), 'answer' (the \
         correct option, copied verbatim from the choices), 'concepts' (a \
         list of short topic tags), and 'explanation' (one sentence).",
    );
    prompt
}
