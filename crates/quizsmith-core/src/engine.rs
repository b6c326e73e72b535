//! Block generation: keeps a session's lookahead buffer filled.
//!
//! The block generator owns the retry policy around the question source.
//! Transport and parse failures never escape it — the worst outcome is a
//! buffer left short, which the session layer turns into early termination
//! at the report stage.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::difficulty::{next_difficulty, CeilingPolicy};
use crate::session::Session;
use crate::traits::{GenerationRequest, QuestionSource};
use crate::validate::validate_candidate;

/// Tunables for the block generator.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Questions generated per block; `None` fills the whole quiz in one
    /// block at session start.
    pub block_size: Option<usize>,
    /// Bounded attempts per fill invocation.
    pub max_attempts: u32,
    /// Delay before a retry attempt, doubled each time up to a cap.
    pub retry_delay: Duration,
    /// Ceiling behavior shared by both difficulty ladders.
    pub ceiling: CeilingPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_size: None,
            max_attempts: 5,
            retry_delay: Duration::from_secs(1),
            ceiling: CeilingPolicy::Saturate,
        }
    }
}

/// Orchestrates generation calls until a block of validated, deduplicated
/// questions exists, advancing the generation-progress difficulty ladder
/// between accepted questions.
pub struct BlockGenerator {
    source: Arc<dyn QuestionSource>,
    config: EngineConfig,
}

impl BlockGenerator {
    pub fn new(source: Arc<dyn QuestionSource>, config: EngineConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// How many questions one fill should aim for, given the buffer gap.
    pub fn block_budget(&self, session: &Session) -> usize {
        let missing = session.missing();
        match self.config.block_size {
            Some(size) => size.min(missing),
            None => missing,
        }
    }

    /// Grow `session.questions` by up to `desired` validated questions.
    ///
    /// Each attempt is one batched call sized to the remaining gap. A
    /// failed or fruitless attempt costs one of `max_attempts`; a partial
    /// (or empty) fill is an acceptable outcome. Returns the number of
    /// questions accepted.
    pub async fn fill(&self, session: &mut Session, desired: usize) -> usize {
        let mut remaining = desired.min(session.missing());
        if remaining == 0 {
            return 0;
        }

        let mut seen: HashSet<String> =
            session.questions.iter().map(|q| q.text.clone()).collect();
        let mut accepted = 0usize;
        let mut delay = self.config.retry_delay;

        for attempt in 1..=self.config.max_attempts {
            if remaining == 0 {
                break;
            }
            if attempt > 1 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(Duration::from_secs(30));
            }

            let request = GenerationRequest {
                topic: session.config.topic,
                grade: session.config.grade,
                difficulty: session.difficulty,
                count: remaining,
                subtopic_hint: session.config.subtopic_hint.clone(),
            };

            let candidates = match self.source.generate(&request).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!(
                        source = self.source.name(),
                        attempt,
                        "generation attempt failed: {e}"
                    );
                    continue;
                }
            };

            for candidate in &candidates {
                if remaining == 0 {
                    break;
                }
                match validate_candidate(candidate, &seen) {
                    Ok(question) => {
                        seen.insert(question.text.clone());
                        session.questions.push(question);
                        session.difficulty =
                            next_difficulty(session.difficulty, true, self.config.ceiling);
                        remaining -= 1;
                        accepted += 1;
                    }
                    Err(rejection) => {
                        tracing::debug!(
                            source = self.source.name(),
                            "discarded candidate: {rejection}"
                        );
                    }
                }
            }
        }

        if remaining > 0 {
            tracing::warn!(
                session = %session.id,
                missing = remaining,
                attempts = self.config.max_attempts,
                "buffer left short after exhausting generation attempts"
            );
        }
        accepted
    }
}
