//! The per-session record and its state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::difficulty::{next_difficulty, CeilingPolicy, Difficulty};
use crate::error::SessionError;
use crate::model::{Question, QuestionView, QuizConfig};

/// Session lifecycle. A quiz that has not been started is represented by
/// the session not existing in the store at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Complete,
}

/// One active quiz attempt.
///
/// Mutated only through its own methods. Invariants:
/// `current_index <= questions.len() <= config.target_count`, every log has
/// length `current_index` after an answer is recorded, and no two buffered
/// questions share text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub config: QuizConfig,
    pub state: SessionState,
    /// Current generation/adaptive level.
    pub difficulty: Difficulty,
    /// Lazily grown lookahead buffer, never longer than `target_count`.
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub score: usize,
    pub difficulty_log: Vec<Difficulty>,
    pub time_log: Vec<u64>,
    pub answer_log: Vec<String>,
    pub correct_log: Vec<bool>,
    pub explanation_log: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Whether the question at `current_index` has been served since the
    /// last recorded answer. Guards against double submits.
    #[serde(default)]
    current_served: bool,
}

impl Session {
    /// Fresh session: difficulty starts at medium, all buffers and logs
    /// empty.
    pub fn new(config: QuizConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            state: SessionState::Active,
            difficulty: Difficulty::Medium,
            questions: Vec::new(),
            current_index: 0,
            score: 0,
            difficulty_log: Vec::new(),
            time_log: Vec::new(),
            answer_log: Vec::new(),
            correct_log: Vec::new(),
            explanation_log: Vec::new(),
            created_at: Utc::now(),
            current_served: false,
        }
    }

    /// Questions still missing from the buffer.
    pub fn missing(&self) -> usize {
        self.config.target_count - self.questions.len()
    }

    /// True once the index has reached the requested count.
    pub fn reached_target(&self) -> bool {
        self.current_index >= self.config.target_count
    }

    /// The unanswered question at the current index, if buffered.
    pub fn current_question(&self) -> Option<&Question> {
        if self.state == SessionState::Complete || self.reached_target() {
            return None;
        }
        self.questions.get(self.current_index)
    }

    /// Serve the current question to the presentation boundary and arm the
    /// answer protocol. The answer and explanation stay behind the view.
    pub fn serve_current(&mut self) -> Option<QuestionView> {
        let total = self.config.target_count;
        let index = self.current_index;
        let question = self.current_question()?;
        let view = QuestionView {
            text: question.text.clone(),
            choices: question.choices.clone(),
            index,
            total,
            progress_percent: ((index * 100) / total) as u8,
        };
        self.current_served = true;
        Some(view)
    }

    /// Record an answer for the served question.
    ///
    /// Appends to every log, updates the score, steps the difficulty
    /// ladder, and advances the index. Returns whether the answer matched
    /// the canonical one exactly.
    pub fn record_answer(
        &mut self,
        choice: &str,
        elapsed_ms: u64,
        ceiling: CeilingPolicy,
    ) -> Result<bool, SessionError> {
        if self.state == SessionState::Complete {
            return Err(SessionError::OutOfSequence(
                "session is already complete".into(),
            ));
        }
        if self.current_index >= self.questions.len() {
            return Err(SessionError::OutOfSequence(
                "no current question to answer".into(),
            ));
        }
        if !self.current_served {
            return Err(SessionError::OutOfSequence(
                "current question was not served, or was already answered".into(),
            ));
        }

        let correct = self.questions[self.current_index].answer == choice;
        let explanation = self.questions[self.current_index].explanation.clone();

        self.time_log.push(elapsed_ms);
        self.answer_log.push(choice.to_string());
        self.correct_log.push(correct);
        self.explanation_log.push(explanation);
        if correct {
            self.score += 1;
        }
        self.difficulty = next_difficulty(self.difficulty, correct, ceiling);
        self.difficulty_log.push(self.difficulty);
        self.current_index += 1;
        self.current_served = false;

        if self.reached_target() {
            self.state = SessionState::Complete;
        }
        Ok(correct)
    }

    /// Mark the session complete without reaching the target (generation
    /// exhausted, or the caller asked for the report early).
    pub fn finish(&mut self) {
        self.state = SessionState::Complete;
    }
}
