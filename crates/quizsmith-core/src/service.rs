//! The session service: the boundary the presentation collaborator drives.
//!
//! Owns every active session, keyed by an opaque identity. Distinct
//! sessions share no mutable state; duplicate requests against the same
//! identity queue on that session's mutex, which preserves the index/log
//! invariants.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::engine::{BlockGenerator, EngineConfig};
use crate::error::SessionError;
use crate::model::{QuestionView, QuizConfig};
use crate::report::{summarize, Report};
use crate::session::{Session, SessionState};
use crate::traits::QuestionSource;

/// Service-level tunables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub engine: EngineConfig,
    /// Idle time after which a session may be reclaimed.
    pub session_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            session_ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// Either the current question view or the signal that the quiz is over.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentQuestion {
    Question(QuestionView),
    Finished,
}

/// Acknowledgement for a recorded answer. Produced after the answer is
/// locked in, so exposing the canonical answer and explanation is safe.
#[derive(Debug, Clone)]
pub struct AnswerAck {
    pub correct: bool,
    pub answer: String,
    pub explanation: String,
}

struct SessionEntry {
    session: Session,
    last_touched: Instant,
}

/// Owns active sessions and the block generator that feeds them.
pub struct QuizService {
    generator: BlockGenerator,
    config: ServiceConfig,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<SessionEntry>>>>,
}

impl QuizService {
    pub fn new(source: Arc<dyn QuestionSource>, config: ServiceConfig) -> Self {
        Self {
            generator: BlockGenerator::new(source, config.engine.clone()),
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    async fn entry(&self, id: Uuid) -> Result<Arc<Mutex<SessionEntry>>, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::UnknownSession(id))
    }

    /// Start a new session and pre-fill its first block.
    pub async fn start_session(&self, config: QuizConfig) -> Result<Uuid, SessionError> {
        config.validate()?;

        let mut session = Session::new(config);
        let id = session.id;
        let budget = self.generator.block_budget(&session);
        let accepted = self.generator.fill(&mut session, budget).await;
        tracing::info!(session = %id, accepted, "session started");

        let entry = Arc::new(Mutex::new(SessionEntry {
            session,
            last_touched: Instant::now(),
        }));
        self.sessions.write().await.insert(id, entry);
        Ok(id)
    }

    /// Serve the question at the current index, refilling the buffer once
    /// if it has run dry. Signals `Finished` at the target count, or early
    /// when the buffer cannot be grown further.
    pub async fn current_question(&self, id: Uuid) -> Result<CurrentQuestion, SessionError> {
        let entry = self.entry(id).await?;
        let mut guard = entry.lock().await;
        guard.last_touched = Instant::now();

        if guard.session.state == SessionState::Complete || guard.session.reached_target() {
            return Ok(CurrentQuestion::Finished);
        }
        if guard.session.current_index >= guard.session.questions.len() {
            let budget = self.generator.block_budget(&guard.session);
            self.generator.fill(&mut guard.session, budget).await;
        }
        match guard.session.serve_current() {
            Some(view) => Ok(CurrentQuestion::Question(view)),
            None => {
                guard.session.finish();
                Ok(CurrentQuestion::Finished)
            }
        }
    }

    /// Record an answer for the most recently served question.
    pub async fn submit_answer(
        &self,
        id: Uuid,
        choice: &str,
        elapsed_ms: u64,
    ) -> Result<AnswerAck, SessionError> {
        let entry = self.entry(id).await?;
        let mut guard = entry.lock().await;
        guard.last_touched = Instant::now();

        let index = guard.session.current_index;
        let correct =
            guard
                .session
                .record_answer(choice, elapsed_ms, self.config.engine.ceiling)?;
        let question = &guard.session.questions[index];
        Ok(AnswerAck {
            correct,
            answer: question.answer.clone(),
            explanation: question.explanation.clone(),
        })
    }

    /// Produce the final report and complete the session.
    pub async fn report(&self, id: Uuid) -> Result<Report, SessionError> {
        let entry = self.entry(id).await?;
        let mut guard = entry.lock().await;
        guard.last_touched = Instant::now();
        guard.session.finish();
        Ok(summarize(&guard.session))
    }

    /// Drop sessions idle for longer than the configured TTL. Returns the
    /// number reclaimed. Sessions currently in use are never reclaimed.
    pub async fn reclaim_idle(&self) -> usize {
        let ttl = self.config.session_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let mut keep = HashMap::new();
        for (id, entry) in sessions.drain() {
            let idle = match entry.try_lock() {
                Ok(guard) => guard.last_touched.elapsed() > ttl,
                Err(_) => false,
            };
            if !idle {
                keep.insert(id, entry);
            }
        }
        let reclaimed = before - keep.len();
        *sessions = keep;
        if reclaimed > 0 {
            tracing::info!(reclaimed, "reclaimed idle sessions");
        }
        reclaimed
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
