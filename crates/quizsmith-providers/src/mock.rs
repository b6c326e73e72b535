//! Mock question source for tests and offline runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizsmith_core::error::GenerationError;
use quizsmith_core::model::ModelInfo;
use quizsmith_core::traits::{GenerationRequest, QuestionSource, RawCandidate};

/// What the mock does once its script is exhausted.
enum Fallback {
    /// Fabricate `count` distinct placeholder questions per call.
    Placeholders,
    /// Fail every call with a clone of this error.
    Fail(GenerationError),
}

/// A scriptable question source for driving the engine without network
/// calls.
///
/// Each `generate` call pops one scripted result; once the script runs out
/// the fallback behavior applies. The default fallback fabricates serially
/// numbered placeholder questions so every batch passes deduplication —
/// which also makes the mock a usable offline backend when no API key is
/// configured.
pub struct MockSource {
    script: Mutex<VecDeque<Result<Vec<RawCandidate>, GenerationError>>>,
    fallback: Fallback,
    call_count: AtomicU32,
    last_request: Mutex<Option<GenerationRequest>>,
    serial: AtomicU32,
}

impl MockSource {
    /// A mock that always fabricates placeholder questions.
    pub fn new() -> Self {
        Self::scripted(Vec::new())
    }

    /// A mock that plays back the given results, then falls back to
    /// placeholder questions.
    pub fn scripted(script: Vec<Result<Vec<RawCandidate>, GenerationError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Fallback::Placeholders,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
            serial: AtomicU32::new(1),
        }
    }

    /// A mock that fails every call with the given error.
    pub fn always_failing(error: GenerationError) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Fallback::Fail(error),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
            serial: AtomicU32::new(1),
        }
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request received, if any.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn placeholder_batch(&self, count: usize) -> Vec<RawCandidate> {
        (0..count)
            .map(|_| {
                let n = self.serial.fetch_add(1, Ordering::Relaxed);
                RawCandidate {
                    question: format!("Placeholder question #{n}?"),
                    choices: vec![
                        "Alpha".into(),
                        "Beta".into(),
                        "Gamma".into(),
                        "Delta".into(),
                    ],
                    answer: "Alpha".into(),
                    concepts: vec!["placeholder".into()],
                    explanation: "Canned question served without a generation backend.".into(),
                }
            })
            .collect()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<RawCandidate>, GenerationError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(result) = self.script.lock().unwrap().pop_front() {
            return result;
        }
        match &self.fallback {
            Fallback::Placeholders => Ok(self.placeholder_batch(request.count)),
            Fallback::Fail(error) => Err(error.clone()),
        }
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}
