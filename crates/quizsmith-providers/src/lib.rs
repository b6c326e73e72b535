//! quizsmith-providers — question generation backends.
//!
//! Implements the `QuestionSource` trait for OpenAI-compatible, Anthropic,
//! and Ollama APIs, plus a scriptable mock for tests and offline runs.

pub mod anthropic;
pub mod config;
mod error;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{create_source, load_config, ProviderConfig, QuizsmithConfig};
