//! Ollama (local LLM) source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizsmith_core::error::GenerationError;
use quizsmith_core::model::ModelInfo;
use quizsmith_core::parser::parse_candidates;
use quizsmith_core::traits::{
    quiz_prompt, GenerationRequest, QuestionSource, RawCandidate, DEFAULT_SYSTEM_PROMPT,
};

use crate::error::{map_transport_error, status_error};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 300; // Local models are slower

/// Ollama local LLM source.
pub struct OllamaSource {
    base_url: String,
    model: String,
    temperature: f64,
    client: reqwest::Client,
}

impl OllamaSource {
    pub fn new(base_url: &str, model: &str, temperature: f64) -> Self {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base.to_string(),
            model: model.to_string(),
            temperature,
            client,
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[async_trait]
impl QuestionSource for OllamaSource {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(model = %self.model, difficulty = %request.difficulty))]
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<RawCandidate>, GenerationError> {
        let body = OllamaRequest {
            model: self.model.clone(),
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: DEFAULT_SYSTEM_PROMPT.to_string(),
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: quiz_prompt(request),
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, DEFAULT_TIMEOUT_SECS))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let api_response: OllamaResponse = response.json().await.map_err(|e| {
            GenerationError::MalformedOutput(format!("failed to parse response envelope: {e}"))
        })?;

        parse_candidates(&api_response.message.content)
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "llama3.1:8b".into(),
                name: "Llama 3.1 8B".into(),
                provider: "ollama".into(),
                max_context: 128_000,
            },
            ModelInfo {
                id: "qwen2.5:7b".into(),
                name: "Qwen 2.5 7B".into(),
                provider: "ollama".into(),
                max_context: 128_000,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizsmith_core::difficulty::Difficulty;
    use quizsmith_core::model::Topic;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerationRequest {
        GenerationRequest {
            topic: Topic::Math,
            grade: 3,
            difficulty: Difficulty::Easy,
            count: 1,
            subtopic_hint: None,
        }
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        let quiz = r#"[{"question": "What is 1 + 1?", "choices": ["1", "2", "3", "4"], "answer": "2"}]"#;
        let response_body = serde_json::json!({
            "model": "llama3.1:8b",
            "message": {"role": "assistant", "content": quiz},
            "done": true
        });

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let source = OllamaSource::new(&server.uri(), "llama3.1:8b", 0.7);
        let candidates = source.generate(&request()).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].question, "What is 1 + 1?");
    }

    #[tokio::test]
    async fn missing_model_is_unreachable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string(r#"{"error":"model not found"}"#),
            )
            .mount(&server)
            .await;

        let source = OllamaSource::new(&server.uri(), "missing-model", 0.7);
        let err = source.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unreachable(_)));
    }

    #[tokio::test]
    async fn empty_base_url_falls_back_to_default() {
        let source = OllamaSource::new("", "llama3.1:8b", 0.7);
        assert_eq!(source.base_url, DEFAULT_BASE_URL);
    }
}
