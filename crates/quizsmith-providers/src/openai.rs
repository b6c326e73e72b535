//! OpenAI-compatible chat completions source.

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

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const MAX_TOKENS: u32 = 4096;

/// OpenAI-compatible chat API source.
pub struct OpenAiSource {
    api_key: String,
    base_url: String,
    org_id: Option<String>,
    model: String,
    temperature: f64,
    client: reqwest::Client,
}

impl OpenAiSource {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        org_id: Option<String>,
        model: &str,
        temperature: f64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            org_id,
            model: model.to_string(),
            temperature,
            client,
        }
    }
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<OpenAiMessage>,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    content: String,
}

#[async_trait]
impl QuestionSource for OpenAiSource {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %self.model, difficulty = %request.difficulty))]
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<RawCandidate>, GenerationError> {
        let body = OpenAiRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: self.temperature,
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: DEFAULT_SYSTEM_PROMPT.to_string(),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: quiz_prompt(request),
                },
            ],
        };

        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json");

        if let Some(org) = &self.org_id {
            req = req.header("OpenAI-Organization", org);
        }

        let response = req
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, DEFAULT_TIMEOUT_SECS))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let api_response: OpenAiResponse = response.json().await.map_err(|e| {
            GenerationError::MalformedOutput(format!("failed to parse response envelope: {e}"))
        })?;

        let content = api_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        parse_candidates(&content)
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "gpt-4.1".into(),
                name: "GPT-4.1".into(),
                provider: "openai".into(),
                max_context: 1_000_000,
            },
            ModelInfo {
                id: "gpt-4.1-mini".into(),
                name: "GPT-4.1 Mini".into(),
                provider: "openai".into(),
                max_context: 1_000_000,
            },
            ModelInfo {
                id: "gpt-4.1-nano".into(),
                name: "GPT-4.1 Nano".into(),
                provider: "openai".into(),
                max_context: 1_000_000,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizsmith_core::difficulty::Difficulty;
    use quizsmith_core::model::Topic;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerationRequest {
        GenerationRequest {
            topic: Topic::Math,
            grade: 5,
            difficulty: Difficulty::Medium,
            count: 2,
            subtopic_hint: None,
        }
    }

    const QUIZ_JSON: &str = r#"[
        {"question": "What is 2 + 2?", "choices": ["3", "4", "5", "6"], "answer": "4",
         "concepts": ["arithmetic"], "explanation": "Two plus two equals four."},
        {"question": "What is 6 / 3?", "choices": ["1", "2", "3", "4"], "answer": "2"}
    ]"#;

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [{"message": {"content": QUIZ_JSON, "role": "assistant"}, "index": 0}],
            "model": "gpt-4.1-mini"
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let source = OpenAiSource::new("test-key", Some(server.uri()), None, "gpt-4.1-mini", 0.7);
        let candidates = source.generate(&request()).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].answer, "4");
    }

    #[tokio::test]
    async fn fenced_content_is_stripped() {
        let server = MockServer::start().await;

        let fenced = format!("```json\n{QUIZ_JSON}\n```");
        let response_body = serde_json::json!({
            "choices": [{"message": {"content": fenced, "role": "assistant"}, "index": 0}],
            "model": "gpt-4.1-mini"
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let source = OpenAiSource::new("key", Some(server.uri()), None, "gpt-4.1-mini", 0.7);
        let candidates = source.generate(&request()).await.unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn prose_content_is_malformed_output() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [{"message": {"content": "I cannot help with that.", "role": "assistant"}, "index": 0}],
            "model": "gpt-4.1-mini"
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let source = OpenAiSource::new("key", Some(server.uri()), None, "gpt-4.1-mini", 0.7);
        let err = source.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn http_error_is_unreachable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let source = OpenAiSource::new("key", Some(server.uri()), None, "gpt-4.1-mini", 0.7);
        let err = source.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unreachable(_)));
        assert!(err.to_string().contains("500"));
    }
}
