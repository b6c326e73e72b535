//! Anthropic messages API source.

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

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const MAX_TOKENS: u32 = 4096;
const API_VERSION: &str = "2023-06-01";

/// Anthropic API source.
pub struct AnthropicSource {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
    client: reqwest::Client,
}

impl AnthropicSource {
    pub fn new(api_key: &str, base_url: Option<String>, model: &str, temperature: f64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.to_string(),
            temperature,
            client,
        }
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    system: String,
    messages: Vec<AnthropicMessage>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String,
}

#[async_trait]
impl QuestionSource for AnthropicSource {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, request), fields(model = %self.model, difficulty = %request.difficulty))]
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<RawCandidate>, GenerationError> {
        let body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: self.temperature,
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: quiz_prompt(request),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, DEFAULT_TIMEOUT_SECS))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let api_response: AnthropicResponse = response.json().await.map_err(|e| {
            GenerationError::MalformedOutput(format!("failed to parse response envelope: {e}"))
        })?;

        let content = api_response
            .content
            .first()
            .map(|c| c.text.clone())
            .unwrap_or_default();

        parse_candidates(&content)
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "claude-sonnet-4-20250514".into(),
                name: "Claude Sonnet 4".into(),
                provider: "anthropic".into(),
                max_context: 200_000,
            },
            ModelInfo {
                id: "claude-3-5-haiku-20241022".into(),
                name: "Claude 3.5 Haiku".into(),
                provider: "anthropic".into(),
                max_context: 200_000,
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
            topic: Topic::Language,
            grade: 8,
            difficulty: Difficulty::Hard,
            count: 1,
            subtopic_hint: Some("vocabulary".into()),
        }
    }

    const QUIZ_JSON: &str = r#"[
        {"question": "Which word is a synonym of 'rapid'?",
         "choices": ["slow", "swift", "heavy", "dim"], "answer": "swift",
         "concepts": ["vocabulary"], "explanation": "Swift means fast."}
    ]"#;

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "content": [{"type": "text", "text": QUIZ_JSON}],
            "model": "claude-sonnet-4-20250514"
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let source = AnthropicSource::new(
            "test-key",
            Some(server.uri()),
            "claude-sonnet-4-20250514",
            0.7,
        );
        let candidates = source.generate(&request()).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].answer, "swift");
    }

    #[tokio::test]
    async fn auth_failure_is_unreachable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .mount(&server)
            .await;

        let source =
            AnthropicSource::new("bad-key", Some(server.uri()), "claude-sonnet-4-20250514", 0.7);
        let err = source.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unreachable(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn invalid_envelope_is_malformed_output() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&server)
            .await;

        let source =
            AnthropicSource::new("key", Some(server.uri()), "claude-sonnet-4-20250514", 0.7);
        let err = source.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput(_)));
    }
}
