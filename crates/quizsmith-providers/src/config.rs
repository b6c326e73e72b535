//! Source configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizsmith_core::difficulty::CeilingPolicy;
use quizsmith_core::engine::EngineConfig;
use quizsmith_core::service::ServiceConfig;
use quizsmith_core::traits::QuestionSource;

use crate::anthropic::AnthropicSource;
use crate::ollama::OllamaSource;
use crate::openai::OpenAiSource;

/// Configuration for a single question source.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in
/// logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level quizsmith configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizsmithConfig {
    /// Source configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default source to generate with.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to generate with.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for question generation.
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    /// Bounded generation attempts per block fill.
    #[serde(default = "default_attempts")]
    pub max_attempts: u32,
    /// Delay between failed attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Questions generated per block; omit to pre-fill the whole quiz at
    /// session start.
    #[serde(default)]
    pub block_size: Option<usize>,
    /// Difficulty behavior at the top of the ladder.
    #[serde(default)]
    pub ceiling: CeilingPolicy,
    /// Idle seconds before a session may be reclaimed.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// Output directory for report artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_attempts() -> u32 {
    5
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_session_ttl() -> u64 {
    1800
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizsmith-results")
}

impl Default for QuizsmithConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            max_attempts: default_attempts(),
            retry_delay_ms: default_retry_delay(),
            block_size: None,
            ceiling: CeilingPolicy::default(),
            session_ttl_secs: default_session_ttl(),
            output_dir: default_output_dir(),
        }
    }
}

impl QuizsmithConfig {
    /// Engine tunables derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            block_size: self.block_size,
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            ceiling: self.ceiling,
        }
    }

    /// Service tunables derived from this configuration.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            engine: self.engine_config(),
            session_ttl: Duration::from_secs(self.session_ttl_secs),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a source config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizsmith.toml` in the current directory
/// 2. `~/.config/quizsmith/config.toml`
///
/// Environment variable overrides: `QUIZSMITH_OPENAI_KEY`,
/// `QUIZSMITH_ANTHROPIC_KEY`.
pub fn load_config() -> Result<QuizsmithConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizsmithConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizsmith.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizsmithConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizsmithConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("QUIZSMITH_OPENAI_KEY") {
        config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let Some(ProviderConfig::OpenAI { api_key, .. }) = config.providers.get_mut("openai") {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("QUIZSMITH_ANTHROPIC_KEY") {
        config
            .providers
            .entry("anthropic".into())
            .or_insert(ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(ProviderConfig::Anthropic { api_key, .. }) =
            config.providers.get_mut("anthropic")
        {
            *api_key = key;
        }
    }

    // Resolve env vars in all source configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizsmith"))
}

/// Create a question source from its configuration.
pub fn create_source(
    name: &str,
    config: &ProviderConfig,
    model: &str,
    temperature: f64,
) -> Result<Box<dyn QuestionSource>> {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Ok(Box::new(OpenAiSource::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
            model,
            temperature,
        ))),
        ProviderConfig::Anthropic { api_key, base_url } => Ok(Box::new(AnthropicSource::new(
            api_key,
            base_url.clone(),
            model,
            temperature,
        ))),
        ProviderConfig::Ollama { base_url } => {
            let _ = name;
            Ok(Box::new(OllamaSource::new(base_url, model, temperature)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZSMITH_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZSMITH_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZSMITH_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_QUIZSMITH_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuizsmithConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4.1-mini");
        assert_eq!(config.max_attempts, 5);
        assert!(config.block_size.is_none());
        assert_eq!(config.ceiling, CeilingPolicy::Saturate);
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_provider = "openai"
default_model = "gpt-4.1-mini"
default_temperature = 0.7
block_size = 3
ceiling = "oscillate"

[providers.openai]
type = "openai"
api_key = "sk-test"

[providers.anthropic]
type = "anthropic"
api_key = "sk-ant"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"
"#;
        let config: QuizsmithConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert!(matches!(
            config.providers.get("openai"),
            Some(ProviderConfig::OpenAI { .. })
        ));
        assert_eq!(config.block_size, Some(3));
        assert_eq!(config.ceiling, CeilingPolicy::Oscillate);
    }

    #[test]
    fn engine_config_carries_tunables() {
        let config = QuizsmithConfig {
            block_size: Some(2),
            max_attempts: 7,
            retry_delay_ms: 250,
            ..QuizsmithConfig::default()
        };
        let engine = config.engine_config();
        assert_eq!(engine.block_size, Some(2));
        assert_eq!(engine.max_attempts, 7);
        assert_eq!(engine.retry_delay, Duration::from_millis(250));
    }

    #[test]
    fn debug_masks_api_keys() {
        let config = ProviderConfig::OpenAI {
            api_key: "sk-secret".into(),
            base_url: None,
            org_id: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn load_explicit_missing_path_fails() {
        let err = load_config_from(Some(Path::new("/nonexistent/quizsmith.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizsmith.toml");
        std::fs::write(
            &path,
            r#"
default_provider = "ollama"

[providers.ollama]
type = "ollama"
"#,
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_provider, "ollama");
        assert!(matches!(
            config.providers.get("ollama"),
            Some(ProviderConfig::Ollama { base_url }) if base_url == "http://localhost:11434"
        ));
    }
}
