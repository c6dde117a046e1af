//! LLM integration for mail triage.
//!
//! Supports:
//! - **OpenAI**: Responses API over reqwest (`OpenAiResponsesProvider`)
//!
//! Backends are selected by identifier at startup. An unknown identifier is a
//! configuration error and is never retried.

mod costs;
pub mod openai;
pub mod provider;

pub use costs::estimate_cost;
pub use openai::OpenAiResponsesProvider;
pub use provider::*;

use std::str::FromStr;
use std::sync::Arc;

use crate::config::env_non_empty;
use crate::error::ConfigError;

/// Default model for triage.
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
}

impl LlmBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
        }
    }
}

impl FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            _ => Err(ConfigError::UnsupportedBackend(s.to_string())),
        }
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub base_url: String,
}

impl LlmConfig {
    /// Build from `TRIAGE_BACKEND`, `OPENAI_API_KEY`, `TRIAGE_MODEL` and
    /// `OPENAI_API_BASE`. Only the API key is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match env_non_empty("TRIAGE_BACKEND") {
            Some(id) => id.parse()?,
            None => LlmBackend::OpenAi,
        };
        let api_key = env_non_empty("OPENAI_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;
        let model = env_non_empty("TRIAGE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url =
            env_non_empty("OPENAI_API_BASE").unwrap_or_else(|| DEFAULT_OPENAI_BASE.to_string());

        Ok(Self {
            backend,
            api_key: secrecy::SecretString::from(api_key),
            model,
            base_url,
        })
    }
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, ConfigError> {
    match config.backend {
        LlmBackend::OpenAi => create_openai_provider(config),
    }
}

fn create_openai_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, ConfigError> {
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| ConfigError::InvalidValue {
            key: "http_client".to_string(),
            message: e.to_string(),
        })?;

    tracing::info!("Using OpenAI (model: {})", config.model);
    Ok(Arc::new(OpenAiResponsesProvider::new(
        client,
        config.api_key.clone(),
        &config.model,
        &config.base_url,
    )))
}
