//! Completion-provider abstraction over OpenAI-compatible endpoints.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// Result type alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors from the external classifier boundary. These never escape the
/// insight generator; they only select the degradation path.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, non-2xx).
    #[error("classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body had no usable content string.
    #[error("classifier response carried no content")]
    MissingContent,
}

/// Configuration for an OpenAI-compatible endpoint
/// (OpenAI, Ollama, vLLM, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResolver {
    /// Base URL for the API (e.g. "https://api.openai.com/v1").
    pub api_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model name to use (e.g. "gpt-4o-mini", "phi3").
    pub model_name: String,
}

impl LlmResolver {
    /// Create a new resolver.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model_name: model_name.into(),
        }
    }

    /// Create a resolver for local Ollama.
    pub fn ollama(model_name: impl Into<String>) -> Self {
        Self {
            api_url: "http://localhost:11434/v1".to_string(),
            api_key: "ollama".to_string(),
            model_name: model_name.into(),
        }
    }

    /// Create a resolver from environment variables. Returns `None` when the
    /// endpoint is not configured; the engine then runs classifier-less.
    pub fn from_env() -> Option<Self> {
        let api_url = env::var("OPENAI_API_URL")
            .or_else(|_| env::var("IRFORGE_LLM_API_URL"))
            .ok()?;
        let api_key = env::var("OPENAI_API_KEY")
            .or_else(|_| env::var("IRFORGE_LLM_API_KEY"))
            .ok()?;
        let model_name = env::var("OPENAI_MODEL_NAME")
            .or_else(|_| env::var("IRFORGE_LLM_MODEL"))
            .unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Some(Self {
            api_url,
            api_key,
            model_name,
        })
    }
}

/// One conversational turn sent to the classifier.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: &'static str,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// A text-completion capability: model id plus a turn list, no tools, returns
/// the reply content string. No schema enforcement — callers parse
/// defensively.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, model: &str, turns: &[Turn]) -> ProviderResult<String>;
}

/// Production provider over an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiProvider {
    client: reqwest::Client,
    resolver: LlmResolver,
}

impl OpenAiProvider {
    /// Build a provider for the given endpoint. Uses a 30s request timeout.
    pub fn new(resolver: LlmResolver) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, resolver })
    }

    /// The model name this provider's resolver is configured for.
    pub fn model_name(&self) -> &str {
        &self.resolver.model_name
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, model: &str, turns: &[Turn]) -> ProviderResult<String> {
        let url = format!("{}/chat/completions", self.resolver.api_url.trim_end_matches('/'));
        let body = json!({
            "model": model,
            "messages": turns,
            "response_format": { "type": "json_object" },
        });

        debug!(model, url = %url, "classifier_request_start");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.resolver.api_key))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: serde_json::Value = response.json().await?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(ProviderError::MissingContent)?;

        debug!(model, response_len = content.len(), "classifier_request_complete");
        Ok(content)
    }
}
