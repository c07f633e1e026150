//! Provider abstraction and configuration.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::claude::ClaudeProvider;
use crate::error::{LlmError, LlmResult};
use crate::gemini::GeminiProvider;
use crate::openai_compat::OpenAiCompatProvider;
use crate::types::{LlmToolDefinition, Message, ModelTurn};

/// Trait for LLM providers.
///
/// Adapters are stateless: every call receives the full transcript and
/// translates it into the vendor's wire format.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name.
    fn name(&self) -> &str;

    /// Model being used.
    fn model(&self) -> &str;

    /// Send the transcript and return the model's next turn.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> LlmResult<ModelTurn>;
}

#[async_trait]
impl LlmProvider for Box<dyn LlmProvider> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> LlmResult<ModelTurn> {
        (**self).complete(messages, tools, system).await
    }
}

/// Vendor family, selecting which adapter speaks to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    /// Anthropic Messages API.
    Anthropic,
    /// Google Gemini `generateContent` API.
    Gemini,
    /// `OpenAI` chat completions.
    OpenAi,
    /// `DeepSeek` (OpenAI-compatible).
    DeepSeek,
    /// Groq (OpenAI-compatible).
    Groq,
    /// `OpenRouter` (OpenAI-compatible).
    OpenRouter,
    /// Mistral (OpenAI-compatible).
    Mistral,
    /// xAI (OpenAI-compatible).
    Xai,
}

impl ProviderFamily {
    /// Short lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
            Self::Groq => "groq",
            Self::OpenRouter => "openrouter",
            Self::Mistral => "mistral",
            Self::Xai => "xai",
        }
    }

    /// Default chat completions endpoint for OpenAI-compatible families.
    #[must_use]
    pub fn default_endpoint(self) -> Option<&'static str> {
        match self {
            Self::Anthropic | Self::Gemini => None,
            Self::OpenAi => Some("https://api.openai.com/v1/chat/completions"),
            Self::DeepSeek => Some("https://api.deepseek.com/v1/chat/completions"),
            Self::Groq => Some("https://api.groq.com/openai/v1/chat/completions"),
            Self::OpenRouter => Some("https://openrouter.ai/api/v1/chat/completions"),
            Self::Mistral => Some("https://api.mistral.ai/v1/chat/completions"),
            Self::Xai => Some("https://api.x.ai/v1/chat/completions"),
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for one provider candidate.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Which adapter to use.
    pub family: ProviderFamily,
    /// API key.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: usize,
    /// Temperature (0.0 - 1.0).
    pub temperature: f64,
    /// API endpoint override.
    pub base_url: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("family", &self.family)
            .field("has_api_key", &!self.api_key.is_empty())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("has_base_url", &self.base_url.is_some())
            .finish()
    }
}

impl ProviderConfig {
    /// Create a new config for a family with API key and model.
    #[must_use]
    pub fn new(family: ProviderFamily, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            family,
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 4096,
            temperature: 0.7,
            base_url: None,
        }
    }

    /// Set max tokens.
    #[must_use]
    pub fn max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = max;
        self
    }

    /// Set temperature.
    #[must_use]
    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = temp.clamp(0.0, 1.0);
        self
    }

    /// Set base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Human-readable `family:model` label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}:{}", self.family, self.model)
    }
}

/// Builds provider instances from configuration.
pub trait ProviderFactory: Send + Sync {
    /// Construct the adapter for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot produce a provider.
    fn build(&self, config: &ProviderConfig) -> LlmResult<Box<dyn LlmProvider>>;
}

/// Factory producing the real HTTP adapters.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpProviderFactory;

impl ProviderFactory for HttpProviderFactory {
    fn build(&self, config: &ProviderConfig) -> LlmResult<Box<dyn LlmProvider>> {
        Ok(build_provider(config))
    }
}

/// Select and construct the adapter for a configuration's family.
#[must_use]
pub fn build_provider(config: &ProviderConfig) -> Box<dyn LlmProvider> {
    match config.family {
        ProviderFamily::Anthropic => Box::new(ClaudeProvider::new(config.clone())),
        ProviderFamily::Gemini => Box::new(GeminiProvider::new(config.clone())),
        ProviderFamily::OpenAi
        | ProviderFamily::DeepSeek
        | ProviderFamily::Groq
        | ProviderFamily::OpenRouter
        | ProviderFamily::Mistral
        | ProviderFamily::Xai => Box::new(OpenAiCompatProvider::from_config(config)),
    }
}

/// Map a non-success HTTP response to an error, logging the body.
pub(crate) async fn error_for_status(
    provider: &str,
    response: reqwest::Response,
) -> LlmResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60);
    let body = response.text().await.unwrap_or_default();
    error!(provider, status = %status, body = %body, "Provider API error");

    if status.as_u16() == 429 {
        return Err(LlmError::RateLimitExceeded { retry_after_secs });
    }
    Err(LlmError::ApiRequestFailed(format!("Status {status}: {body}")))
}

/// Build a sensitive header value, rejecting keys with invalid characters.
pub(crate) fn secret_header(value: &str) -> LlmResult<reqwest::header::HeaderValue> {
    let mut header = reqwest::header::HeaderValue::try_from(value)
        .map_err(|e| LlmError::ConfigError(format!("Invalid API key characters: {e}")))?;
    header.set_sensitive(true);
    Ok(header)
}
