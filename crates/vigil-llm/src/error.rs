//! LLM-related error types.

use std::fmt::Write as _;

use thiserror::Error;

/// A provider that was tried and failed during fallback.
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    /// Label of the provider (`family:model`).
    pub label: String,
    /// Rendered error.
    pub error: String,
}

fn format_attempts(attempts: &[ProviderAttempt]) -> String {
    let mut out = String::new();
    for (i, attempt) in attempts.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        let _ = write!(out, "{} ({})", attempt.label, attempt.error);
    }
    out
}

/// Errors that can occur with LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// API key not configured.
    #[error("API key not configured for {provider}")]
    ApiKeyNotConfigured {
        /// Provider name.
        provider: String,
    },

    /// API request failed.
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Invalid response from API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No provider credentials are configured at all.
    #[error("no model providers are configured")]
    NoProvidersConfigured,

    /// Every configured provider failed.
    #[error("all {} model providers failed: {}", .attempts.len(), format_attempts(.attempts))]
    AllProvidersFailed {
        /// Each provider tried, in order.
        attempts: Vec<ProviderAttempt>,
    },
}

impl LlmError {
    /// Whether this error means nothing is configured, rather than a vendor failure.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoProvidersConfigured | Self::ConfigError(_) | Self::ApiKeyNotConfigured { .. }
        )
    }
}

/// Result type for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_failed_lists_attempts() {
        let err = LlmError::AllProvidersFailed {
            attempts: vec![
                ProviderAttempt {
                    label: "anthropic:claude".to_string(),
                    error: "HTTP 500".to_string(),
                },
                ProviderAttempt {
                    label: "gemini:flash".to_string(),
                    error: "timeout".to_string(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "all 2 model providers failed: anthropic:claude (HTTP 500); gemini:flash (timeout)"
        );
        assert!(!err.is_configuration());
        assert!(LlmError::NoProvidersConfigured.is_configuration());
    }
}
