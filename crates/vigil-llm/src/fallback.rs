//! Ordered provider fallback.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{LlmError, LlmResult, ProviderAttempt};
use crate::provider::{HttpProviderFactory, ProviderConfig, ProviderFactory};
use crate::session::ChatSession;
use crate::types::{LlmToolDefinition, ModelTurn};

/// Opens conversations on the first provider that answers.
#[derive(Clone)]
pub struct FallbackChat {
    configs: Vec<ProviderConfig>,
    factory: Arc<dyn ProviderFactory>,
    system: String,
    tools: Vec<LlmToolDefinition>,
}

impl FallbackChat {
    /// Create a fallback chain over `configs`, tried in order.
    #[must_use]
    pub fn new(configs: Vec<ProviderConfig>) -> Self {
        Self {
            configs,
            factory: Arc::new(HttpProviderFactory),
            system: String::new(),
            tools: Vec::new(),
        }
    }

    /// Use a different provider factory.
    #[must_use]
    pub fn with_factory(mut self, factory: Arc<dyn ProviderFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Set the system prompt for new sessions.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    /// Set the tools offered in new sessions.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<LlmToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Configured candidates, in priority order.
    #[must_use]
    pub fn configs(&self) -> &[ProviderConfig] {
        &self.configs
    }

    /// Send `first_message` to each provider in turn until one answers.
    ///
    /// The returned session stays bound to that provider.
    ///
    /// # Errors
    ///
    /// - [`LlmError::NoProvidersConfigured`] when there are no candidates
    /// - [`LlmError::AllProvidersFailed`] when every candidate failed
    pub async fn start(&self, first_message: &str) -> LlmResult<(ChatSession, ModelTurn)> {
        if self.configs.is_empty() {
            return Err(LlmError::NoProvidersConfigured);
        }

        let mut attempts = Vec::new();
        for config in &self.configs {
            let label = config.label();
            let provider = match self.factory.build(config) {
                Ok(p) => p,
                Err(e) => {
                    warn!(provider = %label, error = %e, "Could not construct provider");
                    attempts.push(ProviderAttempt {
                        label,
                        error: e.to_string(),
                    });
                    continue;
                },
            };

            let mut session = ChatSession::new(provider, config, self.system.clone(), self.tools.clone());
            match session.send_message(first_message).await {
                Ok(turn) => {
                    info!(provider = %label, failed = attempts.len(), "Provider selected");
                    return Ok((session, turn));
                },
                Err(e) => {
                    warn!(provider = %label, error = %e, "Provider failed, trying next");
                    attempts.push(ProviderAttempt {
                        label,
                        error: e.to_string(),
                    });
                },
            }
        }

        Err(LlmError::AllProvidersFailed { attempts })
    }
}

impl std::fmt::Debug for FallbackChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChat")
            .field("configs", &self.configs)
            .field("tools", &self.tools.len())
            .finish_non_exhaustive()
    }
}
