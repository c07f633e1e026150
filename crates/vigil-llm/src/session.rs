//! A conversation bound to one provider.

use tracing::debug;

use crate::error::LlmResult;
use crate::provider::{LlmProvider, ProviderConfig};
use crate::types::{LlmToolDefinition, Message, ModelTurn, ToolCallResult};

/// Conversation transcript plus the provider answering it.
///
/// The provider is fixed for the session's lifetime.
pub struct ChatSession {
    provider: Box<dyn LlmProvider>,
    label: String,
    system: String,
    tools: Vec<LlmToolDefinition>,
    messages: Vec<Message>,
}

impl ChatSession {
    /// Create an empty session.
    #[must_use]
    pub fn new(
        provider: Box<dyn LlmProvider>,
        config: &ProviderConfig,
        system: impl Into<String>,
        tools: Vec<LlmToolDefinition>,
    ) -> Self {
        Self {
            provider,
            label: config.label(),
            system: system.into(),
            tools,
            messages: Vec::new(),
        }
    }

    /// `family:model` label of the provider answering this session.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The transcript so far.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Send a user message and return the model's turn.
    ///
    /// On failure the user message is withdrawn so the transcript stays valid.
    ///
    /// # Errors
    ///
    /// Returns the provider's error.
    pub async fn send_message(&mut self, text: impl Into<String>) -> LlmResult<ModelTurn> {
        self.messages.push(Message::user(text));
        self.exchange().await
    }

    /// Answer the previous turn's tool calls in one batch and return the next turn.
    ///
    /// On failure the results message is withdrawn as well, so the transcript
    /// ends with the assistant's unanswered tool calls.
    ///
    /// # Errors
    ///
    /// Returns the provider's error.
    pub async fn send_tool_results(&mut self, results: Vec<ToolCallResult>) -> LlmResult<ModelTurn> {
        self.messages.push(Message::tool_results(results));
        self.exchange().await
    }

    async fn exchange(&mut self) -> LlmResult<ModelTurn> {
        debug!(provider = %self.label, messages = self.messages.len(), "Requesting model turn");
        match self
            .provider
            .complete(&self.messages, &self.tools, &self.system)
            .await
        {
            Ok(turn) => {
                self.messages.push(turn.to_message());
                Ok(turn)
            },
            Err(e) => {
                self.messages.pop();
                Err(e)
            },
        }
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("label", &self.label)
            .field("tools", &self.tools.len())
            .field("messages", &self.messages.len())
            .finish_non_exhaustive()
    }
}
