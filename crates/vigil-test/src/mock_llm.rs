//! Mock LLM provider for testing.
//!
//! Provides [`MockLlmProvider`], a deterministic, queue-based implementation of
//! [`LlmProvider`] that replays pre-configured turns, and
//! [`MockProviderFactory`], which hands those providers to a
//! [`FallbackChat`](vigil_llm::FallbackChat) by label.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use vigil_llm::{
    LlmError, LlmProvider, LlmResult, LlmToolDefinition, Message, ModelTurn, ProviderConfig,
    ProviderFactory, StopReason, ToolCall,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single scripted turn that the mock provider will replay.
#[derive(Debug, Clone)]
pub enum MockTurn {
    /// A text-only response.
    Text(String),
    /// Tool calls, optionally with accompanying text.
    ToolCalls {
        /// Text emitted alongside the calls.
        text: String,
        /// The calls, in order.
        calls: Vec<ToolCall>,
    },
    /// Fail the request with [`LlmError::ApiRequestFailed`].
    Error(String),
}

impl MockTurn {
    /// A text turn.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// A turn requesting `calls` with no text.
    #[must_use]
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self::ToolCalls {
            text: String::new(),
            calls,
        }
    }

    /// A turn requesting `calls` after some text.
    #[must_use]
    pub fn text_and_tools(text: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self::ToolCalls {
            text: text.into(),
            calls,
        }
    }

    /// A failing turn.
    #[must_use]
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }
}

/// Build a tool call for a scripted turn.
#[must_use]
pub fn tool_call(id: &str, name: &str, args: Value) -> ToolCall {
    ToolCall::new(id, name).with_arguments(args)
}

/// One recorded `complete` invocation.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Transcript sent.
    pub messages: Vec<Message>,
    /// Names of the tools offered.
    pub tools: Vec<String>,
    /// System prompt.
    pub system: String,
}

// ---------------------------------------------------------------------------
// MockLlmProvider
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MockState {
    turns: VecDeque<MockTurn>,
    captured: Vec<CapturedRequest>,
}

/// A deterministic, queue-based [`LlmProvider`] for tests.
///
/// Turns are popped from the front of the queue on each call to
/// [`complete`](LlmProvider::complete). When the queue is exhausted an error
/// is returned. Clones share the queue and the captured requests, so a test
/// can keep a handle while a factory hands another clone to the code under
/// test.
#[derive(Debug, Clone)]
pub struct MockLlmProvider {
    name: String,
    model: String,
    state: Arc<Mutex<MockState>>,
}

impl MockLlmProvider {
    /// Create a mock preloaded with the given turns.
    #[must_use]
    pub fn new(turns: Vec<MockTurn>) -> Self {
        Self {
            name: "mock".to_string(),
            model: "mock-model".to_string(),
            state: Arc::new(Mutex::new(MockState {
                turns: VecDeque::from(turns),
                captured: Vec::new(),
            })),
        }
    }

    /// A mock whose every call fails with `msg`.
    #[must_use]
    pub fn failing(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        Self::new(vec![MockTurn::error(msg.clone()); 16])
    }

    /// Override the reported name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Queue another turn.
    pub fn push_turn(&self, turn: MockTurn) {
        self.lock().turns.push_back(turn);
    }

    /// Number of `complete` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().captured.len()
    }

    /// Every request received, in order.
    #[must_use]
    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.lock().captured.clone()
    }

    /// Turns not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lock().turns.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> LlmResult<ModelTurn> {
        let turn = {
            let mut state = self.lock();
            state.captured.push(CapturedRequest {
                messages: messages.to_vec(),
                tools: tools.iter().map(|t| t.name.clone()).collect(),
                system: system.to_string(),
            });
            state.turns.pop_front()
        };

        match turn {
            Some(MockTurn::Text(text)) => Ok(ModelTurn::text(text)),
            Some(MockTurn::ToolCalls { text, calls }) => Ok(ModelTurn {
                text,
                tool_calls: calls,
                stop_reason: StopReason::ToolUse,
                ..ModelTurn::default()
            }),
            Some(MockTurn::Error(msg)) => Err(LlmError::ApiRequestFailed(msg)),
            None => Err(LlmError::ApiRequestFailed(
                "MockLlmProvider: no more turns queued".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// MockProviderFactory
// ---------------------------------------------------------------------------

/// A [`ProviderFactory`] that returns registered mocks by config label.
///
/// Labels with no registered mock fail to build, which a fallback chain
/// treats like any other provider failure.
#[derive(Debug, Clone, Default)]
pub struct MockProviderFactory {
    providers: HashMap<String, MockLlmProvider>,
    built: Arc<Mutex<Vec<String>>>,
}

impl MockProviderFactory {
    /// An empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `provider` for configs labelled `label` (`family:model`).
    #[must_use]
    pub fn with_provider(mut self, label: impl Into<String>, provider: MockLlmProvider) -> Self {
        self.providers.insert(label.into(), provider);
        self
    }

    /// Labels requested so far, in order.
    #[must_use]
    pub fn built(&self) -> Vec<String> {
        self.built
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ProviderFactory for MockProviderFactory {
    fn build(&self, config: &ProviderConfig) -> LlmResult<Box<dyn LlmProvider>> {
        let label = config.label();
        self.built
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(label.clone());
        self.providers
            .get(&label)
            .map(|p| Box::new(p.clone().with_name(config.family.as_str())) as Box<dyn LlmProvider>)
            .ok_or_else(|| LlmError::ConfigError(format!("no mock registered for {label}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_llm::ProviderFamily;

    #[tokio::test]
    async fn test_replays_in_order() {
        let mock = MockLlmProvider::new(vec![
            MockTurn::text("one"),
            MockTurn::tool_calls(vec![tool_call("c1", "read_file", serde_json::json!({}))]),
        ]);

        let first = mock.complete(&[], &[], "sys").await.unwrap();
        assert_eq!(first.text, "one");
        let second = mock.complete(&[], &[], "sys").await.unwrap();
        assert_eq!(second.tool_calls[0].name, "read_file");
        assert!(mock.complete(&[], &[], "sys").await.is_err());
        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.captured()[0].system, "sys");
    }

    #[tokio::test]
    async fn test_factory_shares_state() {
        let mock = MockLlmProvider::new(vec![MockTurn::text("hi")]);
        let factory = MockProviderFactory::new().with_provider("openai:gpt-4o", mock.clone());
        let config = ProviderConfig::new(ProviderFamily::OpenAi, "k", "gpt-4o");

        let provider = factory.build(&config).unwrap();
        assert_eq!(provider.name(), "openai");
        provider.complete(&[], &[], "").await.unwrap();
        assert_eq!(mock.call_count(), 1);

        let other = ProviderConfig::new(ProviderFamily::Groq, "k", "llama");
        assert!(factory.build(&other).is_err());
        assert_eq!(factory.built(), vec!["openai:gpt-4o", "groq:llama"]);
    }
}
