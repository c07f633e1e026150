//! Provider-neutral conversation types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message in the conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: MessageRole,
    /// Message content.
    pub content: MessageContent,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message carrying tool calls (and any text emitted alongside them).
    #[must_use]
    pub fn assistant_with_tools(text: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::ToolCalls {
                text: text.into(),
                calls,
            },
        }
    }

    /// Create a message answering every call of the preceding assistant turn.
    #[must_use]
    pub fn tool_results(results: Vec<ToolCallResult>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: MessageContent::ToolResults(results),
        }
    }

    /// Get text content, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(s) => Some(s),
            MessageContent::ToolCalls { text, .. } if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    /// Get tool calls if this is a tool call message.
    #[must_use]
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match &self.content {
            MessageContent::ToolCalls { calls, .. } => Some(calls),
            _ => None,
        }
    }
}

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User message.
    User,
    /// Assistant message.
    Assistant,
    /// Tool results.
    Tool,
}

/// Message content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MessageContent {
    /// Plain text content.
    Text(String),
    /// Assistant turn that requested tools.
    ToolCalls {
        /// Text emitted alongside the calls (may be empty).
        text: String,
        /// Calls in the order the model emitted them.
        calls: Vec<ToolCall>,
    },
    /// One batch of results, one per call of the preceding turn.
    ToolResults(Vec<ToolCallResult>),
}

/// A tool call from the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call id, supplied by the vendor or synthesized by the adapter.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Tool arguments (JSON object).
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new tool call with empty arguments.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set arguments.
    #[must_use]
    pub fn with_arguments(mut self, args: Value) -> Self {
        self.arguments = args;
        self
    }
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Id of the call this answers.
    pub call_id: String,
    /// Result content (usually JSON text).
    pub content: String,
    /// Whether this is an error result.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Create a successful result.
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error result.
    pub fn error(call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: error.into(),
            is_error: true,
        }
    }
}

/// Tool definition offered to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmToolDefinition {
    /// Tool name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Input JSON schema.
    pub input_schema: Value,
}

impl LlmToolDefinition {
    /// Create a new tool definition.
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// One model response, normalized across vendors.
#[derive(Debug, Clone, Default)]
pub struct ModelTurn {
    /// Concatenation of every text part of the response.
    pub text: String,
    /// Requested tool calls, in emission order.
    pub tool_calls: Vec<ToolCall>,
    /// Why the model stopped.
    pub stop_reason: StopReason,
    /// Token usage, when the vendor reports it.
    pub usage: Usage,
}

impl ModelTurn {
    /// A text-only turn.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Whether the model requested any tools.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The transcript entry recording this turn.
    #[must_use]
    pub fn to_message(&self) -> Message {
        if self.tool_calls.is_empty() {
            Message::assistant(self.text.clone())
        } else {
            Message::assistant_with_tools(self.text.clone(), self.tool_calls.clone())
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of turn.
    #[default]
    EndTurn,
    /// Hit the output token limit.
    MaxTokens,
    /// Wants to call tools.
    ToolUse,
    /// Hit a stop sequence or content filter.
    StopSequence,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Input tokens.
    pub input_tokens: usize,
    /// Output tokens.
    pub output_tokens: usize,
}

impl Usage {
    /// Total tokens used.
    #[must_use]
    pub fn total(&self) -> usize {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_to_message() {
        let turn = ModelTurn::text("done");
        let msg = turn.to_message();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.text(), Some("done"));

        let turn = ModelTurn {
            text: "checking".to_string(),
            tool_calls: vec![ToolCall::new("c1", "read_file")],
            ..ModelTurn::default()
        };
        let msg = turn.to_message();
        assert_eq!(msg.tool_calls().unwrap().len(), 1);
        assert_eq!(msg.text(), Some("checking"));
    }

    #[test]
    fn test_tool_results_message() {
        let msg = Message::tool_results(vec![
            ToolCallResult::success("a", "ok"),
            ToolCallResult::error("b", "boom"),
        ]);
        assert_eq!(msg.role, MessageRole::Tool);
        let MessageContent::ToolResults(results) = &msg.content else {
            panic!("expected results");
        };
        assert!(!results[0].is_error);
        assert!(results[1].is_error);
    }

    #[test]
    fn test_usage_total_saturates() {
        let usage = Usage {
            input_tokens: usize::MAX,
            output_tokens: 1,
        };
        assert_eq!(usage.total(), usize::MAX);
    }
}
