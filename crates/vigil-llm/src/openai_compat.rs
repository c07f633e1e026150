//! OpenAI-compatible LLM provider implementation.
//!
//! Works with:
//! - `OpenAI` API
//! - `DeepSeek`, Groq, `OpenRouter`, Mistral and xAI
//! - Local servers (LM Studio, Ollama, vLLM) via a custom endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{LlmError, LlmResult};
use crate::provider::{
    LlmProvider, ProviderConfig, ProviderFamily, error_for_status, secret_header,
};
use crate::types::{
    LlmToolDefinition, Message, MessageContent, MessageRole, ModelTurn, StopReason, ToolCall,
    Usage,
};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    client: Client,
    family: ProviderFamily,
    model: String,
    max_tokens: usize,
    temperature: f64,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiCompatProvider {
    /// Create a provider from configuration, using the family's default endpoint
    /// unless the configuration overrides it.
    #[must_use]
    pub fn from_config(config: &ProviderConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .or_else(|| config.family.default_endpoint().map(ToString::to_string))
            .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
        Self {
            client: Client::new(),
            family: config.family,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            base_url,
            api_key: Some(config.api_key.clone()).filter(|k| !k.is_empty()),
        }
    }

    /// Build the request body.
    fn build_request(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str) -> Value {
        let mut openai_messages = Vec::new();

        if !system.is_empty() {
            openai_messages.push(serde_json::json!({
                "role": "system",
                "content": system
            }));
        }

        for msg in messages {
            openai_messages.extend(convert_message(msg));
        }

        let mut request = serde_json::json!({
            "model": self.model,
            "messages": openai_messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        if !tools.is_empty() {
            let openai_tools: Vec<Value> = tools
                .iter()
                .map(|t| {
                    // Strict endpoints reject a schema without `properties`.
                    let mut parameters = t.input_schema.clone();
                    if let Some(obj) = parameters.as_object_mut() {
                        obj.entry("properties")
                            .or_insert_with(|| serde_json::json!({}));
                    }
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": parameters
                        }
                    })
                })
                .collect();
            request["tools"] = Value::Array(openai_tools);
        }

        request
    }

    fn parse_response(response: OpenAiResponse) -> LlmResult<ModelTurn> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                arguments: parse_arguments(&tc.function.name, tc.function.arguments),
                id: tc.id,
                name: tc.function.name,
            })
            .collect();

        let stop_reason = match choice.finish_reason.as_deref() {
            Some("length") => StopReason::MaxTokens,
            Some("tool_calls") => StopReason::ToolUse,
            Some("content_filter") => StopReason::StopSequence,
            _ if !tool_calls.is_empty() => StopReason::ToolUse,
            _ => StopReason::EndTurn,
        };

        let usage = response.usage.unwrap_or_default();
        Ok(ModelTurn {
            text: choice.message.content.unwrap_or_default(),
            tool_calls,
            stop_reason,
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

/// Decode a call's JSON-string arguments.
///
/// Unparsable arguments are kept as the raw string so tool dispatch can
/// report the failure for that call alone.
fn parse_arguments(tool: &str, raw: String) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(serde_json::Map::new());
    }
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(tool, error = %e, "Model sent unparsable tool arguments");
            Value::String(raw)
        },
    }
}

/// Arguments as the wire expects them. A raw string is echoed unchanged.
fn arguments_string(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Convert one transcript entry. Tool results expand to one message per call.
fn convert_message(msg: &Message) -> Vec<Value> {
    match &msg.content {
        MessageContent::Text(text) => {
            let role = match msg.role {
                MessageRole::User | MessageRole::Tool => "user",
                MessageRole::Assistant => "assistant",
            };
            vec![serde_json::json!({
                "role": role,
                "content": text
            })]
        },
        MessageContent::ToolCalls { text, calls } => {
            let openai_tool_calls: Vec<Value> = calls
                .iter()
                .map(|tc| {
                    serde_json::json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            "arguments": arguments_string(&tc.arguments)
                        }
                    })
                })
                .collect();

            let content = if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.clone())
            };
            vec![serde_json::json!({
                "role": "assistant",
                "content": content,
                "tool_calls": openai_tool_calls
            })]
        },
        MessageContent::ToolResults(results) => results
            .iter()
            .map(|result| {
                serde_json::json!({
                    "role": "tool",
                    "tool_call_id": result.call_id,
                    "content": result.content
                })
            })
            .collect(),
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        self.family.as_str()
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
        // Remote endpoints require an API key; local endpoints typically do not.
        if self.api_key.is_none() && !is_local_url(&self.base_url) {
            return Err(LlmError::ApiKeyNotConfigured {
                provider: self.family.to_string(),
            });
        }

        let request_body = self.build_request(messages, tools, system);

        debug!(
            model = %self.model,
            base_url = %self.base_url,
            "Making OpenAI-compatible completion request"
        );

        let mut request = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "application/json");

        if let Some(ref api_key) = self.api_key {
            request = request.header("Authorization", secret_header(&format!("Bearer {api_key}"))?);
        }

        let response = request.json(&request_body).send().await?;
        let response = error_for_status(self.family.as_str(), response).await?;

        let response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Self::parse_response(response)
    }
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("family", &self.family)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

/// Check whether a URL points to a local endpoint (localhost, 127.0.0.1, etc.)
/// where an API key is typically not required.
fn is_local_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("localhost") || lower.contains("127.0.0.1") || lower.contains("[::1]")
}
