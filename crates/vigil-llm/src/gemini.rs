//! Gemini (Google) LLM provider implementation.
//!
//! Gemini function calls carry no vendor id, so this adapter synthesizes
//! `call_{index}` ids when parsing a response. Function responses must name
//! the function they answer; the name is recovered from the call with the
//! same id earlier in the transcript.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{LlmError, LlmResult};
use crate::provider::{LlmProvider, ProviderConfig, error_for_status, secret_header};
use crate::types::{
    LlmToolDefinition, Message, MessageContent, MessageRole, ModelTurn, StopReason, ToolCall,
    Usage,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini LLM provider.
pub struct GeminiProvider {
    client: Client,
    config: ProviderConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(GEMINI_API_BASE)
            .trim_end_matches('/');
        let model = self.config.model.trim_start_matches("models/");
        format!("{base}/models/{model}:generateContent")
    }

    /// Build the API request body.
    fn build_request(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str) -> Value {
        let mut request = serde_json::json!({
            "contents": convert_messages(messages),
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            },
        });

        if !system.is_empty() {
            request["systemInstruction"] = serde_json::json!({ "parts": [{ "text": system }] });
        }

        if !tools.is_empty() {
            let declarations: Vec<Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.input_schema,
                    })
                })
                .collect();
            request["tools"] = serde_json::json!([{ "functionDeclarations": declarations }]);
        }

        request
    }

    /// Parse a response into our types.
    fn parse_response(response: GenerateContentResponse) -> LlmResult<ModelTurn> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            LlmError::InvalidResponse(format!("Gemini returned no candidates: {reason}"))
        })?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if part.thought == Some(true) {
                continue;
            }
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(call) = part.function_call {
                let id = format!("call_{}", tool_calls.len());
                tool_calls.push(ToolCall {
                    id,
                    name: call.name,
                    arguments: call.args.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
                });
            }
        }

        let stop_reason = if !tool_calls.is_empty() {
            StopReason::ToolUse
        } else {
            match candidate.finish_reason.as_deref() {
                Some("MAX_TOKENS") => StopReason::MaxTokens,
                Some("SAFETY" | "RECITATION" | "BLOCKLIST") => StopReason::StopSequence,
                _ => StopReason::EndTurn,
            }
        };

        let usage = response.usage_metadata.unwrap_or_default();
        Ok(ModelTurn {
            text,
            tool_calls,
            stop_reason,
            usage: Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }
}

/// Convert the transcript to Gemini `contents`.
fn convert_messages(messages: &[Message]) -> Vec<Value> {
    // Call id -> function name, for answering with functionResponse parts.
    let mut call_names: HashMap<&str, &str> = HashMap::new();
    let mut contents = Vec::with_capacity(messages.len());

    for message in messages {
        match &message.content {
            MessageContent::Text(text) => {
                let role = match message.role {
                    MessageRole::Assistant => "model",
                    MessageRole::User | MessageRole::Tool => "user",
                };
                contents.push(serde_json::json!({ "role": role, "parts": [{ "text": text }] }));
            },
            MessageContent::ToolCalls { text, calls } => {
                let mut parts = Vec::with_capacity(calls.len().saturating_add(1));
                if !text.is_empty() {
                    parts.push(serde_json::json!({ "text": text }));
                }
                for call in calls {
                    call_names.insert(call.id.as_str(), call.name.as_str());
                    parts.push(serde_json::json!({
                        "functionCall": { "name": call.name, "args": call.arguments }
                    }));
                }
                contents.push(serde_json::json!({ "role": "model", "parts": parts }));
            },
            MessageContent::ToolResults(results) => {
                let parts: Vec<Value> = results
                    .iter()
                    .map(|r| {
                        let name = call_names.get(r.call_id.as_str()).copied().unwrap_or_else(|| {
                            warn!(call_id = %r.call_id, "No matching function call for result");
                            r.call_id.as_str()
                        });
                        serde_json::json!({
                            "functionResponse": {
                                "name": name,
                                "response": { "name": name, "content": r.content },
                            }
                        })
                    })
                    .collect();
                contents.push(serde_json::json!({ "role": "user", "parts": parts }));
            },
        }
    }

    contents
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "Google Gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> LlmResult<ModelTurn> {
        if self.config.api_key.is_empty() {
            return Err(LlmError::ApiKeyNotConfigured {
                provider: "gemini".to_string(),
            });
        }
        let api_key_header = secret_header(&self.config.api_key)?;

        let request_body = self.build_request(messages, tools, system);
        debug!(model = self.config.model, "Sending Gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key_header)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;
        let response = error_for_status("gemini", response).await?;

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Self::parse_response(api_response)
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    thought: Option<bool>,
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    args: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderFamily;
    use crate::types::ToolCallResult;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(ProviderConfig::new(ProviderFamily::Gemini, "key", "gemini-2.5-pro"))
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            provider().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
        let custom = GeminiProvider::new(
            ProviderConfig::new(ProviderFamily::Gemini, "key", "models/gemini-2.5-flash")
                .base_url("http://localhost:9000/v1beta/"),
        );
        assert_eq!(
            custom.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_build_request() {
        let tools = vec![LlmToolDefinition::new(
            "list_workspace_files",
            "List files",
            serde_json::json!({"type": "object", "properties": {}}),
        )];
        let request = provider().build_request(&[Message::user("hi")], &tools, "Be brief");

        assert_eq!(request["systemInstruction"]["parts"][0]["text"], "Be brief");
        assert_eq!(request["contents"][0]["role"], "user");
        assert_eq!(
            request["tools"][0]["functionDeclarations"][0]["name"],
            "list_workspace_files"
        );
        assert_eq!(request["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[test]
    fn test_function_response_uses_call_name() {
        let messages = vec![
            Message::user("read it"),
            Message::assistant_with_tools(
                "",
                vec![
                    ToolCall::new("call_0", "read_file").with_arguments(serde_json::json!({"path": "a"})),
                    ToolCall::new("call_1", "get_git_status"),
                ],
            ),
            Message::tool_results(vec![
                ToolCallResult::success("call_0", "contents"),
                ToolCallResult::success("call_1", "clean"),
            ]),
        ];
        let contents = convert_messages(&messages);

        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "read_file");
        let parts = contents[2]["parts"].as_array().unwrap();
        assert_eq!(parts[0]["functionResponse"]["name"], "read_file");
        assert_eq!(parts[0]["functionResponse"]["response"]["content"], "contents");
        assert_eq!(parts[1]["functionResponse"]["name"], "get_git_status");
    }

    #[test]
    fn test_parse_synthesizes_ids() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "thinking", "thought": true},
                    {"text": "Let me check."},
                    {"functionCall": {"name": "read_file", "args": {"path": "README.md"}}},
                    {"functionCall": {"name": "get_git_status"}}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
        });
        let turn = GeminiProvider::parse_response(serde_json::from_value(raw).unwrap()).unwrap();

        assert_eq!(turn.text, "Let me check.");
        assert_eq!(turn.tool_calls[0].id, "call_0");
        assert_eq!(turn.tool_calls[1].id, "call_1");
        assert_eq!(turn.tool_calls[1].arguments, serde_json::json!({}));
        assert_eq!(turn.stop_reason, StopReason::ToolUse);
        assert_eq!(turn.usage.input_tokens, 12);
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let raw = serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = GeminiProvider::parse_response(serde_json::from_value(raw).unwrap()).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(ref m) if m.contains("SAFETY")));
    }
}
