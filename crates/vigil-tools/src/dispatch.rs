//! Tool registry and call dispatch.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::{debug, warn};
use vigil_llm::{LlmToolDefinition, ToolCall, ToolCallResult};

use crate::artifact::Artifact;
use crate::error::ToolError;
use crate::execute_command::ExecuteCommandTool;
use crate::git::{GitDiffTool, GitStatusTool};
use crate::list_workspace_files::ListWorkspaceFilesTool;
use crate::read_file::ReadFileTool;
use crate::{BuiltinTool, ToolContext};

/// Name of the tool that proposes commands for approval.
pub const EXECUTE_COMMAND: &str = "execute_command";

/// Outcome of one dispatched call.
#[derive(Debug, Clone)]
pub struct Dispatched {
    /// Result to send back to the model.
    pub result: ToolCallResult,
    /// Record for the frontend, if the tool produced one.
    pub artifact: Option<Artifact>,
}

/// Registry of tools offered to the model.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn BuiltinTool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Create a registry with every workspace tool registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ListWorkspaceFilesTool));
        registry.register(Box::new(ReadFileTool));
        registry.register(Box::new(ExecuteCommandTool));
        registry.register(Box::new(GitStatusTool));
        registry.register(Box::new(GitDiffTool));
        registry
    }

    /// Register a tool, replacing any with the same name.
    pub fn register(&mut self, tool: Box<dyn BuiltinTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn BuiltinTool> {
        self.tools.get(name).map(AsRef::as_ref)
    }

    /// Export all tool definitions for the model, sorted by name.
    #[must_use]
    pub fn all_definitions(&self) -> Vec<LlmToolDefinition> {
        self.tools
            .values()
            .map(|t| LlmToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect()
    }

    /// Run one call. Failures become error results for the model; they never
    /// propagate.
    pub async fn dispatch(&self, call: &ToolCall, ctx: &ToolContext) -> Dispatched {
        debug!(tool = %call.name, call_id = %call.id, "Dispatching tool call");

        let outcome = match self.get(&call.name) {
            Some(tool) => tool.execute(call.arguments.clone(), ctx).await,
            None => Err(ToolError::UnknownTool(call.name.clone())),
        };

        match outcome {
            Ok(output) => Dispatched {
                result: ToolCallResult::success(&call.id, output.content),
                artifact: output.artifact,
            },
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "Tool call failed");
                Dispatched {
                    result: ToolCallResult::error(&call.id, json!({ "error": e.to_string() }).to_string()),
                    artifact: None,
                }
            },
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
