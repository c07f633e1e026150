//! Vigil Tools - the model-facing tool surface and approved command execution.
//!
//! Five tools are offered to the model:
//!
//! - `list_workspace_files` and `read_file` inspect the sandboxed workspace
//! - `execute_command` proposes a shell command; it only creates a pending
//!   approval and never runs anything
//! - `get_git_status` and `get_git_diff` run fixed read-only git commands
//!
//! Approved commands run through [`CommandExecutor`], which consumes the
//! approval token before spawning anything.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod artifact;
pub mod dispatch;
pub mod error;
pub mod exec;
pub mod runner;
pub mod schema;
pub mod truncate;

mod execute_command;
mod git;
mod list_workspace_files;
mod read_file;

#[cfg(test)]
mod test_support;

pub use artifact::{Artifact, GitView};
pub use dispatch::{Dispatched, EXECUTE_COMMAND, ToolRegistry};
pub use error::{ToolError, ToolResult};
pub use exec::CommandExecutor;
pub use execute_command::ExecuteCommandTool;
pub use git::{GitDiffTool, GitStatusTool};
pub use list_workspace_files::ListWorkspaceFilesTool;
pub use read_file::ReadFileTool;
pub use runner::{
    CommandOutput, CommandRunner, CommandSpec, DEFAULT_COMMAND_TIMEOUT, DEFAULT_MAX_OUTPUT_BYTES,
    ShellRunner,
};
pub use truncate::{MAX_OUTPUT_CHARS, READ_CHAR_LIMIT};

use std::sync::Arc;

use serde_json::Value;
use vigil_approval::ApprovalRegistry;
use vigil_workspace::WorkspaceInspector;

/// A tool that executes in-process.
#[async_trait::async_trait]
pub trait BuiltinTool: Send + Sync {
    /// Tool name as the model sees it.
    fn name(&self) -> &'static str;

    /// Human-readable description for the model.
    fn description(&self) -> &'static str;

    /// JSON schema for tool input parameters.
    fn input_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput>;
}

/// What a tool hands back: text for the model, optionally a record for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Result text sent to the model.
    pub content: String,
    /// Structured record for the frontend.
    pub artifact: Option<Artifact>,
}

impl ToolOutput {
    /// Text-only output.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            artifact: None,
        }
    }

    /// Output with an attached artifact.
    #[must_use]
    pub fn with_artifact(content: impl Into<String>, artifact: Artifact) -> Self {
        Self {
            content: content.into(),
            artifact: Some(artifact),
        }
    }
}

/// Shared state available to every tool.
#[derive(Clone)]
pub struct ToolContext {
    /// Sandboxed workspace access.
    pub inspector: WorkspaceInspector,
    /// Where `execute_command` records pending approvals.
    pub approvals: Arc<ApprovalRegistry>,
    /// Runs the read-only git commands.
    pub runner: Arc<dyn CommandRunner>,
    /// Characters of file content returned per read.
    pub read_char_limit: usize,
}

impl ToolContext {
    /// Create a context with the default runner and read limit.
    #[must_use]
    pub fn new(inspector: WorkspaceInspector, approvals: Arc<ApprovalRegistry>) -> Self {
        Self {
            inspector,
            approvals,
            runner: Arc::new(ShellRunner::new()),
            read_char_limit: READ_CHAR_LIMIT,
        }
    }

    /// Replace the runner used by the git tools.
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Set the per-read character limit.
    #[must_use]
    pub fn with_read_char_limit(mut self, limit: usize) -> Self {
        self.read_char_limit = limit;
        self
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("root", &self.inspector.sandbox().root().as_path())
            .field("read_char_limit", &self.read_char_limit)
            .finish_non_exhaustive()
    }
}
