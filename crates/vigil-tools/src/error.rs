//! Tool error types.

use vigil_approval::ApprovalError;
use vigil_workspace::WorkspaceError;

/// Tool execution errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No tool with this name is registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Path resolution or inspection failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// The approval flow refused the operation.
    #[error(transparent)]
    Approval(#[from] ApprovalError),

    /// A read-only helper command exceeded its time limit.
    #[error("Timeout after {0}s")]
    Timeout(u64),

    /// The command ran but failed (non-zero exit, timeout, spawn failure).
    #[error("Execution failed: {message}")]
    ExecutionFailure {
        /// What went wrong.
        message: String,
        /// Output captured before the failure.
        partial_output: String,
    },
}

impl ToolError {
    /// Whether the approval flow refused a token.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Approval(e) if e.is_permission_denied())
    }

    /// Whether a path tried to leave the workspace.
    #[must_use]
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::Workspace(e) if e.is_violation())
    }

    /// Output captured before an execution failure, if any.
    #[must_use]
    pub fn partial_output(&self) -> Option<&str> {
        match self {
            Self::ExecutionFailure { partial_output, .. } => Some(partial_output),
            _ => None,
        }
    }
}

/// Result type for tool execution.
pub type ToolResult<T> = Result<T, ToolError>;
