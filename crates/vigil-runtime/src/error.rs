//! Runtime error types.

use thiserror::Error;
use vigil_llm::LlmError;
use vigil_tools::ToolError;

/// Errors that end a turn.
///
/// Tool failures inside the loop are fed back to the model and never surface
/// here; [`RuntimeError::Tool`] comes only from executing approved commands.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No provider is configured, so no conversation can start.
    #[error("Configuration error: {0}")]
    Configuration(#[source] LlmError),

    /// The model vendor (or every vendor in the chain) failed.
    #[error("Provider error: {0}")]
    Provider(#[source] LlmError),

    /// Approved command execution failed.
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl From<LlmError> for RuntimeError {
    fn from(e: LlmError) -> Self {
        if e.is_configuration() {
            Self::Configuration(e)
        } else {
            Self::Provider(e)
        }
    }
}

impl RuntimeError {
    /// Whether this is a configuration problem rather than a runtime failure.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
