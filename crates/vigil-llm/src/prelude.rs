//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vigil_llm::prelude::*;` to import all essential types.

// Errors
pub use crate::{LlmError, LlmResult};

// Providers
pub use crate::{LlmProvider, ProviderConfig, ProviderFactory, ProviderFamily};

// Sessions
pub use crate::{ChatSession, FallbackChat};

// Types
pub use crate::{LlmToolDefinition, Message, ModelTurn, ToolCall, ToolCallResult};
