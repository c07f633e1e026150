//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vigil_tools::prelude::*;` to import all essential types.

// Errors
pub use crate::{ToolError, ToolResult};

// Tools
pub use crate::{BuiltinTool, Dispatched, ToolContext, ToolOutput, ToolRegistry};

// Execution
pub use crate::{CommandExecutor, CommandOutput, CommandRunner, CommandSpec, ShellRunner};

// Artifacts
pub use crate::{Artifact, GitView};
