//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vigil_runtime::prelude::*;` to import all essential types.

pub use crate::{AgentRuntime, RuntimeConfig, RuntimeError, RuntimeResult, StopReason, TurnOutput};
