//! Vigil Runtime - the bounded model/tool orchestration loop.
//!
//! [`AgentRuntime::run_turn`] answers one user message. The model may call
//! tools repeatedly, but the loop always terminates:
//!
//! - at most six tool rounds per message
//! - no more tool rounds once the response exceeds the character budget
//! - never another tool round after a command has been proposed for approval
//!
//! Stop notices are prepended to the response so the user sees why it ended.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod config;
pub mod error;
pub mod prompt;
pub mod runtime;

pub use config::{DEFAULT_MAX_STEPS, RuntimeConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use prompt::build_system_prompt;
pub use runtime::{AgentRuntime, FALLBACK_RESPONSE, StopReason, TurnOutput};
