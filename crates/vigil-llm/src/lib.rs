//! Vigil LLM - one chat interface over several model vendors.
//!
//! Each vendor family is an [`LlmProvider`] adapter that translates the
//! neutral transcript into the vendor's wire format and normalizes the reply
//! into a [`ModelTurn`]:
//!
//! - **Anthropic** native Messages API
//! - **Gemini** native `generateContent` API
//! - **OpenAI-compatible** chat completions (`OpenAI`, `DeepSeek`, Groq, ...)
//!
//! A [`FallbackChat`] tries configured providers in priority order and binds
//! the resulting [`ChatSession`] to the first one that answers.
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_llm::{FallbackChat, discover_from_env};
//!
//! let chat = FallbackChat::new(discover_from_env())
//!     .with_system("You are a careful assistant.");
//!
//! let (mut session, turn) = chat.start("What is in this repository?").await?;
//! println!("[{}] {}", session.label(), turn.text);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod claude;
pub mod discovery;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod openai_compat;
pub mod provider;
pub mod session;
pub mod types;

pub use claude::ClaudeProvider;
pub use discovery::{CREDENTIAL_VARS, credential_for, discover_from_env, discover_providers};
pub use error::{LlmError, LlmResult, ProviderAttempt};
pub use fallback::FallbackChat;
pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use provider::{
    HttpProviderFactory, LlmProvider, ProviderConfig, ProviderFactory, ProviderFamily,
    build_provider,
};
pub use session::ChatSession;
pub use types::{
    LlmToolDefinition, Message, MessageContent, MessageRole, ModelTurn, StopReason, ToolCall,
    ToolCallResult, Usage,
};
