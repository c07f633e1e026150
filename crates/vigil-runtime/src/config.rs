//! Loop limits.

use vigil_tools::{MAX_OUTPUT_CHARS, READ_CHAR_LIMIT};

/// Maximum tool-dispatch rounds per user message.
pub const DEFAULT_MAX_STEPS: usize = 6;

/// Configuration for the agent runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum tool-dispatch rounds per user message.
    pub max_steps: usize,
    /// Maximum characters of response text.
    pub char_budget: usize,
    /// Characters of file content returned per `read_file` call.
    pub read_char_limit: usize,
    /// System prompt; generated from the workspace when `None`.
    pub system_prompt: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            char_budget: MAX_OUTPUT_CHARS,
            read_char_limit: READ_CHAR_LIMIT,
            system_prompt: None,
        }
    }
}

impl RuntimeConfig {
    /// Set the step limit.
    #[must_use]
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    /// Set the character budget.
    #[must_use]
    pub fn with_char_budget(mut self, chars: usize) -> Self {
        self.char_budget = chars;
        self
    }

    /// Set the per-read character limit.
    #[must_use]
    pub fn with_read_char_limit(mut self, chars: usize) -> Self {
        self.read_char_limit = chars;
        self
    }

    /// Use a fixed system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}
