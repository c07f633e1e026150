//! Configuration struct definitions.
//!
//! Every field has a serde default so partial files deserialize.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace location.
    pub workspace: WorkspaceSection,
    /// Loop and executor limits.
    pub limits: LimitsSection,
    /// Approval lifetimes.
    pub approval: ApprovalSection,
    /// HTTP server settings.
    pub server: ServerSection,
    /// Provider selection.
    pub providers: ProvidersSection,
    /// Logging.
    pub logging: LoggingSection,
}

/// Workspace location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSection {
    /// Workspace root. The current directory when unset.
    pub root: Option<PathBuf>,
}

/// Loop and executor limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    /// Tool rounds per user message.
    pub max_steps: usize,
    /// Characters of response text per user message.
    pub char_budget: usize,
    /// Characters returned per `read_file` call.
    pub read_char_limit: usize,
    /// Approved command timeout in seconds.
    pub command_timeout_secs: u64,
    /// Captured command output cap in bytes.
    pub max_output_bytes: usize,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_steps: 6,
            char_budget: 30_000,
            read_char_limit: 20_000,
            command_timeout_secs: 30,
            max_output_bytes: 1024 * 1024,
        }
    }
}

impl LimitsSection {
    /// Command timeout as a [`Duration`].
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Approval lifetimes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalSection {
    /// How long a pending request can be granted, in seconds.
    pub request_ttl_secs: u64,
    /// How long a granted token can be used, in seconds.
    pub token_ttl_secs: u64,
    /// How often expired entries are purged, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for ApprovalSection {
    fn default() -> Self {
        Self {
            request_ttl_secs: 300,
            token_ttl_secs: 60,
            sweep_interval_secs: 60,
        }
    }
}

impl ApprovalSection {
    /// Pending request lifetime.
    #[must_use]
    pub fn request_ttl(&self) -> Duration {
        Duration::from_secs(self.request_ttl_secs)
    }

    /// Token lifetime.
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Sweep interval.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Listen address.
    pub bind: String,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_owned(),
            cors_origins: Vec::new(),
        }
    }
}

/// Provider selection. Credentials are never read from files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersSection {
    /// Provider families to skip even when a credential is present.
    pub disabled: Vec<String>,
    /// Maximum tokens per model response.
    pub max_tokens: usize,
    /// Sampling temperature (0.0 - 1.0).
    pub temperature: f64,
}

impl Default for ProvidersSection {
    fn default() -> Self {
        Self {
            disabled: Vec::new(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

impl ProvidersSection {
    /// Whether `family` is disabled (case-insensitive).
    #[must_use]
    pub fn is_disabled(&self, family: &str) -> bool {
        self.disabled.iter().any(|d| d.eq_ignore_ascii_case(family))
    }
}

/// Logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Level or filter directives (e.g. `info,vigil_llm=debug`).
    pub level: String,
    /// `pretty`, `compact`, `json` or `full`.
    pub format: String,
    /// Write daily-rotated files here instead of stderr.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directory: None,
        }
    }
}
