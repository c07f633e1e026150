//! Approval request and token types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifier of a pending approval request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A bearer token authorizing exactly one command execution.
///
/// `Debug` output is redacted; `Display` yields the full token so it can be
/// handed to the approving human.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalToken(String);

impl ApprovalToken {
    /// Wrap an existing token value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApprovalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        write!(f, "ApprovalToken(****{tail})")
    }
}

impl fmt::Display for ApprovalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApprovalToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Kind of action awaiting approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Run a shell command in the workspace.
    TerminalRun,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TerminalRun => write!(f, "terminal_run"),
        }
    }
}

/// A proposed action waiting for a human decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingApproval {
    /// Request identifier.
    pub request_id: RequestId,
    /// What is being requested.
    pub action: ActionKind,
    /// Justification supplied by the model.
    pub reason: String,
    /// Exact command text.
    pub command: String,
    /// When the request was recorded.
    pub created_at: DateTime<Utc>,
}

/// A granted, not yet consumed, token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveToken {
    /// The token value.
    pub token: ApprovalToken,
    /// The command this token authorizes.
    pub command: String,
    /// The request the token was issued for.
    pub request_id: RequestId,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
}

/// Result of a successful grant.
#[derive(Debug, Clone)]
pub struct Grant {
    /// The single-use token.
    pub token: ApprovalToken,
    /// Remaining lifetime of the token.
    pub expires_in: Duration,
}

/// Whether something created at `since` is older than `ttl` at `now`.
pub(crate) fn is_older_than(since: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    let age = now.signed_duration_since(since);
    match chrono::Duration::from_std(ttl) {
        Ok(ttl) => age > ttl,
        // A TTL too large for chrono never expires.
        Err(_) => false,
    }
}
