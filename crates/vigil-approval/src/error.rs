use std::fmt;

/// Why an approval token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// The token existed but outlived its lifetime. It has been discarded.
    Expired,
    /// The token was never issued or has already been used.
    UnknownOrUsed,
    /// The token was issued for a different command. It has been discarded.
    CommandMismatch,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "approval token expired"),
            Self::UnknownOrUsed => write!(f, "invalid approval token"),
            Self::CommandMismatch => write!(f, "approval token does not cover this command"),
        }
    }
}

/// Errors that can occur during the approval flow.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// The request id is unknown, already granted, or too old.
    #[error("invalid or expired approval request: {request_id}")]
    InvalidOrExpiredRequest {
        /// The request id that was presented.
        request_id: String,
    },

    /// An approval token was refused.
    #[error("permission denied: {0}")]
    PermissionDenied(TokenRejection),

    /// Storage backend error (lock poisoned, persistence failed, etc.).
    #[error("storage error: {0}")]
    Storage(String),
}

impl ApprovalError {
    /// Whether this is a token refusal.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}

/// Result type for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
