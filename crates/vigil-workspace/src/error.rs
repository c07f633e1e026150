//! Error types for workspace access.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving or inspecting workspace paths.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The path is absolute, contains a parent reference, or escapes the root.
    #[error("path violation: {path} is outside the workspace")]
    PathViolation {
        /// The offending input as supplied by the caller.
        path: String,
    },

    /// The path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The missing input as supplied by the caller.
        path: String,
    },

    /// An empty path was given where defaulting to the root is not allowed.
    #[error("a path is required")]
    MissingPath,

    /// A directory listing was requested for something that is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending input.
        path: String,
    },

    /// A file read was requested for something that is not a regular file.
    #[error("not a file: {path}")]
    NotAFile {
        /// The offending input.
        path: String,
    },

    /// The configured workspace root is unusable.
    #[error("invalid workspace root {path}: {reason}")]
    InvalidRoot {
        /// Root path as configured.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkspaceError {
    /// Whether this error represents an attempted sandbox escape.
    #[must_use]
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::PathViolation { .. })
    }
}

/// Result type for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
