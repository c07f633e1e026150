//! Path sandbox resolution.
//!
//! [`PathSandbox::resolve`] is the only way untrusted path strings become
//! filesystem paths. Rejection of absolute and parent-relative input happens
//! before any filesystem access; the final containment check runs on the
//! canonical path, so symlinks cannot be used to leave the root.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{WorkspaceError, WorkspaceResult};

/// The canonical workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRoot(PathBuf);

impl WorkspaceRoot {
    /// Canonicalize `path` and use it as the workspace root.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::InvalidRoot`] if the path does not exist or
    /// is not a directory.
    pub fn new(path: impl AsRef<Path>) -> WorkspaceResult<Self> {
        let path = path.as_ref();
        let canonical = std::fs::canonicalize(path).map_err(|e| WorkspaceError::InvalidRoot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !canonical.is_dir() {
            return Err(WorkspaceError::InvalidRoot {
                path: path.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }
        Ok(Self(canonical))
    }

    /// The root as an absolute path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Whether `path` is the root or a descendant of it (component-wise).
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.0)
    }
}

impl fmt::Display for WorkspaceRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A canonical path proven to lie inside the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: String,
}

impl ResolvedPath {
    /// Absolute canonical path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// Path relative to the root, `/`-separated. Empty for the root itself.
    #[must_use]
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Consume into the absolute path.
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.absolute
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.absolute
    }
}

/// Resolves untrusted path strings against a [`WorkspaceRoot`].
#[derive(Debug, Clone)]
pub struct PathSandbox {
    root: WorkspaceRoot,
}

impl PathSandbox {
    /// Create a sandbox for the given root.
    #[must_use]
    pub fn new(root: WorkspaceRoot) -> Self {
        Self { root }
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &WorkspaceRoot {
        &self.root
    }

    /// Resolve `input` to a canonical path inside the root.
    ///
    /// An empty (or whitespace-only) input resolves to the root when
    /// `allow_default` is set.
    ///
    /// # Errors
    ///
    /// - [`WorkspaceError::MissingPath`] for empty input without defaulting
    /// - [`WorkspaceError::PathViolation`] for absolute input, any `..`
    ///   segment, or a canonical target outside the root
    /// - [`WorkspaceError::NotFound`] if the target does not exist
    pub async fn resolve(&self, input: &str, allow_default: bool) -> WorkspaceResult<ResolvedPath> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            if allow_default {
                return Ok(self.root_path());
            }
            return Err(WorkspaceError::MissingPath);
        }

        if is_absolute_input(trimmed) {
            warn!(path = %trimmed, "Rejected absolute path");
            return Err(violation(trimmed));
        }
        if has_parent_segment(trimmed) {
            warn!(path = %trimmed, "Rejected parent-relative path");
            return Err(violation(trimmed));
        }

        let candidate = self.root.as_path().join(trimmed);
        if !self.root.contains(&candidate) {
            warn!(path = %trimmed, "Rejected path outside workspace before canonicalization");
            return Err(violation(trimmed));
        }

        let canonical = match tokio::fs::canonicalize(&candidate).await {
            Ok(p) => p,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(WorkspaceError::NotFound {
                    path: trimmed.to_string(),
                });
            },
            Err(e) => return Err(WorkspaceError::Io(e)),
        };

        // Authoritative check: symlinks are only visible after canonicalization.
        if !self.root.contains(&canonical) {
            warn!(
                path = %trimmed,
                target = %canonical.display(),
                "Rejected path resolving outside workspace"
            );
            return Err(violation(trimmed));
        }

        debug!(path = %trimmed, resolved = %canonical.display(), "Resolved workspace path");
        let relative = relative_string(self.root.as_path(), &canonical);
        Ok(ResolvedPath {
            absolute: canonical,
            relative,
        })
    }

    fn root_path(&self) -> ResolvedPath {
        ResolvedPath {
            absolute: self.root.as_path().to_path_buf(),
            relative: String::new(),
        }
    }
}

fn violation(input: &str) -> WorkspaceError {
    WorkspaceError::PathViolation {
        path: input.to_string(),
    }
}

fn is_absolute_input(input: &str) -> bool {
    if input.starts_with('/') || input.starts_with('\\') {
        return true;
    }
    // Drive prefixes are rejected on every platform.
    let bytes = input.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return true;
    }
    let path = Path::new(input);
    path.is_absolute() || path.has_root()
}

fn has_parent_segment(input: &str) -> bool {
    input.split(['/', '\\']).any(|segment| segment == "..")
}

/// Root-relative, `/`-separated form of a path already known to be inside `root`.
pub(crate) fn relative_string(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(|rel| {
            rel.components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}
