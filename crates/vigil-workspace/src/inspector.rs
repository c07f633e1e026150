//! Read-only workspace inspection.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::sandbox::{PathSandbox, relative_string};

/// Default number of directory levels returned by [`WorkspaceInspector::list`].
pub const DEFAULT_LIST_DEPTH: usize = 2;

/// Directory names skipped during listing regardless of depth.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "__pycache__", "venv"];

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Regular file (or anything that is not a directory).
    File,
    /// Directory.
    Directory,
}

/// One entry in a workspace listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Entry name.
    pub name: String,
    /// Root-relative path, `/`-separated.
    pub path: String,
    /// Entry kind.
    pub kind: FileKind,
    /// Size in bytes, files only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Children of a directory. `None` when the depth limit was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

impl FileNode {
    /// Whether this node is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

type ListFuture<'a> = Pin<Box<dyn Future<Output = Vec<FileNode>> + Send + 'a>>;

/// Lists and reads files through a [`PathSandbox`].
#[derive(Debug, Clone)]
pub struct WorkspaceInspector {
    sandbox: PathSandbox,
}

impl WorkspaceInspector {
    /// Create an inspector over the given sandbox.
    #[must_use]
    pub fn new(sandbox: PathSandbox) -> Self {
        Self { sandbox }
    }

    /// The underlying sandbox.
    #[must_use]
    pub fn sandbox(&self) -> &PathSandbox {
        &self.sandbox
    }

    /// List the tree under `path` (the root when absent) to `depth` levels.
    ///
    /// Hidden entries and dependency caches are skipped. Unreadable
    /// subdirectories appear with no children rather than failing the call.
    ///
    /// # Errors
    ///
    /// Fails if `path` does not resolve inside the workspace, does not exist,
    /// or is not a directory.
    pub async fn list(&self, path: Option<&str>, depth: Option<usize>) -> WorkspaceResult<Vec<FileNode>> {
        let input = path.unwrap_or_default();
        let resolved = self.sandbox.resolve(input, true).await?;
        let meta = tokio::fs::metadata(resolved.as_path()).await?;
        if !meta.is_dir() {
            return Err(WorkspaceError::NotADirectory {
                path: input.to_string(),
            });
        }

        let depth = depth.unwrap_or(DEFAULT_LIST_DEPTH).max(1);
        debug!(path = %resolved.relative(), depth, "Listing workspace");
        let dir = resolved.into_path_buf();
        Ok(walk(self.sandbox.root().as_path(), dir, depth).await)
    }

    /// Read the full text of the file at `path`.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Fails if `path` is empty, escapes the workspace, does not exist, or
    /// names a directory.
    pub async fn read(&self, path: &str) -> WorkspaceResult<String> {
        let resolved = self.sandbox.resolve(path, false).await?;
        let meta = tokio::fs::metadata(resolved.as_path()).await?;
        if meta.is_dir() {
            return Err(WorkspaceError::NotAFile {
                path: path.to_string(),
            });
        }

        let bytes = tokio::fs::read(resolved.as_path()).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                WorkspaceError::NotFound {
                    path: path.to_string(),
                }
            } else {
                WorkspaceError::Io(e)
            }
        })?;
        debug!(path = %resolved.relative(), bytes = bytes.len(), "Read workspace file");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn is_skipped(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_DIRS.contains(&name)
}

fn walk(root: &Path, dir: PathBuf, remaining: usize) -> ListFuture<'_> {
    Box::pin(async move {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                return Vec::new();
            },
        };

        let mut nodes = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Stopped reading directory");
                    break;
                },
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if is_skipped(&name) {
                continue;
            }

            let path = entry.path();
            // Symlinks are reported but never followed outside the root.
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            let is_dir = if file_type.is_symlink() {
                match tokio::fs::canonicalize(&path).await {
                    Ok(target) if target.starts_with(root) => target.is_dir(),
                    _ => false,
                }
            } else {
                file_type.is_dir()
            };

            let relative = relative_string(root, &path);
            if is_dir {
                let children = if remaining > 1 {
                    Some(walk(root, path, remaining.saturating_sub(1)).await)
                } else {
                    None
                };
                nodes.push(FileNode {
                    name,
                    path: relative,
                    kind: FileKind::Directory,
                    size: None,
                    children,
                });
            } else {
                let size = entry.metadata().await.ok().map(|m| m.len());
                nodes.push(FileNode {
                    name,
                    path: relative,
                    kind: FileKind::File,
                    size,
                    children: None,
                });
            }
        }

        nodes.sort_by(|a, b| b.is_dir().cmp(&a.is_dir()).then_with(|| a.name.cmp(&b.name)));
        nodes
    })
}
