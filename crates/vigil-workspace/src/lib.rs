//! Vigil Workspace - sandboxed access to the workspace root.
//!
//! Every path handed to Vigil by a language model is untrusted. This crate
//! turns such strings into absolute paths that are guaranteed to sit inside
//! a single canonical workspace root, and offers read-only inspection on top
//! of that guarantee.
//!
//! # Key Concepts
//!
//! - **Root**: one canonicalized directory, fixed for the process lifetime
//! - **Sandbox**: rejects absolute paths, parent references and symlink escapes
//! - **Inspector**: lists trees and reads files through the sandbox only
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_workspace::{PathSandbox, WorkspaceInspector, WorkspaceRoot};
//!
//! let root = WorkspaceRoot::open("/home/user/project").await?;
//! let inspector = WorkspaceInspector::new(PathSandbox::new(root));
//!
//! let tree = inspector.list(None, None).await?;
//! let readme = inspector.read("README.md").await?;
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod error;
pub mod inspector;
pub mod sandbox;

pub use error::{WorkspaceError, WorkspaceResult};
pub use inspector::{DEFAULT_LIST_DEPTH, FileKind, FileNode, WorkspaceInspector};
pub use sandbox::{PathSandbox, ResolvedPath, WorkspaceRoot};
