//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vigil_workspace::prelude::*;` to import all essential types.

// Errors
pub use crate::{WorkspaceError, WorkspaceResult};

// Path resolution
pub use crate::{PathSandbox, ResolvedPath, WorkspaceRoot};

// Inspection
pub use crate::{FileKind, FileNode, WorkspaceInspector};
