//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vigil_approval::prelude::*;` to import all essential types.

// Errors
pub use crate::{ApprovalError, ApprovalResult, TokenRejection};

// Registry
pub use crate::ApprovalRegistry;

// Types
pub use crate::{ActionKind, ApprovalToken, Grant, PendingApproval, RequestId};

// Seams
pub use crate::{ApprovalStore, Clock, IdSource};
