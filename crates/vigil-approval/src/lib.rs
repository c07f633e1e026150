//! Vigil Approval - human-in-the-loop gating of shell commands.
//!
//! Nothing the model proposes runs until a human approves it. The flow has
//! two phases and a single-use token in between:
//!
//! - **Request**: the model proposes a command; it is recorded as pending
//! - **Grant**: a human approves the request id and receives a token
//! - **Consume**: execution presents the token, which is destroyed on use
//!
//! Pending requests live for five minutes and tokens for sixty seconds by
//! default. Expiry is checked lazily on access; an optional sweeper task
//! reclaims memory for entries nobody asks about again.
//!
//! # Example
//!
//! ```
//! use vigil_approval::{ActionKind, ApprovalRegistry};
//!
//! let registry = ApprovalRegistry::new();
//! let id = registry
//!     .request(ActionKind::TerminalRun, "run tests", "npm test")
//!     .unwrap();
//!
//! let grant = registry.grant(&id).unwrap();
//! assert_eq!(registry.validate_and_consume(&grant.token).unwrap(), "npm test");
//!
//! // Tokens are single-use.
//! assert!(registry.validate_and_consume(&grant.token).is_err());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod clock;
/// Error types and results for the approval module.
pub mod error;
pub mod ids;
pub mod registry;
pub mod store;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ApprovalError, ApprovalResult, TokenRejection};
pub use ids::{IdSource, RandomIds};
pub use registry::{ApprovalRegistry, DEFAULT_REQUEST_TTL, DEFAULT_TOKEN_TTL};
pub use store::{ApprovalStore, MemoryApprovalStore};
pub use types::{ActionKind, ActiveToken, ApprovalToken, Grant, PendingApproval, RequestId};
