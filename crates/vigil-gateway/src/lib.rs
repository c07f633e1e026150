//! Vigil Gateway - the HTTP surface where humans approve commands.
//!
//! Routes:
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET` | `/health` | liveness |
//! | `POST` | `/api/chat` | run one turn of the agent loop |
//! | `POST` | `/api/approve` | grant a pending request, returning a token |
//! | `POST` | `/api/execute` | run an approved command with its token |

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod api;
pub mod error;
pub mod routes;
pub mod server;

pub use api::{ApproveRequest, ApproveResponse, ChatRequest, ExecuteRequest, ExecuteResponse};
pub use error::{GatewayError, GatewayResult};
pub use routes::AppState;
pub use server::{GatewayConfig, GatewayServer, api_router, cors_layer};
