//! Common imports for embedding the gateway.
//!
//! ```
//! use vigil_gateway::prelude::*;
//! ```

pub use crate::{GatewayConfig, GatewayError, GatewayResult, GatewayServer};
