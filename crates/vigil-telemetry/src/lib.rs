//! Vigil Telemetry - logging setup and request correlation.
//!
//! # Example
//!
//! ```rust,no_run
//! use vigil_telemetry::{LogConfig, LogFormat, RequestContext, setup_logging};
//!
//! # fn main() -> Result<(), vigil_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("vigil_llm=debug");
//! setup_logging(&config)?;
//!
//! let ctx = RequestContext::new("cli").with_operation("ask");
//! let _span = ctx.span().entered();
//! tracing::info!("Answering question");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::{RequestContext, RequestGuard};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    LOG_ENV_VAR, LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging,
};
