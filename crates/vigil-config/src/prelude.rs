//! Common imports for configuration.
//!
//! ```
//! use vigil_config::prelude::*;
//! ```

pub use crate::{Config, ConfigError, ConfigResult, LoadedConfig};
