//! Vigil Config - layered TOML and environment configuration.
//!
//! # Usage
//!
//! ```rust,no_run
//! use vigil_config::Config;
//!
//! let loaded = Config::load(None).unwrap();
//! println!("Listening on {}", loaded.config.server.bind);
//! ```
//!
//! # Precedence
//!
//! From highest to lowest:
//!
//! 1. `VIGIL_WORKSPACE_ROOT`, `VIGIL_BIND`, `VIGIL_LOG`, `VIGIL_MAX_STEPS`
//! 2. The file passed with `--config`
//! 3. The user config file in the platform config directory
//! 4. Embedded defaults
//!
//! Provider credentials are never read from config files.
//!
//! This crate depends on no other Vigil crate. Conversion into runtime types
//! happens in the binary.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

/// Environment variable overrides.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{LoadOptions, LoadedConfig, user_config_dir};
pub use types::*;

impl Config {
    /// Load with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any layer is malformed or the merged
    /// configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<LoadedConfig> {
        loader::load(explicit)
    }

    /// Validate this configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::ValidationError`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        validate::validate(self)
    }

    /// Serialize to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
