//! Vigil Test - shared test utilities.
//!
//! Mock providers, deterministic ids and workspace fixtures for use as a
//! dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! vigil-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use vigil_test::{MockLlmProvider, MockProviderFactory, MockTurn};
//!
//! let mock = MockLlmProvider::new(vec![MockTurn::text("hello")]);
//! let factory = MockProviderFactory::new().with_provider("anthropic:claude", mock.clone());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod ids;
pub mod mock_llm;

pub use fixtures::*;
pub use ids::*;
pub use mock_llm::*;

pub use vigil_approval::ManualClock;
