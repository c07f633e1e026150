//! Prelude module - commonly used test utilities.
//!
//! Use `use vigil_test::prelude::*;` in test modules.

pub use crate::{
    ManualClock, MockLlmProvider, MockProviderFactory, MockTurn, SequenceIds, TestWorkspace,
    init_test_logging, test_approvals, tool_call,
};
