//! Subcommand implementations.

pub(crate) mod ask;
pub(crate) mod providers;
pub(crate) mod serve;
