//! CLI command implementations

pub(crate) mod analyze;
pub(crate) mod common;
pub(crate) mod history;
pub(crate) mod migrate;
