//! nm-core - Core library for neomigrate
//!
//! This crate provides the version ordering, migration descriptors, script
//! checksums, ledger scopes, run settings, and the pure reconciliation
//! analyzer shared by every other neomigrate component.

pub mod analyzer;
pub mod checksum;
pub mod error;
pub mod migration;
pub mod scope;
pub mod settings;
pub mod version;

pub use analyzer::{analyze, Analysis, InvalidCause, InvalidVersion};
pub use checksum::{compute_checksum, split_statements, EMPTY_CHECKSUM};
pub use error::{CoreError, CoreResult};
pub use migration::{MigrationDescriptor, MigrationKind};
pub use scope::Scope;
pub use settings::Settings;
pub use version::{compare_versions, compare_versions_strict, normalize_version};
