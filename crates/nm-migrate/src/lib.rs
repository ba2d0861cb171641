//! nm-migrate - Loading and applying migrations
//!
//! Local migrations come from a directory of Cypher scripts plus an
//! [`ActionRegistry`] of compiled-in actions. The [`Executor`] reconciles them
//! with the ledger and applies what is pending.

pub mod error;
pub mod executor;
pub mod loader;
pub mod migration;
pub mod registry;

pub use error::{ActionError, ApplyStage, LoadProblem, MigrateError, MigrateResult, ObserverError};
pub use executor::{AppliedMigration, Executor, MigrationReport};
pub use loader::{load_migrations, parse_script_name, DirectorySource, MigrationSource};
pub use migration::{Migration, MigrationAction, MigrationBody};
pub use registry::ActionRegistry;
