//! Error types for nm-migrate

use nm_core::{CoreError, InvalidVersion};
use nm_db::DbError;
use nm_ledger::LedgerError;
use std::fmt;
use thiserror::Error;

/// Error returned by a migration action.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by an apply observer.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Step of a single migration's unit of work that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStage {
    /// Opening the transaction(s)
    Begin,
    /// Running the migration body
    Body,
    /// Appending the ledger record
    Record,
    /// Committing
    Commit,
}

impl fmt::Display for ApplyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApplyStage::Begin => "begin",
            ApplyStage::Body => "body",
            ApplyStage::Record => "ledger record",
            ApplyStage::Commit => "commit",
        };
        f.write_str(s)
    }
}

/// A problem found while loading local migrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadProblem {
    /// Two migrations share a version
    Duplicate {
        version: String,
        first: String,
        second: String,
    },
    /// Two distinct versions are equal in version order (e.g. `1.2` and `1.2.0`)
    Ambiguous {
        first_version: String,
        first: String,
        second_version: String,
        second: String,
    },
}

impl fmt::Display for LoadProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadProblem::Duplicate {
                version,
                first,
                second,
            } => write!(f, "duplicate version {} ({} and {})", version, first, second),
            LoadProblem::Ambiguous {
                first_version,
                first,
                second_version,
                second,
            } => write!(
                f,
                "versions {} ({}) and {} ({}) are indistinguishable in version order",
                first_version, first, second_version, second
            ),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Migration loading and execution errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// M001: Migrations directory missing
    #[error("[M001] Migrations directory not found: {path}")]
    MigrationsDirNotFound { path: String },

    /// M002: IO error reading a migration
    #[error("[M002] IO error reading {path}: {source}")]
    IoWithPath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// M003: Local migrations are inconsistent
    #[error("[M003] Cannot load local migrations: {}", join(.problems))]
    Load { problems: Vec<LoadProblem> },

    /// M004: Reconciliation found invalid versions
    #[error(
        "[M004] Errors were found during migration verification: {}. Run the `analyze` command for more information.",
        join(.invalid)
    )]
    Validation { invalid: Vec<InvalidVersion> },

    /// M005: Applying a migration failed; its transaction was rolled back
    #[error("[M005] Migration V{version} failed at {stage}: {source}")]
    Apply {
        version: String,
        stage: ApplyStage,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// M006: The apply observer failed after the migration was committed
    #[error("[M006] Migration V{version} was committed, but the apply callback failed: {source}")]
    Observer {
        version: String,
        #[source]
        source: ObserverError,
    },

    /// M007: Ledger error outside a migration's unit of work
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// M008: Database error outside a migration's unit of work
    #[error(transparent)]
    Db(#[from] DbError),

    /// M009: Core error
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
