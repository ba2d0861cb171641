//! Error types for nm-ledger

use nm_core::Scope;
use nm_db::DbError;
use thiserror::Error;

/// Ledger errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Underlying database failure (L001)
    #[error("[L001] Ledger database error: {0}")]
    Db(#[from] DbError),

    /// Append found no chain head: the scope has no BASELINE anchor (L002)
    #[error("[L002] No BASELINE anchor for {scope}; the ledger chain must be initialised before appending")]
    MissingAnchor { scope: Scope },

    /// Append matched more than one chain head (L003)
    #[error("[L003] Ledger chain for {scope} has {heads} heads; expected exactly one")]
    CorruptChain { scope: Scope, heads: usize },

    /// A stored record could not be decoded (L004)
    #[error("[L004] Ledger record V{version} is unreadable: {message}")]
    CorruptRecord { version: String, message: String },

    /// Append was handed a transaction on another database (L005)
    #[error("[L005] Ledger for {scope} lives in database {expected:?}, but the transaction is on {found:?}")]
    WrongDatabase {
        scope: Scope,
        expected: Option<String>,
        found: Option<String>,
    },
}

/// Result type alias for LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;
