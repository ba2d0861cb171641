//! Error types for nm-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] Cypher execution failed: {0}")]
    ExecutionError(String),

    /// Constraint violation, e.g. a concurrent writer won the race (D003)
    #[error("[D003] Constraint violated: {0}")]
    ConstraintViolation(String),

    /// Transaction begin/commit/rollback error (D004)
    #[error("[D004] Transaction failed: {0}")]
    TransactionError(String),

    /// Column missing or not decodable as text (D005)
    #[error("[D005] Cannot read column '{column}': {message}")]
    DecodeError { column: String, message: String },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<neo4rs::Error> for DbError {
    fn from(err: neo4rs::Error) -> Self {
        // neo4rs surfaces server failures as a message carrying the Neo4j
        // status code, so classification is done on the text.
        let msg = err.to_string();
        if msg.contains("ConstraintValidationFailed") || msg.contains("already exists with label")
        {
            DbError::ConstraintViolation(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
