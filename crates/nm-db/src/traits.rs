//! Graph database trait definitions

use crate::error::DbResult;
use crate::query::{Query, Record};
use async_trait::async_trait;

/// Session-level access to a graph database server.
///
/// `database` selects a database on multi-database servers; `None` is the
/// server default. Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait GraphDatabase: Send + Sync {
    /// Begin an explicit transaction on `database`.
    async fn begin(&self, database: Option<&str>) -> DbResult<Box<dyn Transaction>>;

    /// Run a statement in its own auto-commit transaction
    async fn run(&self, database: Option<&str>, query: &Query) -> DbResult<()>;

    /// Run a read in its own auto-commit transaction, projecting `columns`
    async fn fetch(
        &self,
        database: Option<&str>,
        query: &Query,
        columns: &[&str],
    ) -> DbResult<Vec<Record>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// An open explicit transaction.
///
/// Dropping a transaction without calling [`commit`](Transaction::commit)
/// must leave none of its effects behind.
#[async_trait]
pub trait Transaction: Send {
    /// Run a statement inside the transaction
    async fn run(&mut self, query: &Query) -> DbResult<()>;

    /// Run a read inside the transaction, projecting `columns`
    async fn fetch(&mut self, query: &Query, columns: &[&str]) -> DbResult<Vec<Record>>;

    /// Commit all effects
    async fn commit(self: Box<Self>) -> DbResult<()>;

    /// Discard all effects
    async fn rollback(self: Box<Self>) -> DbResult<()>;

    /// Database this transaction is bound to
    fn database(&self) -> Option<&str>;
}
