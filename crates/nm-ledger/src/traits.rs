//! The ledger contract

use crate::error::LedgerResult;
use crate::record::{Actor, LedgerRecord};
use async_trait::async_trait;
use nm_core::{MigrationDescriptor, Scope};
use nm_db::Transaction;
use std::time::Duration;

/// Persistence of the applied-migration chain for one scope.
///
/// A ledger is bound to its scope and schema database at construction.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Scope whose chain this ledger reads and extends
    fn scope(&self) -> &Scope;

    /// Database holding the chain; `None` is the server default
    fn database(&self) -> Option<&str>;

    /// Create the BASELINE anchor for the scope if it does not exist.
    async fn ensure_anchor(&self) -> LedgerResult<()>;

    /// Create the uniqueness constraint on ledger records if it does not exist.
    async fn ensure_uniqueness_constraint(&self) -> LedgerResult<()>;

    /// Link a record for `descriptor` after the current chain head, inside `tx`.
    ///
    /// `tx` must be a transaction on [`Ledger::database`]; any other
    /// transaction is rejected with `WrongDatabase`.
    async fn append(
        &self,
        tx: &mut dyn Transaction,
        descriptor: &MigrationDescriptor,
        duration: Duration,
        actor: &Actor,
    ) -> LedgerResult<()>;

    /// All applied records for the scope, ascending by version order.
    async fn read_chain(&self) -> LedgerResult<Vec<LedgerRecord>>;

    /// The actor to stamp on appended records. Never fails.
    async fn current_actor(&self) -> Actor;
}
