//! In-memory ledger for executor tests

use crate::cypher::check_database;
use crate::error::{LedgerError, LedgerResult};
use crate::record::{Actor, LedgerRecord};
use crate::traits::Ledger;
use async_trait::async_trait;
use nm_core::{MigrationDescriptor, Scope};
use nm_db::{Query, Transaction};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Statement prefix that [`MemoryLedger::append`] runs on the caller's
/// transaction, so commit/rollback of an append is observable on the
/// database double.
pub const APPEND_MARKER: &str = "LEDGER APPEND";

#[derive(Default)]
struct State {
    chain: Vec<LedgerRecord>,
    anchored: bool,
    anchor_calls: usize,
    constraint_calls: usize,
    appended: Vec<MigrationDescriptor>,
    read_calls: usize,
}

/// A [`Ledger`] holding its chain in memory.
///
/// Appends are recorded as soon as they are made; whether they were
/// committed is visible on the transaction through [`APPEND_MARKER`].
#[derive(Default)]
pub struct MemoryLedger {
    scope: Scope,
    database: Option<String>,
    state: Mutex<State>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger whose chain already holds `descriptors` (and an anchor).
    pub fn with_chain(descriptors: Vec<MigrationDescriptor>) -> Self {
        let ledger = Self::default();
        {
            let mut state = ledger.state();
            state.anchored = !descriptors.is_empty();
            state.chain = descriptors.into_iter().map(LedgerRecord::bare).collect();
        }
        ledger
    }

    /// Store the chain in `database`.
    pub fn on_database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Descriptors passed to `append`, in call order.
    pub fn appended(&self) -> Vec<MigrationDescriptor> {
        self.state().appended.clone()
    }

    /// Number of `ensure_anchor` calls.
    pub fn anchor_calls(&self) -> usize {
        self.state().anchor_calls
    }

    /// Number of `ensure_uniqueness_constraint` calls.
    pub fn constraint_calls(&self) -> usize {
        self.state().constraint_calls
    }

    /// Number of `read_chain` calls.
    pub fn read_calls(&self) -> usize {
        self.state().read_calls
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    async fn ensure_anchor(&self) -> LedgerResult<()> {
        let mut state = self.state();
        state.anchor_calls += 1;
        state.anchored = true;
        Ok(())
    }

    async fn ensure_uniqueness_constraint(&self) -> LedgerResult<()> {
        self.state().constraint_calls += 1;
        Ok(())
    }

    async fn append(
        &self,
        tx: &mut dyn Transaction,
        descriptor: &MigrationDescriptor,
        _duration: Duration,
        _actor: &Actor,
    ) -> LedgerResult<()> {
        check_database(self, tx)?;
        let anchored = self.state().anchored;
        if !anchored {
            return Err(LedgerError::MissingAnchor {
                scope: self.scope.clone(),
            });
        }
        tx.run(&Query::new(format!("{} {}", APPEND_MARKER, descriptor.version)))
            .await?;

        let mut state = self.state();
        state.appended.push(descriptor.clone());
        state.chain.push(LedgerRecord::bare(descriptor.clone()));
        Ok(())
    }

    async fn read_chain(&self) -> LedgerResult<Vec<LedgerRecord>> {
        let mut state = self.state();
        state.read_calls += 1;
        Ok(state.chain.clone())
    }

    async fn current_actor(&self) -> Actor {
        Actor::current(None)
    }
}
