//! Scripted in-memory database for tests
//!
//! [`ScriptedDatabase`] records every call made through the
//! [`GraphDatabase`] and [`Transaction`] traits and answers reads from canned
//! rows. Statements are matched by substring ("needle") against the query
//! text, so tests can target a statement without reproducing it verbatim.

use crate::error::{DbError, DbResult};
use crate::query::{Query, Record};
use crate::traits::{GraphDatabase, Transaction};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// A call observed by a [`ScriptedDatabase`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Begin {
        database: Option<String>,
    },
    Run {
        database: Option<String>,
        query: Query,
        in_transaction: bool,
    },
    Commit {
        database: Option<String>,
    },
    Rollback {
        database: Option<String>,
    },
}

#[derive(Default)]
struct State {
    events: Vec<Event>,
    responses: Vec<(String, Vec<Record>)>,
    failures: Vec<String>,
    fail_commits: bool,
    committed: Vec<Query>,
}

impl State {
    fn observe(&mut self, database: Option<&str>, query: &Query, in_transaction: bool) -> DbResult<()> {
        self.events.push(Event::Run {
            database: database.map(String::from),
            query: query.clone(),
            in_transaction,
        });
        if let Some(needle) = self.failures.iter().find(|n| query.text().contains(n.as_str())) {
            return Err(DbError::ExecutionError(format!(
                "scripted failure on '{}'",
                needle
            )));
        }
        Ok(())
    }

    fn rows_for(&self, query: &Query) -> Vec<Record> {
        self.responses
            .iter()
            .find(|(needle, _)| query.text().contains(needle.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default()
    }
}

/// In-memory [`GraphDatabase`] with scripted responses.
#[derive(Clone, Default)]
pub struct ScriptedDatabase {
    state: Arc<Mutex<State>>,
}

impl ScriptedDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    /// Answer reads whose text contains `needle` with `rows`.
    pub fn respond(&self, needle: &str, rows: Vec<Record>) -> &Self {
        self.state().responses.push((needle.to_string(), rows));
        self
    }

    /// Fail any statement whose text contains `needle`.
    pub fn fail_on(&self, needle: &str) -> &Self {
        self.state().failures.push(needle.to_string());
        self
    }

    /// Make every commit fail.
    pub fn fail_commits(&self) -> &Self {
        self.state().fail_commits = true;
        self
    }

    /// All observed calls, in order.
    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    /// Text of every statement run, in order.
    pub fn queries(&self) -> Vec<String> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Run { query, .. } => Some(query.text().to_string()),
                _ => None,
            })
            .collect()
    }

    /// Statements run inside transactions that were committed, in order.
    pub fn committed(&self) -> Vec<Query> {
        self.state().committed.clone()
    }

    /// Number of statements run whose text contains `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.queries().iter().filter(|q| q.contains(needle)).count()
    }

    /// Number of committed statements whose text contains `needle`.
    pub fn count_committed(&self, needle: &str) -> usize {
        self.committed()
            .iter()
            .filter(|q| q.text().contains(needle))
            .count()
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl GraphDatabase for ScriptedDatabase {
    async fn begin(&self, database: Option<&str>) -> DbResult<Box<dyn Transaction>> {
        self.state().events.push(Event::Begin {
            database: database.map(String::from),
        });
        Ok(Box::new(ScriptedTransaction {
            state: Arc::clone(&self.state),
            database: database.map(String::from),
            statements: Vec::new(),
            finished: false,
        }))
    }

    async fn run(&self, database: Option<&str>, query: &Query) -> DbResult<()> {
        let mut state = self.state();
        state.observe(database, query, false)?;
        state.committed.push(query.clone());
        Ok(())
    }

    async fn fetch(
        &self,
        database: Option<&str>,
        query: &Query,
        _columns: &[&str],
    ) -> DbResult<Vec<Record>> {
        let mut state = self.state();
        state.observe(database, query, false)?;
        Ok(state.rows_for(query))
    }

    fn db_type(&self) -> &'static str {
        "scripted"
    }
}

/// Transaction handed out by [`ScriptedDatabase`].
///
/// Statements become visible in [`ScriptedDatabase::committed`] only on
/// commit. Dropping an unfinished transaction records a rollback.
pub struct ScriptedTransaction {
    state: Arc<Mutex<State>>,
    database: Option<String>,
    statements: Vec<Query>,
    finished: bool,
}

#[async_trait]
impl Transaction for ScriptedTransaction {
    async fn run(&mut self, query: &Query) -> DbResult<()> {
        lock(&self.state).observe(self.database.as_deref(), query, true)?;
        self.statements.push(query.clone());
        Ok(())
    }

    async fn fetch(&mut self, query: &Query, _columns: &[&str]) -> DbResult<Vec<Record>> {
        let mut state = lock(&self.state);
        state.observe(self.database.as_deref(), query, true)?;
        self.statements.push(query.clone());
        Ok(state.rows_for(query))
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        let mut this = self;
        this.finished = true;
        let statements = std::mem::take(&mut this.statements);
        let mut state = lock(&this.state);
        if state.fail_commits {
            state.events.push(Event::Rollback {
                database: this.database.clone(),
            });
            return Err(DbError::TransactionError("scripted commit failure".to_string()));
        }
        state.events.push(Event::Commit {
            database: this.database.clone(),
        });
        state.committed.extend(statements);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        let mut this = self;
        this.finished = true;
        lock(&this.state).events.push(Event::Rollback {
            database: this.database.clone(),
        });
        Ok(())
    }

    fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }
}

impl Drop for ScriptedTransaction {
    fn drop(&mut self) {
        if !self.finished {
            lock(&self.state).events.push(Event::Rollback {
                database: self.database.clone(),
            });
        }
    }
}

#[cfg(test)]
#[path = "test_utils_test.rs"]
mod tests;
