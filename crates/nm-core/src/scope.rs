//! Ledger scopes.
//!
//! A scope is the `(project, target database)` pair that partitions
//! independent migration chains stored in one physical database. Either
//! component may be absent, which stands for the default scope.

use serde::Serialize;
use std::fmt;

/// Label that absent scope components are coalesced to in ledger queries.
pub const DEFAULT_SCOPE_LABEL: &str = "<default>";

/// The `(project, target)` pair a migration chain belongs to.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scope {
    project: Option<String>,
    target: Option<String>,
}

impl Scope {
    /// Create a scope from raw components.
    pub fn new(project: Option<String>, target: Option<String>) -> Self {
        Self { project, target }
    }

    /// Resolve the scope for migrating `database` with the ledger stored in
    /// `schema_database`.
    ///
    /// Migrating the database that also holds the ledger is the ordinary case
    /// and gets no target identity of its own.
    pub fn resolve(
        project: Option<&str>,
        database: Option<&str>,
        schema_database: Option<&str>,
    ) -> Self {
        let target = if database == schema_database {
            None
        } else {
            database
        };
        Self {
            project: project.map(String::from),
            target: target.map(String::from),
        }
    }

    /// Project label, if any.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Target database label, if any.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// The project label with the default sentinel applied.
    pub fn project_label(&self) -> &str {
        self.project().unwrap_or(DEFAULT_SCOPE_LABEL)
    }

    /// The target label with the default sentinel applied.
    pub fn target_label(&self) -> &str {
        self.target().unwrap_or(DEFAULT_SCOPE_LABEL)
    }
}

/// Sentinel-aware equality: an absent component equals the default label.
impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.project_label() == other.project_label() && self.target_label() == other.target_label()
    }
}

impl Eq for Scope {}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "project={}, target={}",
            self.project_label(),
            self.target_label()
        )
    }
}

#[cfg(test)]
#[path = "scope_test.rs"]
mod tests;
