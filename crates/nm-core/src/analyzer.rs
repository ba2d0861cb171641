//! Reconciliation of local migrations against the applied ledger chain.
//!
//! [`analyze`] is pure: it classifies every version known locally or remotely
//! as pending, already applied, or invalid, without touching the database.

use crate::migration::MigrationDescriptor;
use crate::version::{compare_versions, compare_versions_strict};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Why a version cannot be reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvalidCause {
    /// Found locally but never applied, while a newer version was applied.
    MissedRemotely,
    /// Applied to the database but no longer found locally.
    MissedLocally,
    /// Changed locally since it was applied.
    Different,
}

impl InvalidCause {
    /// Upper-case name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidCause::MissedRemotely => "MISSED_REMOTELY",
            InvalidCause::MissedLocally => "MISSED_LOCALLY",
            InvalidCause::Different => "DIFFERENT",
        }
    }
}

impl fmt::Display for InvalidCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A version that failed reconciliation, with its cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidVersion {
    pub version: String,
    pub cause: InvalidCause,
}

impl InvalidVersion {
    pub fn new(version: impl Into<String>, cause: InvalidCause) -> Self {
        Self {
            version: version.into(),
            cause,
        }
    }
}

impl fmt::Display for InvalidVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{} {}", self.version, self.cause)
    }
}

/// Result of reconciling local migrations with the ledger.
///
/// `pending` and `invalid` are both in ascending version order, and a version
/// appears in at most one of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis<L> {
    /// Highest applied version, `None` when nothing was applied yet
    pub latest_applied_version: Option<String>,

    /// Local migrations that can be applied, in order
    pub pending: Vec<L>,

    /// Versions whose local and remote state disagree
    pub invalid: Vec<InvalidVersion>,
}

impl<L> Default for Analysis<L> {
    fn default() -> Self {
        Self {
            latest_applied_version: None,
            pending: Vec::new(),
            invalid: Vec::new(),
        }
    }
}

impl<L> Analysis<L> {
    /// True when no invalid versions were found.
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    /// True when valid and nothing is pending.
    pub fn is_up_to_date(&self) -> bool {
        self.is_valid() && self.pending.is_empty()
    }
}

/// Reconcile `local` migrations against the `remote` ledger chain.
///
/// Both inputs must already be sorted by version order; the last remote
/// entry is taken as the latest applied version.
pub fn analyze<L, R>(local: &[L], remote: &[R]) -> Analysis<L>
where
    L: AsRef<MigrationDescriptor> + Clone,
    R: AsRef<MigrationDescriptor>,
{
    let Some(latest) = remote.last() else {
        return Analysis {
            pending: local.to_vec(),
            ..Analysis::default()
        };
    };
    let latest = latest.as_ref().version.clone();

    let local_by_version: HashMap<&str, &L> = local
        .iter()
        .map(|m| (m.as_ref().version.as_str(), m))
        .collect();
    let remote_by_version: HashMap<&str, &MigrationDescriptor> = remote
        .iter()
        .map(|r| (r.as_ref().version.as_str(), r.as_ref()))
        .collect();

    let mut versions: Vec<&str> = local_by_version
        .keys()
        .chain(remote_by_version.keys())
        .copied()
        .collect();
    versions.sort_by(|a, b| compare_versions_strict(a, b));
    versions.dedup();

    let mut analysis = Analysis {
        latest_applied_version: Some(latest.clone()),
        ..Analysis::default()
    };

    for version in versions {
        let local_migration = local_by_version.get(version).copied();
        let remote_migration = remote_by_version.get(version).copied();

        match (local_migration, remote_migration) {
            (Some(l), Some(r)) => {
                if r != l.as_ref() {
                    analysis
                        .invalid
                        .push(InvalidVersion::new(version, InvalidCause::Different));
                }
            }
            (None, Some(_)) => {
                analysis
                    .invalid
                    .push(InvalidVersion::new(version, InvalidCause::MissedLocally));
            }
            (Some(l), None) => {
                if compare_versions(version, &latest) == Ordering::Less {
                    analysis
                        .invalid
                        .push(InvalidVersion::new(version, InvalidCause::MissedRemotely));
                } else {
                    analysis.pending.push(l.clone());
                }
            }
            (None, None) => {}
        }
    }

    analysis
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
