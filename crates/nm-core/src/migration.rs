//! Migration identity: descriptors and kinds.

use crate::checksum::compute_checksum;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a migration body is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MigrationKind {
    /// A sequence of Cypher statements (persisted as `CYPHER`)
    #[serde(rename = "CYPHER")]
    Script,
    /// A compiled-in executable action (persisted as `ACTION`)
    #[serde(rename = "ACTION")]
    Action,
}

impl MigrationKind {
    /// The value stored in the ledger's `type` property.
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationKind::Script => "CYPHER",
            MigrationKind::Action => "ACTION",
        }
    }
}

impl fmt::Display for MigrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "CYPHER" => Ok(MigrationKind::Script),
            // Older ledgers record code migrations as PYTHON.
            "ACTION" | "PYTHON" => Ok(MigrationKind::Action),
            other => Err(CoreError::UnknownMigrationKind {
                found: other.to_string(),
            }),
        }
    }
}

/// The identity of a migration, as compared between disk and ledger.
///
/// Two descriptors are equal iff version, description, kind, source, and
/// checksum are all equal. Version equality is raw-string equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationDescriptor {
    /// Version string, e.g. `1.2.0`
    pub version: String,

    /// Human-readable description
    pub description: String,

    /// Body kind
    #[serde(rename = "type")]
    pub kind: MigrationKind,

    /// Origin label, usually the file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Content checksum; present for scripts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl MigrationDescriptor {
    /// Describe a script migration, computing its checksum from `statements`.
    pub fn script<S: AsRef<str>>(
        version: impl Into<String>,
        description: impl Into<String>,
        source: Option<String>,
        statements: &[S],
    ) -> Self {
        Self {
            version: version.into(),
            description: description.into(),
            kind: MigrationKind::Script,
            source,
            checksum: Some(compute_checksum(statements)),
        }
    }

    /// Describe an action migration. Actions carry no checksum.
    pub fn action(
        version: impl Into<String>,
        description: impl Into<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            version: version.into(),
            description: description.into(),
            kind: MigrationKind::Action,
            source,
            checksum: None,
        }
    }
}

impl PartialEq for MigrationDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.description == other.description
            && self.kind == other.kind
            && self.source == other.source
            && self.checksum == other.checksum
    }
}

impl Eq for MigrationDescriptor {}

impl AsRef<MigrationDescriptor> for MigrationDescriptor {
    fn as_ref(&self) -> &MigrationDescriptor {
        self
    }
}

impl fmt::Display for MigrationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{} ({})", self.version, self.description)
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
