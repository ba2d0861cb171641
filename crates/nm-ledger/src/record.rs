//! Ledger records and actors.

use chrono::{DateTime, Utc};
use nm_core::MigrationDescriptor;
use serde::Serialize;

/// Who applied a migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    /// Operating-system user running the tool
    pub os_user: String,

    /// Database principal of the connection, when it could be determined
    pub principal: Option<String>,
}

impl Actor {
    /// Actor for the current OS user with the given database principal.
    pub fn current(principal: Option<String>) -> Self {
        Self {
            os_user: whoami(),
            principal,
        }
    }
}

/// An applied migration as stored in the ledger chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRecord {
    #[serde(flatten)]
    pub descriptor: MigrationDescriptor,

    /// Server time the record was written
    pub applied_at: Option<DateTime<Utc>>,

    /// Time spent running the body
    pub duration_ms: Option<u64>,

    /// OS user that applied the migration
    pub migrated_by: Option<String>,

    /// Database principal that applied the migration
    pub connected_as: Option<String>,
}

impl LedgerRecord {
    /// A record carrying only a descriptor, without application metadata.
    pub fn bare(descriptor: MigrationDescriptor) -> Self {
        Self {
            descriptor,
            applied_at: None,
            duration_ms: None,
            migrated_by: None,
            connected_as: None,
        }
    }

    pub fn version(&self) -> &str {
        &self.descriptor.version
    }
}

impl AsRef<MigrationDescriptor> for LedgerRecord {
    fn as_ref(&self) -> &MigrationDescriptor {
        &self.descriptor
    }
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
