//! Ledger stored as `__Neo4jMigration` nodes linked by `MIGRATED_TO`.
//!
//! Every scope owns a chain that starts at a BASELINE node and grows by
//! linking a new node after the current head (the node with no outgoing
//! `MIGRATED_TO`). Absent project/target values are stored as null and
//! compared through `coalesce(..., '<default>')`.

use crate::error::{LedgerError, LedgerResult};
use crate::record::{Actor, LedgerRecord};
use crate::traits::Ledger;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nm_core::{compare_versions_strict, MigrationDescriptor, MigrationKind, Scope};
use nm_db::{GraphDatabase, Query, Record, Transaction};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};

/// Version of the synthetic record anchoring each chain.
pub const BASELINE_VERSION: &str = "BASELINE";

/// Name of the uniqueness constraint on ledger records.
pub const CONSTRAINT_NAME: &str = "unique_version___Neo4jMigration";

const FIND_ANCHOR: &str = "
MATCH (m:__Neo4jMigration {version: $version})
WHERE coalesce(m.project, '<default>') = coalesce($project, '<default>')
  AND coalesce(m.migrationTarget, '<default>') = coalesce($migration_target, '<default>')
RETURN m.version AS version
";

const CREATE_ANCHOR: &str = "
CREATE (:__Neo4jMigration {
    version: $version,
    project: $project,
    migrationTarget: $migration_target
})
";

const CREATE_CONSTRAINT: &str = "
CREATE CONSTRAINT unique_version___Neo4jMigration IF NOT EXISTS
FOR (m:__Neo4jMigration)
REQUIRE (m.version, m.project, m.migrationTarget) IS UNIQUE
";

const APPEND: &str = "
MATCH (head:__Neo4jMigration)
WHERE coalesce(head.project, '<default>') = coalesce($project, '<default>')
  AND coalesce(head.migrationTarget, '<default>') = coalesce($migration_target, '<default>')
  AND NOT (head)-[:MIGRATED_TO]->(:__Neo4jMigration)
WITH head
CREATE (next:__Neo4jMigration {
    version: $version,
    description: $description,
    type: $type,
    source: $source,
    checksum: $checksum,
    project: $project,
    migrationTarget: $migration_target
})
MERGE (head)-[link:MIGRATED_TO]->(next)
SET link.at = datetime(),
    link.in = duration({seconds: $duration}),
    link.by = $migrated_by,
    link.connectedAs = $connected_as
RETURN next.version AS version
";

const READ_CHAIN: &str = "
MATCH (:__Neo4jMigration {version: $baseline})-[:MIGRATED_TO*]->(m:__Neo4jMigration)
WHERE coalesce(m.project, '<default>') = coalesce($project, '<default>')
  AND coalesce(m.migrationTarget, '<default>') = coalesce($migration_target, '<default>')
MATCH ()-[link:MIGRATED_TO]->(m)
RETURN m.version AS version,
       m.description AS description,
       m.type AS type,
       m.source AS source,
       m.checksum AS checksum,
       toString(link.at) AS applied_at,
       toString(link.in.milliseconds) AS duration_ms,
       link.by AS migrated_by,
       link.connectedAs AS connected_as
";

const READ_CHAIN_COLUMNS: &[&str] = &[
    "version",
    "description",
    "type",
    "source",
    "checksum",
    "applied_at",
    "duration_ms",
    "migrated_by",
    "connected_as",
];

const CURRENT_USER: &str = "SHOW CURRENT USER YIELD user RETURN user";

/// [`Ledger`] backed by Cypher statements against a [`GraphDatabase`].
pub struct CypherLedger {
    db: Arc<dyn GraphDatabase>,
    database: Option<String>,
    scope: Scope,
    anchor_lock: Mutex<()>,
    actor: OnceCell<Actor>,
}

impl CypherLedger {
    /// Ledger for `scope`, stored in `database` (`None` = server default).
    pub fn new(db: Arc<dyn GraphDatabase>, database: Option<String>, scope: Scope) -> Self {
        Self {
            db,
            database,
            scope,
            anchor_lock: Mutex::new(()),
            actor: OnceCell::new(),
        }
    }

    fn scoped(&self, text: &str) -> Query {
        Query::new(text)
            .param("project", self.scope.project())
            .param("migration_target", self.scope.target())
    }
}

#[async_trait]
impl Ledger for CypherLedger {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    async fn ensure_anchor(&self) -> LedgerResult<()> {
        let _guard = self.anchor_lock.lock().await;

        let mut tx = self.db.begin(self.database()).await?;
        let find = self.scoped(FIND_ANCHOR).param("version", BASELINE_VERSION);
        let existing = match tx.fetch(&find, &["version"]).await {
            Ok(rows) => rows,
            Err(e) => {
                tx.rollback().await?;
                return Err(e.into());
            }
        };
        if !existing.is_empty() {
            log::debug!("BASELINE anchor already present for {}", self.scope);
            tx.rollback().await?;
            return Ok(());
        }

        let create = self.scoped(CREATE_ANCHOR).param("version", BASELINE_VERSION);
        if let Err(e) = tx.run(&create).await {
            tx.rollback().await?;
            return Err(e.into());
        }
        tx.commit().await?;
        log::info!("Created BASELINE anchor for {}", self.scope);
        Ok(())
    }

    async fn ensure_uniqueness_constraint(&self) -> LedgerResult<()> {
        self.db
            .run(self.database(), &Query::new(CREATE_CONSTRAINT))
            .await?;
        log::debug!("Ensured constraint {}", CONSTRAINT_NAME);
        Ok(())
    }

    async fn append(
        &self,
        tx: &mut dyn Transaction,
        descriptor: &MigrationDescriptor,
        duration: Duration,
        actor: &Actor,
    ) -> LedgerResult<()> {
        check_database(self, tx)?;
        let query = self
            .scoped(APPEND)
            .param("version", descriptor.version.as_str())
            .param("description", descriptor.description.as_str())
            .param("type", descriptor.kind.as_str())
            .param("source", descriptor.source.as_deref())
            .param("checksum", descriptor.checksum.as_deref())
            .param("duration", duration.as_secs_f64())
            .param("migrated_by", actor.os_user.as_str())
            .param("connected_as", actor.principal.as_deref());

        let rows = tx.fetch(&query, &["version"]).await?;
        match rows.len() {
            0 => Err(LedgerError::MissingAnchor {
                scope: self.scope.clone(),
            }),
            1 => {
                log::debug!("Recorded V{} in ledger for {}", descriptor.version, self.scope);
                Ok(())
            }
            heads => Err(LedgerError::CorruptChain {
                scope: self.scope.clone(),
                heads,
            }),
        }
    }

    async fn read_chain(&self) -> LedgerResult<Vec<LedgerRecord>> {
        let query = self
            .scoped(READ_CHAIN)
            .param("baseline", BASELINE_VERSION);
        let rows = self
            .db
            .fetch(self.database(), &query, READ_CHAIN_COLUMNS)
            .await?;

        let mut records = rows
            .iter()
            .map(decode_record)
            .collect::<LedgerResult<Vec<_>>>()?;
        records.sort_by(|a, b| compare_versions_strict(a.version(), b.version()));
        log::debug!("Read {} ledger records for {}", records.len(), self.scope);
        Ok(records)
    }

    async fn current_actor(&self) -> Actor {
        self.actor
            .get_or_init(|| async {
                let principal = match self
                    .db
                    .fetch(self.database(), &Query::new(CURRENT_USER), &["user"])
                    .await
                {
                    Ok(rows) => rows.first().and_then(|r| r.get("user").map(String::from)),
                    Err(e) => {
                        log::warn!("Could not determine the connected database user: {}", e);
                        None
                    }
                };
                Actor::current(principal)
            })
            .await
            .clone()
    }
}

/// Reject a transaction bound to a database other than the ledger's.
pub(crate) fn check_database(ledger: &dyn Ledger, tx: &dyn Transaction) -> LedgerResult<()> {
    if tx.database() == ledger.database() {
        return Ok(());
    }
    Err(LedgerError::WrongDatabase {
        scope: ledger.scope().clone(),
        expected: ledger.database().map(String::from),
        found: tx.database().map(String::from),
    })
}

fn decode_record(row: &Record) -> LedgerResult<LedgerRecord> {
    let version = row.require("version")?.to_string();
    let corrupt = |message: String| LedgerError::CorruptRecord {
        version: version.clone(),
        message,
    };

    let kind = row
        .get("type")
        .ok_or_else(|| corrupt("missing type".to_string()))?
        .parse::<MigrationKind>()
        .map_err(|e| corrupt(e.to_string()))?;

    let applied_at = row.get("applied_at").and_then(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| log::debug!("Unparseable applied-at '{}' on V{}: {}", raw, version, e))
            .ok()
    });
    let duration_ms = row.get("duration_ms").and_then(|raw| raw.parse::<u64>().ok());

    let descriptor = MigrationDescriptor {
        version: version.clone(),
        description: row.get("description").unwrap_or_default().to_string(),
        kind,
        source: row.get("source").map(String::from),
        checksum: row
            .get("checksum")
            .filter(|c| !c.is_empty())
            .map(String::from),
    };

    Ok(LedgerRecord {
        descriptor,
        applied_at,
        duration_ms,
        migrated_by: row.get("migrated_by").map(String::from),
        connected_as: row.get("connected_as").map(String::from),
    })
}

#[cfg(test)]
#[path = "cypher_test.rs"]
mod tests;
