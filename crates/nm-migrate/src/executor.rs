//! Migration executor.
//!
//! A run analyses local migrations against the ledger, refuses to touch the
//! database when any version is invalid, creates the ledger anchor on the
//! first run in a scope, then applies pending migrations one at a time.
//! Each migration's body and ledger record commit together or not at all,
//! and the first failure halts the run.

use crate::error::{ApplyStage, MigrateError, MigrateResult, ObserverError};
use crate::loader::{DirectorySource, MigrationSource};
use crate::migration::Migration;
use crate::registry::ActionRegistry;
use nm_core::{analyze, compare_versions_strict, Analysis, MigrationDescriptor, Settings};
use nm_db::{DbError, DbResult, GraphDatabase, Transaction};
use nm_ledger::{CypherLedger, Ledger};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A migration that was applied and committed.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMigration {
    #[serde(flatten)]
    pub descriptor: MigrationDescriptor,

    /// Time spent running the body
    #[serde(serialize_with = "serialize_millis", rename = "duration_ms")]
    pub duration: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    /// Latest applied version before the run
    pub previous_version: Option<String>,

    /// Migrations committed during the run, in order
    pub applied: Vec<AppliedMigration>,
}

impl MigrationReport {
    /// Latest applied version after the run.
    pub fn current_version(&self) -> Option<&str> {
        self.applied
            .last()
            .map(|m| m.descriptor.version.as_str())
            .or(self.previous_version.as_deref())
    }
}

/// Applies local migrations to one target database.
pub struct Executor {
    db: Arc<dyn GraphDatabase>,
    ledger: Arc<dyn Ledger>,
    migrations: Vec<Migration>,
    database: Option<String>,
}

impl Executor {
    /// Executor over already-loaded `migrations` for `database`.
    pub fn new(
        db: Arc<dyn GraphDatabase>,
        ledger: Arc<dyn Ledger>,
        mut migrations: Vec<Migration>,
        database: Option<String>,
    ) -> Self {
        migrations.sort_by(|a, b| compare_versions_strict(a.version(), b.version()));
        Self {
            db,
            ledger,
            migrations,
            database,
        }
    }

    /// Load migrations from the settings' path and bind a Cypher ledger to
    /// the settings' scope and schema database.
    pub fn from_settings(
        db: Arc<dyn GraphDatabase>,
        settings: &Settings,
        registry: &ActionRegistry,
    ) -> MigrateResult<Self> {
        let migrations = DirectorySource::new(settings.migrations_path()?)
            .with_registry(registry.clone())
            .load()?;
        let ledger = Arc::new(CypherLedger::new(
            Arc::clone(&db),
            settings.schema_database().map(String::from),
            settings.scope(),
        ));
        Ok(Self::new(
            db,
            ledger,
            migrations,
            settings.target_database().map(String::from),
        ))
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    /// Reconcile local migrations with the ledger without changing anything.
    pub async fn analyze(&self) -> MigrateResult<Analysis<Migration>> {
        let chain = self.ledger.read_chain().await?;
        Ok(analyze(&self.migrations, &chain))
    }

    /// Apply every pending migration.
    pub async fn migrate(&self) -> MigrateResult<MigrationReport> {
        self.migrate_with(|_| Ok(())).await
    }

    /// Apply every pending migration, calling `on_apply` after each commit.
    ///
    /// An `on_apply` error halts the run with [`MigrateError::Observer`]; the
    /// migration it was called for stays committed.
    pub async fn migrate_with<F>(&self, mut on_apply: F) -> MigrateResult<MigrationReport>
    where
        F: FnMut(&AppliedMigration) -> Result<(), ObserverError> + Send,
    {
        log::debug!(
            "Migrating {} on {} database {:?}",
            self.ledger.scope(),
            self.db.db_type(),
            self.database
        );
        let analysis = self.analyze().await?;
        if !analysis.is_valid() {
            return Err(MigrateError::Validation {
                invalid: analysis.invalid,
            });
        }

        if analysis.latest_applied_version.is_none() {
            self.ledger.ensure_anchor().await?;
            self.ledger.ensure_uniqueness_constraint().await?;
        }

        let mut report = MigrationReport {
            previous_version: analysis.latest_applied_version,
            applied: Vec::new(),
        };
        if analysis.pending.is_empty() {
            log::info!("Nothing to migrate for {}", self.ledger.scope());
            return Ok(report);
        }

        for migration in &analysis.pending {
            let applied = self.apply_one(migration).await?;
            report.applied.push(applied.clone());
            on_apply(&applied).map_err(|source| MigrateError::Observer {
                version: applied.descriptor.version.clone(),
                source,
            })?;
        }

        Ok(report)
    }

    async fn apply_one(&self, migration: &Migration) -> MigrateResult<AppliedMigration> {
        let version = migration.version();
        let fail = |stage: ApplyStage, source: Box<dyn std::error::Error + Send + Sync>| {
            MigrateError::Apply {
                version: version.to_string(),
                stage,
                source,
            }
        };

        log::debug!("Applying {}", migration);
        let actor = self.ledger.current_actor().await;
        let mut unit = UnitOfWork::begin(
            self.db.as_ref(),
            self.database.as_deref(),
            self.ledger.database(),
        )
        .await
        .map_err(|e| fail(ApplyStage::Begin, e.into()))?;

        let started = Instant::now();
        let body = migration.apply(unit.body()).await;
        let duration = started.elapsed();
        if let Err(e) = body {
            unit.rollback().await;
            return Err(fail(ApplyStage::Body, e));
        }

        let record = self
            .ledger
            .append(unit.ledger(), &migration.descriptor, duration, &actor)
            .await;
        if let Err(e) = record {
            unit.rollback().await;
            return Err(fail(ApplyStage::Record, e.into()));
        }

        unit.commit()
            .await
            .map_err(|e| fail(ApplyStage::Commit, e.into()))?;

        log::info!("Applied {} in {:?}", migration, duration);
        Ok(AppliedMigration {
            descriptor: migration.descriptor.clone(),
            duration,
        })
    }
}

/// The transaction(s) one migration runs in.
///
/// When the ledger lives in the migrated database a single transaction
/// carries both the body and the record. Otherwise the record goes into a
/// second transaction on the ledger database, committed after the body.
struct UnitOfWork {
    body: Box<dyn Transaction>,
    ledger: Option<Box<dyn Transaction>>,
}

impl UnitOfWork {
    async fn begin(
        db: &dyn GraphDatabase,
        database: Option<&str>,
        ledger_database: Option<&str>,
    ) -> DbResult<Self> {
        let body = db.begin(database).await?;
        if database == ledger_database {
            return Ok(Self { body, ledger: None });
        }

        match db.begin(ledger_database).await {
            Ok(ledger) => Ok(Self {
                body,
                ledger: Some(ledger),
            }),
            Err(e) => {
                if let Err(rollback) = body.rollback().await {
                    log::warn!("Rollback after failed begin also failed: {}", rollback);
                }
                Err(e)
            }
        }
    }

    fn body(&mut self) -> &mut dyn Transaction {
        self.body.as_mut()
    }

    fn ledger(&mut self) -> &mut dyn Transaction {
        match self.ledger.as_mut() {
            Some(tx) => tx.as_mut(),
            None => self.body.as_mut(),
        }
    }

    async fn commit(self) -> DbResult<()> {
        let Some(ledger) = self.ledger else {
            return self.body.commit().await;
        };

        if let Err(e) = self.body.commit().await {
            if let Err(rollback) = ledger.rollback().await {
                log::warn!("Ledger rollback after failed commit also failed: {}", rollback);
            }
            return Err(e);
        }
        ledger.commit().await.map_err(|e| {
            log::error!("Migration body committed but its ledger record was not: {}", e);
            DbError::TransactionError(format!("ledger commit after body commit: {}", e))
        })
    }

    async fn rollback(self) {
        if let Err(e) = self.body.rollback().await {
            log::warn!("Rollback failed: {}", e);
        }
        if let Some(ledger) = self.ledger {
            if let Err(e) = ledger.rollback().await {
                log::warn!("Ledger rollback failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
