//! Runtime context for CLI commands

use anyhow::{Context, Result};
use nm_core::Settings;
use nm_db::{GraphDatabase, Neo4jBackend};
use nm_ledger::CypherLedger;
use nm_migrate::{ActionRegistry, Executor};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Build the run settings: defaults, then the settings file, then options.
pub(crate) fn resolve_settings(args: &GlobalArgs) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path).context("Failed to load settings file")?,
        None => Settings::default(),
    };

    if let Some(username) = &args.username {
        settings.username = username.clone();
    }
    if let Some(password) = &args.password {
        settings.password = password.clone();
    }
    if let Some(path) = &args.path {
        settings.path = Some(path.clone());
    }
    if let Some(host) = &args.host {
        settings.host = host.clone();
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(scheme) = &args.scheme {
        settings.scheme = scheme.clone();
    }
    if args.project.is_some() {
        settings.project = args.project.clone();
    }
    if args.database.is_some() {
        settings.database = args.database.clone();
    }
    if args.schema_database.is_some() {
        settings.schema_database = args.schema_database.clone();
    }

    log::debug!("Resolved settings: {:?}", settings);
    Ok(settings)
}

/// Runtime context containing resolved settings and a database connection
pub(crate) struct RuntimeContext {
    pub settings: Settings,
    pub db: Arc<dyn GraphDatabase>,
}

impl RuntimeContext {
    /// Resolve settings and connect to the database
    pub async fn new(args: &GlobalArgs) -> Result<Self> {
        let settings = resolve_settings(args)?;
        let backend = Neo4jBackend::connect(&settings)
            .await
            .with_context(|| format!("Failed to connect to {}", settings.uri()))?;
        Ok(Self {
            settings,
            db: Arc::new(backend),
        })
    }

    /// Executor over the migrations directory and registered actions
    pub fn executor(&self, registry: &ActionRegistry) -> Result<Executor> {
        Executor::from_settings(Arc::clone(&self.db), &self.settings, registry)
            .context("Failed to load migrations")
    }

    /// Ledger for the configured scope
    pub fn ledger(&self) -> CypherLedger {
        CypherLedger::new(
            Arc::clone(&self.db),
            self.settings.schema_database().map(String::from),
            self.settings.scope(),
        )
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
