//! Run settings for neomigrate.
//!
//! [`Settings`] is the single configuration value for a run. It is built once
//! (defaults, then an optional YAML file, then command-line/environment
//! overrides) and handed to the executor by reference.

use crate::error::{CoreError, CoreResult};
use crate::scope::Scope;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Connection and scoping settings for a migration run.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// Bolt URI scheme (`neo4j`, `bolt`, `neo4j+s`, ...)
    pub scheme: String,

    /// Database host
    pub host: String,

    /// Database port
    pub port: u16,

    /// Login of the connecting user
    pub username: String,

    /// Password of the connecting user
    pub password: String,

    /// Directory scanned for migration files
    pub path: Option<PathBuf>,

    /// Project name separating independent chains in one database
    pub project: Option<String>,

    /// Database to migrate (multi-database deployments)
    pub database: Option<String>,

    /// Database holding the migration ledger; defaults to `database`
    pub schema_database: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scheme: "neo4j".to_string(),
            host: "127.0.0.1".to_string(),
            port: 7687,
            username: "neo4j".to_string(),
            password: "neo4j".to_string(),
            path: None,
            project: None,
            database: None,
            schema_database: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("path", &self.path)
            .field("project", &self.project)
            .field("database", &self.database)
            .field("schema_database", &self.schema_database)
            .finish()
    }
}

impl Settings {
    /// Load settings from a YAML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::SettingsNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;

        // An empty file deserializes to `null`, which means "all defaults".
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| CoreError::SettingsParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Connection URI, e.g. `neo4j://127.0.0.1:7687`.
    pub fn uri(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// The database being migrated; `None` means the server default.
    pub fn target_database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// The database holding the ledger.
    ///
    /// Falls back to the migrated database, so that selecting a database
    /// without a schema database keeps the ledger next to the data.
    pub fn schema_database(&self) -> Option<&str> {
        self.schema_database.as_deref().or(self.target_database())
    }

    /// Ledger scope for these settings.
    pub fn scope(&self) -> Scope {
        Scope::resolve(
            self.project.as_deref(),
            self.target_database(),
            self.schema_database(),
        )
    }

    /// Directory holding migration files.
    pub fn migrations_path(&self) -> CoreResult<&Path> {
        self.path
            .as_deref()
            .ok_or_else(|| CoreError::SettingsInvalid {
                message: "a migrations path is required (--path or NEO4J_MIGRATIONS_PATH)"
                    .to_string(),
            })
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
