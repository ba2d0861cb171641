//! Discovery of local migrations.
//!
//! Script files are named `V<version>__<description>.cypher`, where the
//! version uses `_` or `.` between numeric components and underscores in
//! the description stand for spaces. Files that do not match are ignored.

use crate::error::{LoadProblem, MigrateError, MigrateResult};
use crate::migration::Migration;
use crate::registry::ActionRegistry;
use nm_core::{compare_versions, compare_versions_strict, normalize_version};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static SCRIPT_NAME: OnceLock<Regex> = OnceLock::new();

fn script_name_pattern() -> &'static Regex {
    SCRIPT_NAME.get_or_init(|| {
        Regex::new(r"^V(\d+(?:_\d+)*|\d+(?:\.\d+)*)__([\w ]+)\.cypher$").expect("valid regex")
    })
}

/// Parse a script file name into `(version, description)`.
pub fn parse_script_name(file_name: &str) -> Option<(String, String)> {
    let caps = script_name_pattern().captures(file_name)?;
    let version = normalize_version(&caps[1]);
    let description = caps[2].replace('_', " ").trim().to_string();
    Some((version, description))
}

/// Something that yields the local migrations, sorted by version order.
pub trait MigrationSource {
    fn load(&self) -> MigrateResult<Vec<Migration>>;
}

/// Migrations from a directory of `.cypher` scripts plus registered actions.
pub struct DirectorySource {
    path: PathBuf,
    registry: ActionRegistry,
}

impl DirectorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            registry: ActionRegistry::new(),
        }
    }

    /// Merge the registry's action migrations with the scanned scripts.
    pub fn with_registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = registry;
        self
    }
}

impl MigrationSource for DirectorySource {
    fn load(&self) -> MigrateResult<Vec<Migration>> {
        let mut migrations = scan_scripts(&self.path)?;
        migrations.extend(self.registry.migrations().iter().cloned());
        check_and_sort(migrations)
    }
}

/// Load every migration found in `path`, merged with `registry`.
pub fn load_migrations(path: &Path, registry: &ActionRegistry) -> MigrateResult<Vec<Migration>> {
    DirectorySource::new(path)
        .with_registry(registry.clone())
        .load()
}

fn scan_scripts(dir: &Path) -> MigrateResult<Vec<Migration>> {
    if !dir.is_dir() {
        return Err(MigrateError::MigrationsDirNotFound {
            path: dir.display().to_string(),
        });
    }

    let io_err = |path: &Path, source: std::io::Error| MigrateError::IoWithPath {
        path: path.display().to_string(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut migrations = Vec::new();
    for path in paths {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((version, description)) = parse_script_name(file_name) else {
            log::debug!("Skipping {}: not a migration file name", path.display());
            continue;
        };
        let text = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        migrations.push(Migration::from_script_text(
            version,
            description,
            Some(file_name.to_string()),
            &text,
        ));
    }

    log::debug!("Found {} script migrations in {}", migrations.len(), dir.display());
    Ok(migrations)
}

fn source_label(migration: &Migration) -> String {
    migration
        .descriptor
        .source
        .clone()
        .unwrap_or_else(|| format!("V{}", migration.version()))
}

/// Reject duplicate and order-ambiguous versions, then sort.
fn check_and_sort(migrations: Vec<Migration>) -> MigrateResult<Vec<Migration>> {
    let mut problems = Vec::new();
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut unique = Vec::with_capacity(migrations.len());

    for migration in migrations {
        let label = source_label(&migration);
        if let Some(first) = seen.get(migration.version()) {
            problems.push(LoadProblem::Duplicate {
                version: migration.version().to_string(),
                first: first.clone(),
                second: label,
            });
            continue;
        }
        seen.insert(migration.version().to_string(), label);
        unique.push(migration);
    }

    unique.sort_by(|a, b| compare_versions_strict(a.version(), b.version()));

    for pair in unique.windows(2) {
        if compare_versions(pair[0].version(), pair[1].version()) == Ordering::Equal {
            problems.push(LoadProblem::Ambiguous {
                first_version: pair[0].version().to_string(),
                first: source_label(&pair[0]),
                second_version: pair[1].version().to_string(),
                second: source_label(&pair[1]),
            });
        }
    }

    if problems.is_empty() {
        Ok(unique)
    } else {
        Err(MigrateError::Load { problems })
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
