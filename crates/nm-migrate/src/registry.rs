//! Compiled-in action migrations.

use crate::migration::{Migration, MigrationAction};
use nm_core::normalize_version;
use std::sync::Arc;

/// Action migrations known to the binary, keyed by version.
///
/// The loader merges these with the scripts it finds on disk, so actions are
/// analysed and ordered exactly like scripts. Each action's source label is
/// its type name.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    migrations: Vec<Migration>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` as migration `version`.
    ///
    /// `version` may use `_` or `.` as separator. Duplicate versions are
    /// reported when the registry is merged by the loader.
    pub fn register<A: MigrationAction + 'static>(
        &mut self,
        version: &str,
        description: &str,
        action: A,
    ) -> &mut Self {
        let source = short_type_name::<A>().to_string();
        self.migrations.push(Migration::action(
            normalize_version(version),
            description.trim(),
            Some(source),
            Arc::new(action),
        ));
        self
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    // Drop generic arguments before taking the last path segment.
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
