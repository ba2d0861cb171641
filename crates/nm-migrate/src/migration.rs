//! Runnable migrations: a descriptor plus the body that realises it.

use crate::error::ActionError;
use async_trait::async_trait;
use nm_core::{split_statements, MigrationDescriptor};
use nm_db::{Query, Transaction};
use std::fmt;
use std::sync::Arc;

/// A migration expressed as code.
///
/// Actions run inside the migration's transaction and must not commit or
/// roll it back themselves.
#[async_trait]
pub trait MigrationAction: Send + Sync {
    async fn up(&self, tx: &mut dyn Transaction) -> Result<(), ActionError>;
}

/// What a migration executes.
#[derive(Clone)]
pub enum MigrationBody {
    /// Cypher statements run in order
    Script(Vec<String>),
    /// A compiled-in action
    Action(Arc<dyn MigrationAction>),
}

/// A local migration ready to be analysed and applied.
#[derive(Clone)]
pub struct Migration {
    pub descriptor: MigrationDescriptor,
    pub body: MigrationBody,
}

impl Migration {
    /// Script migration from already-split statements.
    pub fn script(
        version: impl Into<String>,
        description: impl Into<String>,
        source: Option<String>,
        statements: Vec<String>,
    ) -> Self {
        Self {
            descriptor: MigrationDescriptor::script(version, description, source, &statements),
            body: MigrationBody::Script(statements),
        }
    }

    /// Script migration from raw script text.
    pub fn from_script_text(
        version: impl Into<String>,
        description: impl Into<String>,
        source: Option<String>,
        text: &str,
    ) -> Self {
        Self::script(version, description, source, split_statements(text))
    }

    /// Action migration.
    pub fn action(
        version: impl Into<String>,
        description: impl Into<String>,
        source: Option<String>,
        action: Arc<dyn MigrationAction>,
    ) -> Self {
        Self {
            descriptor: MigrationDescriptor::action(version, description, source),
            body: MigrationBody::Action(action),
        }
    }

    pub fn version(&self) -> &str {
        &self.descriptor.version
    }

    /// Run the body inside `tx`.
    pub async fn apply(&self, tx: &mut dyn Transaction) -> Result<(), ActionError> {
        match &self.body {
            MigrationBody::Script(statements) => {
                for statement in statements {
                    tx.run(&Query::new(statement.as_str())).await?;
                }
                Ok(())
            }
            MigrationBody::Action(action) => action.up(tx).await,
        }
    }
}

impl AsRef<MigrationDescriptor> for Migration {
    fn as_ref(&self) -> &MigrationDescriptor {
        &self.descriptor
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.body {
            MigrationBody::Script(statements) => format!("Script({} statements)", statements.len()),
            MigrationBody::Action(_) => "Action".to_string(),
        };
        f.debug_struct("Migration")
            .field("descriptor", &self.descriptor)
            .field("body", &body)
            .finish()
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.descriptor, f)
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
