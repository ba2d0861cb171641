//! nm-ledger - The applied-migration ledger
//!
//! Records of applied migrations form an append-only chain inside the graph,
//! one chain per [`nm_core::Scope`], anchored at a BASELINE node.

pub mod cypher;
pub mod error;
pub mod record;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod traits;

pub use cypher::{CypherLedger, BASELINE_VERSION, CONSTRAINT_NAME};
pub use error::{LedgerError, LedgerResult};
pub use record::{Actor, LedgerRecord};
pub use traits::Ledger;
