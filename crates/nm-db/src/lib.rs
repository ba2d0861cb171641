//! nm-db - Graph database abstraction layer for neomigrate
//!
//! This crate provides the `GraphDatabase` and `Transaction` traits the
//! ledger and executor are written against, the Cypher `Query`/`Record`
//! value types, and the Neo4j implementation.

pub mod error;
pub mod neo4j;
pub mod query;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod traits;

pub use error::{DbError, DbResult};
pub use neo4j::Neo4jBackend;
pub use query::{ParamValue, Query, Record};
pub use traits::{GraphDatabase, Transaction};
