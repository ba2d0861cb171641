//! Neo4j backend over the Bolt protocol

use crate::error::{DbError, DbResult};
use crate::query::{ParamValue, Query, Record};
use crate::traits::{GraphDatabase, Transaction};
use async_trait::async_trait;
use neo4rs::{BoltNull, BoltType, ConfigBuilder, Graph, Row, Txn};
use nm_core::Settings;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Neo4j database backend.
///
/// neo4rs binds the target database into the pool configuration, so one
/// pooled `Graph` is kept per database name and created on first use.
pub struct Neo4jBackend {
    uri: String,
    username: String,
    password: String,
    graphs: Mutex<HashMap<Option<String>, Graph>>,
}

impl Neo4jBackend {
    /// Connect using the connection section of `settings`.
    ///
    /// The server default database is contacted eagerly so that bad
    /// credentials or an unreachable host fail here rather than mid-run.
    pub async fn connect(settings: &Settings) -> DbResult<Self> {
        let backend = Self {
            uri: settings.uri(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            graphs: Mutex::new(HashMap::new()),
        };
        let graph = backend.graph(None).await?;
        graph
            .run(neo4rs::query("RETURN 1"))
            .await
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", backend.uri, e)))?;
        log::debug!(
            "Connected to {} ({}) as {}",
            backend.uri,
            backend.db_type(),
            backend.username
        );
        Ok(backend)
    }

    async fn graph(&self, database: Option<&str>) -> DbResult<Graph> {
        let key = database.map(String::from);
        let mut graphs = self.graphs.lock().await;
        if let Some(graph) = graphs.get(&key) {
            return Ok(graph.clone());
        }

        let mut builder = ConfigBuilder::default()
            .uri(self.uri.as_str())
            .user(self.username.as_str())
            .password(self.password.as_str());
        if let Some(name) = database {
            builder = builder.db(name);
        }
        let config = builder
            .build()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        let graph = Graph::connect(config)
            .await
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", self.uri, e)))?;
        graphs.insert(key, graph.clone());
        Ok(graph)
    }
}

fn to_bolt(value: &ParamValue) -> BoltType {
    match value {
        ParamValue::Null => BoltType::Null(BoltNull),
        ParamValue::Bool(v) => BoltType::from(*v),
        ParamValue::Int(v) => BoltType::from(*v),
        ParamValue::Float(v) => BoltType::from(*v),
        ParamValue::Text(v) => BoltType::from(v.clone()),
    }
}

fn to_neo4rs(query: &Query) -> neo4rs::Query {
    query
        .params()
        .iter()
        .fold(neo4rs::query(query.text()), |q, (name, value)| {
            q.param(name, to_bolt(value))
        })
}

fn to_record(row: &Row, columns: &[&str]) -> DbResult<Record> {
    let mut record = Record::new();
    for column in columns {
        let value = row
            .get::<Option<String>>(column)
            .map_err(|e| DbError::DecodeError {
                column: (*column).to_string(),
                message: e.to_string(),
            })?;
        record.insert(column, value);
    }
    Ok(record)
}

fn with_statement(err: neo4rs::Error, query: &Query) -> DbError {
    match DbError::from(err) {
        DbError::ExecutionError(msg) => DbError::ExecutionError(format!("{}: {}", msg, query)),
        other => other,
    }
}

#[async_trait]
impl GraphDatabase for Neo4jBackend {
    async fn begin(&self, database: Option<&str>) -> DbResult<Box<dyn Transaction>> {
        let graph = self.graph(database).await?;
        let txn = graph
            .start_txn()
            .await
            .map_err(|e| DbError::TransactionError(format!("begin: {}", e)))?;
        Ok(Box::new(Neo4jTransaction {
            txn,
            database: database.map(String::from),
        }))
    }

    async fn run(&self, database: Option<&str>, query: &Query) -> DbResult<()> {
        let graph = self.graph(database).await?;
        log::debug!("Running on {:?}: {}", database, query);
        graph
            .run(to_neo4rs(query))
            .await
            .map_err(|e| with_statement(e, query))
    }

    async fn fetch(
        &self,
        database: Option<&str>,
        query: &Query,
        columns: &[&str],
    ) -> DbResult<Vec<Record>> {
        let graph = self.graph(database).await?;
        log::debug!("Fetching on {:?}: {}", database, query);
        let mut stream = graph
            .execute(to_neo4rs(query))
            .await
            .map_err(|e| with_statement(e, query))?;

        let mut records = Vec::new();
        while let Some(row) = stream.next().await? {
            records.push(to_record(&row, columns)?);
        }
        Ok(records)
    }

    fn db_type(&self) -> &'static str {
        "neo4j"
    }
}

/// An explicit Neo4j transaction.
pub struct Neo4jTransaction {
    txn: Txn,
    database: Option<String>,
}

#[async_trait]
impl Transaction for Neo4jTransaction {
    async fn run(&mut self, query: &Query) -> DbResult<()> {
        log::debug!("Running in transaction: {}", query);
        self.txn
            .run(to_neo4rs(query))
            .await
            .map_err(|e| with_statement(e, query))
    }

    async fn fetch(&mut self, query: &Query, columns: &[&str]) -> DbResult<Vec<Record>> {
        let mut stream = self
            .txn
            .execute(to_neo4rs(query))
            .await
            .map_err(|e| with_statement(e, query))?;

        let mut records = Vec::new();
        while let Some(row) = stream.next(self.txn.handle()).await? {
            records.push(to_record(&row, columns)?);
        }
        Ok(records)
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        self.txn.commit().await.map_err(|e| match DbError::from(e) {
            DbError::ConstraintViolation(msg) => DbError::ConstraintViolation(msg),
            other => DbError::TransactionError(format!("commit: {}", other)),
        })
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        self.txn
            .rollback()
            .await
            .map_err(|e| DbError::TransactionError(format!("rollback: {}", e)))
    }

    fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }
}

#[cfg(test)]
#[path = "neo4j_test.rs"]
mod tests;
