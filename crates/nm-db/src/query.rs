//! Driver-independent Cypher queries and result records.

use crate::error::{DbError, DbResult};
use std::collections::BTreeMap;
use std::fmt;

/// A query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ParamValue::Null, Into::into)
    }
}

/// A Cypher statement with named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    text: String,
    params: BTreeMap<String, ParamValue>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: BTreeMap::new(),
        }
    }

    /// Bind a named parameter (`$name` in the statement text).
    pub fn param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    /// Look up a bound parameter.
    pub fn get_param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text.trim())
    }
}

/// One result row, projected to the requested columns as text.
///
/// Queries alias every returned column and convert non-string values with
/// `toString(...)`, so a row is a map from column name to optional text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<String, Option<String>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for constructing expected rows.
    pub fn with(mut self, column: &str, value: Option<&str>) -> Self {
        self.insert(column, value.map(String::from));
        self
    }

    pub fn insert(&mut self, column: &str, value: Option<String>) {
        self.values.insert(column.to_string(), value);
    }

    /// Value of `column`; `None` for both SQL-style null and absent columns.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).and_then(|v| v.as_deref())
    }

    /// Value of a column that must be present and non-null.
    pub fn require(&self, column: &str) -> DbResult<&str> {
        self.get(column).ok_or_else(|| DbError::DecodeError {
            column: column.to_string(),
            message: "value is null or missing".to_string(),
        })
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
