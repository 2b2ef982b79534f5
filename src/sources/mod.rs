//! Data source contracts: the canonical result shapes and the executor trait.
//!
//! Every analyzer in this crate talks to the database through [`SqlExecutor`]
//! and sees query results in exactly one shape: a sequence of [`Row`]s whose
//! cells are [`Value`]s. Drivers that surface other shapes (positional
//! tuples, blobs, driver-specific types) must normalize at this boundary so
//! the analyzers never branch on result shape.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod sqlite;

pub use sqlite::SqliteExecutor;

/// Result type for executor operations.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Errors surfaced by a SQL executor.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The database could not be opened or the connection is unusable.
    #[error("database connection error: {0}")]
    Connection(String),

    /// A query failed to prepare or execute.
    #[error("query execution failed: {0}")]
    Query(String),
}

impl ExecutorError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }
}

/// A single cell value drawn from a query result.
///
/// Serializes untagged, so rows render as plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Whether this cell is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value: native numbers directly, text via parsing.
    ///
    /// NaN never qualifies as numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) if !f.is_nan() => Some(*f),
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|f| !f.is_nan())
            }
            _ => None,
        }
    }

    /// Non-negative integer view of the value, truncating reals.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Integer(i) if *i >= 0 => Some(*i as u64),
            Value::Real(f) if *f >= 0.0 => Some(*f as u64),
            _ => None,
        }
    }

    /// Borrowed text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One result row: column name to cell value, in select-list order.
pub type Row = IndexMap<String, Value>;

/// Declared column metadata, as reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Column name.
    pub name: String,
    /// Declared SQL type, verbatim (may be empty for untyped columns).
    pub declared_type: String,
    /// Whether the column carries a NOT NULL constraint.
    pub not_null: bool,
    /// Declared default value, if any.
    pub default_value: Option<Value>,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}

/// Executes SQL against one database.
///
/// Implementations own connection management, timeouts, and retries; the
/// analyzers issue their sub-queries strictly sequentially and expect each
/// call to be an independent round trip.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Runs a query and returns all result rows.
    ///
    /// The SQL text is interpolated upstream from pre-sanitized identifiers;
    /// executors do not rewrite or escape it.
    async fn execute_query(&self, sql: &str) -> ExecutorResult<Vec<Row>>;

    /// Returns the declared columns of a table.
    ///
    /// Introspection failure is not an error: implementations return an empty
    /// list and callers fall back to sample-derived column names.
    async fn table_columns(&self, table_name: &str) -> Vec<TableColumn>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_numeric_views() {
        assert_eq!(Value::Integer(42).as_f64(), Some(42.0));
        assert_eq!(Value::Real(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Text("3.25".into()).as_f64(), Some(3.25));
        assert_eq!(Value::Text(" 7 ".into()).as_f64(), Some(7.0));
        assert_eq!(Value::Text("".into()).as_f64(), None);
        assert_eq!(Value::Text("NaN".into()).as_f64(), None);
        assert_eq!(Value::Text("abc".into()).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
        assert_eq!(Value::Boolean(true).as_f64(), None);
    }

    #[test]
    fn value_serializes_as_plain_scalars() {
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::Integer(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&Value::Text("hi".into())).unwrap(),
            "\"hi\""
        );
    }

    #[test]
    fn row_preserves_column_order() {
        let mut row = Row::new();
        row.insert("zulu".to_string(), Value::Integer(1));
        row.insert("alpha".to_string(), Value::Integer(2));
        let keys: Vec<_> = row.keys().cloned().collect();
        assert_eq!(keys, vec!["zulu", "alpha"]);
    }
}
