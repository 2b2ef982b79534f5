//! SQLite executor backed by rusqlite.
//!
//! One connection, used sequentially. The analyzers never run sub-queries
//! concurrently, so a mutex-guarded connection is sufficient and keeps the
//! load on the database bounded to a single statement at a time.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, instrument, warn};

use crate::sources::{ExecutorError, ExecutorResult, Row, SqlExecutor, TableColumn, Value};

/// SQL executor over a single SQLite connection.
pub struct SqliteExecutor {
    conn: Mutex<Connection>,
}

impl SqliteExecutor {
    /// Opens an existing SQLite database file.
    ///
    /// The file must already exist; profiling a database that was never
    /// created is always a caller mistake, so no implicit creation happens.
    pub fn open<P: AsRef<Path>>(path: P) -> ExecutorResult<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| ExecutorError::connection(e.to_string()))?;

        debug!(path = %path.as_ref().display(), "opened SQLite database");
        Ok(Self::from_connection(conn))
    }

    /// Opens a fresh in-memory database. Used by tests and fixtures.
    pub fn open_in_memory() -> ExecutorResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| ExecutorError::connection(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already-open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Executes a batch of statements (DDL, seeding). Not part of the
    /// [`SqlExecutor`] contract, which is read-only.
    pub fn execute_batch(&self, sql: &str) -> ExecutorResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| ExecutorError::query(e.to_string()))
    }

    /// Closes the underlying connection.
    pub fn close(self) -> ExecutorResult<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| ExecutorError::connection("connection mutex poisoned"))?;
        conn.close()
            .map_err(|(_, e)| ExecutorError::connection(e.to_string()))
    }

    fn lock(&self) -> ExecutorResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ExecutorError::connection("connection mutex poisoned"))
    }
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        // The analyzers have no blob semantics; surface blobs as lossy text.
        ValueRef::Blob(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
    }
}

#[async_trait]
impl SqlExecutor for SqliteExecutor {
    #[instrument(skip(self, sql), fields(sql_len = sql.len()))]
    async fn execute_query(&self, sql: &str) -> ExecutorResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| ExecutorError::query(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();

        let mut rows = stmt
            .query([])
            .map_err(|e| ExecutorError::query(e.to_string()))?;

        let mut result = Vec::new();
        while let Some(row) = rows.next().map_err(|e| ExecutorError::query(e.to_string()))? {
            let mut mapped = Row::with_capacity(column_names.len());
            for (idx, name) in column_names.iter().enumerate() {
                let cell = row
                    .get_ref(idx)
                    .map_err(|e| ExecutorError::query(e.to_string()))?;
                mapped.insert(name.clone(), value_from_ref(cell));
            }
            result.push(mapped);
        }

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn table_columns(&self, table_name: &str) -> Vec<TableColumn> {
        let conn = match self.lock() {
            Ok(conn) => conn,
            Err(e) => {
                warn!(table = table_name, error = %e, "schema introspection unavailable");
                return Vec::new();
            }
        };

        let pragma = format!("PRAGMA table_info('{table_name}')");
        let mut stmt = match conn.prepare(&pragma) {
            Ok(stmt) => stmt,
            Err(e) => {
                warn!(table = table_name, error = %e, "failed to prepare table_info");
                return Vec::new();
            }
        };

        let mapped = stmt.query_map([], |row| {
            Ok(TableColumn {
                name: row.get::<_, String>(1)?,
                declared_type: row.get::<_, String>(2).unwrap_or_default(),
                not_null: row.get::<_, i64>(3)? != 0,
                default_value: row
                    .get_ref(4)
                    .map(value_from_ref)
                    .ok()
                    .filter(|v| !v.is_null()),
                primary_key: row.get::<_, i64>(5)? != 0,
            })
        });

        match mapped {
            Ok(iter) => iter.filter_map(|col| col.ok()).collect(),
            Err(e) => {
                warn!(table = table_name, error = %e, "failed to read table_info");
                Vec::new()
            }
        }
    }
}
