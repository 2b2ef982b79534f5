//! Database schema discovery.
//!
//! Lists user tables and their declared structure so the presentation layer
//! can validate names before asking for profiles or statistics. Structure
//! lookups degrade instead of failing: when introspection returns nothing,
//! column names are recovered from a single sampled row, and a table whose
//! structure cannot be read at all maps to an empty column list.

use indexmap::IndexMap;
use tracing::{instrument, warn};

use crate::analyzers::ensure_identifier;
use crate::analyzers::errors::AnalyzerResult;
use crate::sources::{SqlExecutor, TableColumn};

/// Discovers tables and column structure through a [`SqlExecutor`].
pub struct SchemaAnalyzer<'a> {
    db: &'a dyn SqlExecutor,
}

impl<'a> SchemaAnalyzer<'a> {
    /// Creates an analyzer over the given executor.
    pub fn new(db: &'a dyn SqlExecutor) -> Self {
        Self { db }
    }

    /// Lists user tables, excluding SQLite internals.
    #[instrument(skip(self))]
    pub async fn tables(&self) -> AnalyzerResult<Vec<String>> {
        let rows = self
            .db
            .execute_query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            )
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get("name"))
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect())
    }

    /// Returns the declared structure of one table.
    ///
    /// Falls back to bare column names from a sampled row when introspection
    /// yields nothing; returns an empty list when the table cannot be read
    /// either way.
    #[instrument(skip(self))]
    pub async fn table_structure(&self, table: &str) -> AnalyzerResult<Vec<TableColumn>> {
        ensure_identifier(table)?;

        let columns = self.db.table_columns(table).await;
        if !columns.is_empty() {
            return Ok(columns);
        }

        // No structure reported; recover column names from the data itself.
        match self
            .db
            .execute_query(&format!("SELECT * FROM {table} LIMIT 1"))
            .await
        {
            Ok(rows) => Ok(rows
                .first()
                .map(|row| {
                    row.keys()
                        .map(|name| TableColumn {
                            name: name.clone(),
                            declared_type: "unknown".to_string(),
                            not_null: false,
                            default_value: None,
                            primary_key: false,
                        })
                        .collect()
                })
                .unwrap_or_default()),
            Err(e) => {
                warn!(table, error = %e, "structure fallback query failed");
                Ok(Vec::new())
            }
        }
    }

    /// Returns the structure of every user table.
    ///
    /// A table whose structure cannot be determined maps to an empty column
    /// list rather than failing the whole schema.
    #[instrument(skip(self))]
    pub async fn schema(&self) -> AnalyzerResult<IndexMap<String, Vec<TableColumn>>> {
        let mut schema = IndexMap::new();
        for table in self.tables().await? {
            let structure = match self.table_structure(&table).await {
                Ok(structure) => structure,
                Err(e) => {
                    warn!(table, error = %e, "failed to read table structure");
                    Vec::new()
                }
            };
            schema.insert(table, structure);
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SqliteExecutor;

    fn seeded() -> SqliteExecutor {
        let exec = SqliteExecutor::open_in_memory().unwrap();
        exec.execute_batch(
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER);",
        )
        .unwrap();
        exec
    }

    #[tokio::test]
    async fn lists_user_tables_only() {
        let db = seeded();
        let analyzer = SchemaAnalyzer::new(&db);

        let tables = analyzer.tables().await.unwrap();
        assert_eq!(tables, vec!["customers", "orders"]);
    }

    #[tokio::test]
    async fn structure_reports_declared_columns() {
        let db = seeded();
        let analyzer = SchemaAnalyzer::new(&db);

        let structure = analyzer.table_structure("customers").await.unwrap();
        assert_eq!(structure.len(), 2);
        assert!(structure[0].primary_key);
        assert_eq!(structure[1].name, "name");
        assert!(structure[1].not_null);
    }

    #[tokio::test]
    async fn structure_of_missing_table_is_empty() {
        let db = seeded();
        let analyzer = SchemaAnalyzer::new(&db);
        assert!(analyzer.table_structure("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn schema_maps_every_table() {
        let db = seeded();
        let analyzer = SchemaAnalyzer::new(&db);

        let schema = analyzer.schema().await.unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema["orders"].len(), 2);
    }
}
