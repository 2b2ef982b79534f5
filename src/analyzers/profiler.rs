//! Table profiling: detected types, schema metadata, and sample statistics
//! for every column of a table.
//!
//! Type detection runs over a bounded sample (the first 1000 rows by
//! default) while `row_count` always reflects the true full-table count.
//! Declared types, primary-key flags, and nullability come from schema
//! introspection; when introspection yields nothing the profile falls back
//! to sample-derived column names with neutral metadata.
//!
//! Profiles are rebuilt from scratch on every call: two profiles of an
//! unchanged table are structurally identical.
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlite_eda::analyzers::profiler::TableProfiler;
//! use sqlite_eda::sources::SqliteExecutor;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let db = SqliteExecutor::open("shop.db").unwrap();
//! let profiler = TableProfiler::new();
//!
//! let profile = profiler.profile(&db, "orders").await.unwrap();
//! for column in &profile.columns {
//!     println!("{}: {:?} ({}%)", column.name, column.detected_type, column.confidence);
//! }
//! # })
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::analyzers::ensure_identifier;
use crate::analyzers::errors::AnalyzerResult;
use crate::analyzers::inference::{ColumnTypeInfo, DetectedType, SampleStats, TypeDetector};
use crate::sources::{SqlExecutor, Value};

const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// Configuration for table profiling.
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    /// Maximum number of rows sampled for type detection.
    pub sample_size: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

/// Builder for [`TableProfiler`].
pub struct TableProfilerBuilder {
    config: ProfilerConfig,
}

impl TableProfilerBuilder {
    /// Set the type-detection sample size.
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size.max(1);
        self
    }

    /// Build the profiler.
    pub fn build(self) -> TableProfiler {
        TableProfiler {
            config: self.config,
            detector: TypeDetector::new(),
        }
    }
}

/// Profile of a single column within a [`TableProfile`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    /// Declared SQL type from the schema, `"unknown"` when unavailable.
    pub declared_type: String,
    pub detected_type: DetectedType,
    pub confidence: u8,
    pub examples: Vec<Value>,
    pub primary_key: bool,
    pub nullable: bool,
    pub null_count: u64,
    pub unique_count: usize,
    pub stats: SampleStats,
}

/// Full per-table profile combining schema metadata and sample statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableProfile {
    pub table_name: String,
    /// True full-table row count, independent of the sampling bound.
    pub row_count: u64,
    pub column_count: usize,
    pub columns: Vec<ColumnProfile>,
}

/// Profiles tables by combining sampled type detection with schema metadata.
pub struct TableProfiler {
    config: ProfilerConfig,
    detector: TypeDetector,
}

impl Default for TableProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl TableProfiler {
    /// Creates a profiler with default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for a customized profiler.
    pub fn builder() -> TableProfilerBuilder {
        TableProfilerBuilder {
            config: ProfilerConfig::default(),
        }
    }

    /// Detects the dominant type of every column from a bounded sample.
    ///
    /// Returns a map in sample-column order. An empty table yields an empty
    /// map; that is a valid result, not an error.
    #[instrument(skip(self, db))]
    pub async fn detect_column_types(
        &self,
        db: &dyn SqlExecutor,
        table: &str,
    ) -> AnalyzerResult<IndexMap<String, ColumnTypeInfo>> {
        ensure_identifier(table)?;

        let rows = db
            .execute_query(&format!(
                "SELECT * FROM {table} LIMIT {}",
                self.config.sample_size
            ))
            .await?;

        let mut result = IndexMap::new();
        let Some(first) = rows.first() else {
            return Ok(result);
        };

        let columns: Vec<String> = first.keys().cloned().collect();
        for column in &columns {
            let values: Vec<Value> = rows
                .iter()
                .filter_map(|row| row.get(column))
                .filter(|v| !v.is_null())
                .cloned()
                .collect();
            result.insert(column.clone(), self.detector.detect(&values));
        }

        debug!(table, columns = result.len(), sampled = rows.len(), "detected column types");
        Ok(result)
    }

    /// Builds the full profile for a table.
    #[instrument(skip(self, db))]
    pub async fn profile(&self, db: &dyn SqlExecutor, table: &str) -> AnalyzerResult<TableProfile> {
        ensure_identifier(table)?;

        let rows = db
            .execute_query(&format!("SELECT COUNT(*) AS count FROM {table}"))
            .await?;
        let row_count = rows
            .first()
            .and_then(|r| r.get("count"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let column_types = self.detect_column_types(db, table).await?;
        let structure = db.table_columns(table).await;

        let columns: Vec<ColumnProfile> = column_types
            .into_iter()
            .map(|(name, info)| {
                let meta = structure.iter().find(|c| c.name == name);
                ColumnProfile {
                    declared_type: meta
                        .map(|c| c.declared_type.clone())
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| "unknown".to_string()),
                    detected_type: info.data_type,
                    confidence: info.confidence,
                    examples: info.examples,
                    primary_key: meta.map(|c| c.primary_key).unwrap_or(false),
                    nullable: meta.map(|c| !c.not_null).unwrap_or(true),
                    null_count: info.stats.null_count,
                    unique_count: info.stats.unique_count,
                    stats: info.stats,
                    name,
                }
            })
            .collect();

        Ok(TableProfile {
            table_name: table.to_string(),
            row_count,
            column_count: columns.len(),
            columns,
        })
    }
}
