//! Exploratory-data-analysis engine: type detection, column statistics,
//! table profiling, and chart suggestions.
//!
//! The analyzers are layered leaves-first:
//!
//! - [`inference`] classifies sample values and aggregates per-column votes
//!   into a dominant type with a confidence score.
//! - [`statistics`] computes on-demand, type-specific column statistics by
//!   issuing a fixed sequence of aggregate queries.
//! - [`profiler`] orchestrates type detection over a bounded sample and
//!   merges schema metadata into a full [`profiler::TableProfile`].
//! - [`suggestions`] derives chart recommendations from a profile, purely.
//! - [`schema_analyzer`] discovers tables and declared structure.
//!
//! All database access flows through the [`crate::sources::SqlExecutor`]
//! passed into each operation; the analyzers hold no connection state, and
//! every call recomputes from live data.
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlite_eda::analyzers::profiler::TableProfiler;
//! use sqlite_eda::analyzers::statistics::StatisticsGenerator;
//! use sqlite_eda::analyzers::suggestions::suggest_visualizations;
//! use sqlite_eda::sources::SqliteExecutor;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let db = SqliteExecutor::open("shop.db").unwrap();
//!
//! let profile = TableProfiler::new().profile(&db, "orders").await.unwrap();
//! let charts = suggest_visualizations(&profile);
//!
//! let stats = StatisticsGenerator::new()
//!     .generate(&db, "orders", "amount")
//!     .await
//!     .unwrap();
//! # })
//! ```

pub mod errors;
pub mod inference;
pub mod profiler;
pub mod schema_analyzer;
pub mod statistics;
pub mod suggestions;

pub use errors::{AnalyzerError, AnalyzerResult};
pub use inference::{classify_value, ColumnTypeInfo, DetectedType, SampleStats, TypeDetector};
pub use profiler::{ColumnProfile, TableProfile, TableProfiler};
pub use schema_analyzer::SchemaAnalyzer;
pub use statistics::{ColumnStatistics, StatisticsGenerator};
pub use suggestions::{
    suggest_visualizations, ChartBinding, ChartRule, ChartType, Priority, VisualizationAdvisor,
    VisualizationRecommendation,
};

use crate::security::is_safe_identifier;

/// Rejects unsafe or empty identifiers before any SQL is built from them.
pub(crate) fn ensure_identifier(name: &str) -> AnalyzerResult<()> {
    if is_safe_identifier(name) {
        Ok(())
    } else {
        Err(AnalyzerError::invalid_identifier(name))
    }
}
