//! # sqlite-eda: Exploratory Data Analysis for SQLite
//!
//! sqlite-eda is the analysis engine behind a browser-based data exploration
//! tool: point it at a SQLite database and it infers column data types from
//! samples, computes descriptive statistics per column, profiles whole
//! tables, and suggests chart types for what it finds. The engine is
//! presentation-agnostic; an HTTP layer, CLI, or notebook renders the
//! profiles it produces.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sqlite_eda::prelude::*;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let db = SqliteExecutor::open("shop.db").unwrap();
//!
//! // Full table profile: row count, per-column detected types, schema
//! // metadata, and sample statistics.
//! let profiler = TableProfiler::new();
//! let profile = profiler.profile(&db, "orders").await.unwrap();
//! println!("{} rows, {} columns", profile.row_count, profile.column_count);
//!
//! // Chart suggestions, derived purely from the profile.
//! for rec in suggest_visualizations(&profile) {
//!     println!("[{:?}] {}", rec.priority, rec.title);
//! }
//!
//! // Deeper statistics for one column, on demand.
//! let stats = StatisticsGenerator::new()
//!     .generate(&db, "orders", "amount")
//!     .await
//!     .unwrap();
//! println!("{}", serde_json::to_string_pretty(&stats).unwrap());
//! # })
//! ```
//!
//! ## Architecture
//!
//! - **`sources`**: the collaborator seam: a canonical `Row`/`Value` result
//!   model, the [`sources::SqlExecutor`] trait, and the rusqlite-backed
//!   [`sources::SqliteExecutor`]. Other engines plug in at this trait.
//! - **`analyzers`**: the engine itself:
//!   - type inference with confidence scores (`analyzers::inference`)
//!   - per-column statistics plans (`analyzers::statistics`)
//!   - table profiling (`analyzers::profiler`)
//!   - chart recommendations (`analyzers::suggestions`)
//!   - schema discovery (`analyzers::schema_analyzer`)
//! - **`security`**: identifier sanitation for callers that interpolate
//!   user-supplied table and column names.
//! - **`logging`**: `tracing` subscriber helpers for embedders.
//!
//! ## Identifier safety
//!
//! The analyzers build SQL by interpolating identifiers into query text.
//! Callers sanitize user input with [`security::sanitize_identifier`] first;
//! the analyzers also reject anything outside `[A-Za-z0-9_]` up front rather
//! than attempting to escape it.
//!
//! ## Consistency model
//!
//! Every operation is a pure function of live database content: no caching,
//! no shared mutable state, sub-queries issued strictly in order over a
//! single connection. Profiling the same unchanged table twice yields
//! structurally identical results.

pub mod analyzers;
pub mod logging;
pub mod prelude;
pub mod security;
pub mod sources;

#[doc(hidden)]
pub mod test_fixtures;
