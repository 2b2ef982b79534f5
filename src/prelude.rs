//! Prelude for commonly used types in sqlite-eda.

pub use crate::analyzers::errors::{AnalyzerError, AnalyzerResult};
pub use crate::analyzers::inference::{ColumnTypeInfo, DetectedType, TypeDetector};
pub use crate::analyzers::profiler::{TableProfile, TableProfiler};
pub use crate::analyzers::statistics::{ColumnStatistics, StatisticsGenerator};
pub use crate::analyzers::suggestions::{suggest_visualizations, VisualizationRecommendation};
pub use crate::analyzers::SchemaAnalyzer;
pub use crate::logging::LogConfig;
pub use crate::sources::{Row, SqlExecutor, SqliteExecutor, Value};
