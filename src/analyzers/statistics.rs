//! On-demand column statistics computed in the database.
//!
//! The generator samples one value to pick a statistics plan, then issues a
//! fixed sequence of aggregate queries for that plan: numeric columns get
//! min/max/mean, nearest-rank percentiles, an equal-width histogram, and top
//! values; text columns get length statistics and a category breakdown when
//! cardinality is low; date columns get range and year/month distributions;
//! everything else gets the generic count/distinct/top-values core.
//!
//! Sub-queries run strictly in order over a single connection. Optional
//! metrics (percentiles, lengths, histogram buckets, date ranges) tolerate
//! failure: the field is omitted and a warning logged, while the metrics a
//! result is meaningless without (counts, min/max, distinct) propagate their
//! errors.
//!
//! Nothing is cached; every call recomputes from live table content.

use serde::Serialize;
use tracing::{instrument, warn};

use crate::analyzers::ensure_identifier;
use crate::analyzers::errors::{AnalyzerError, AnalyzerResult};
use crate::analyzers::inference::{classify_value, parse_temporal, ValueKind};
use crate::sources::{Row, SqlExecutor, Value};

const DEFAULT_HISTOGRAM_BUCKETS: usize = 10;
const DEFAULT_TOP_VALUES: usize = 5;
const DEFAULT_CATEGORICAL_THRESHOLD: u64 = 20;
const MONTH_DISTRIBUTION_LIMIT: usize = 12;

/// Configuration for the statistics generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of equal-width histogram buckets for numeric columns.
    pub histogram_buckets: usize,
    /// Number of most-frequent values reported per column.
    pub top_values: usize,
    /// Distinct-count ceiling below which a text column gets a full
    /// category breakdown.
    pub categorical_threshold: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            histogram_buckets: DEFAULT_HISTOGRAM_BUCKETS,
            top_values: DEFAULT_TOP_VALUES,
            categorical_threshold: DEFAULT_CATEGORICAL_THRESHOLD,
        }
    }
}

/// Builder for [`StatisticsGenerator`].
pub struct StatisticsGeneratorBuilder {
    config: GeneratorConfig,
}

impl StatisticsGeneratorBuilder {
    /// Set the number of histogram buckets.
    pub fn histogram_buckets(mut self, buckets: usize) -> Self {
        self.config.histogram_buckets = buckets.max(1);
        self
    }

    /// Set how many top values to report.
    pub fn top_values(mut self, limit: usize) -> Self {
        self.config.top_values = limit.max(1);
        self
    }

    /// Set the categorical distinct-count threshold for text columns.
    pub fn categorical_threshold(mut self, threshold: u64) -> Self {
        self.config.categorical_threshold = threshold;
        self
    }

    /// Build the generator.
    pub fn build(self) -> StatisticsGenerator {
        StatisticsGenerator {
            config: self.config,
        }
    }
}

/// A value with its occurrence count and share of non-null rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: Value,
    pub count: u64,
    /// Rounded percentage of non-null rows.
    pub percent: u32,
}

/// Equal-width histogram over a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Human-readable "lower - upper" bucket labels.
    pub buckets: Vec<String>,
    pub counts: Vec<u64>,
}

/// Count of rows falling into one calendar period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodCount {
    pub period: String,
    pub count: u64,
    pub percent: u32,
}

/// Row counts shared by every statistics variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnCounts {
    /// Non-null rows.
    pub count: u64,
    pub nulls: u64,
    pub null_percent: u32,
    pub distinct_count: u64,
    pub distinct_percent: u32,
}

/// Statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStatistics {
    #[serde(flatten)]
    pub counts: ColumnCounts,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Best-effort nearest-rank percentile, not interpolated; absent when
    /// the underlying query failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile_25: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile_75: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Histogram>,
    pub top_values: Vec<ValueCount>,
}

/// Statistics for a text column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStatistics {
    #[serde(flatten)]
    pub counts: ColumnCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_length: Option<f64>,
    pub top_values: Vec<ValueCount>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_likely_categorical: bool,
    /// Every distinct value with count and share; present only when the
    /// column looks categorical (bounded by the distinct-count threshold).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<ValueCount>>,
}

/// Statistics for a date or datetime column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateStatistics {
    #[serde(flatten)]
    pub counts: ColumnCounts,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_distribution: Option<Vec<PeriodCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_distribution: Option<Vec<PeriodCount>>,
}

/// Fallback statistics for columns whose sampled value is null, boolean, or
/// otherwise unclassifiable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericStatistics {
    #[serde(flatten)]
    pub counts: ColumnCounts,
    pub top_values: Vec<ValueCount>,
}

/// Type-specific column statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnStatistics {
    Numeric(NumericStatistics),
    Text(TextStatistics),
    Date(DateStatistics),
    Generic(GenericStatistics),
}

impl ColumnStatistics {
    /// The row counts common to every variant.
    pub fn counts(&self) -> &ColumnCounts {
        match self {
            ColumnStatistics::Numeric(s) => &s.counts,
            ColumnStatistics::Text(s) => &s.counts,
            ColumnStatistics::Date(s) => &s.counts,
            ColumnStatistics::Generic(s) => &s.counts,
        }
    }
}

/// Computes [`ColumnStatistics`] for one table column at a time.
pub struct StatisticsGenerator {
    config: GeneratorConfig,
}

impl Default for StatisticsGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsGenerator {
    /// Creates a generator with default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for a customized generator.
    pub fn builder() -> StatisticsGeneratorBuilder {
        StatisticsGeneratorBuilder {
            config: GeneratorConfig::default(),
        }
    }

    /// Computes statistics for `table.column`.
    ///
    /// Dispatches on the classification of the first stored value. A column
    /// whose first value happens to be null lands in the generic plan; an
    /// empty table is [`AnalyzerError::NoData`].
    #[instrument(skip(self, db))]
    pub async fn generate(
        &self,
        db: &dyn SqlExecutor,
        table: &str,
        column: &str,
    ) -> AnalyzerResult<ColumnStatistics> {
        ensure_identifier(table)?;
        ensure_identifier(column)?;

        let sample = db
            .execute_query(&format!("SELECT {column} FROM {table} LIMIT 1"))
            .await?;
        let first = sample.into_iter().next().ok_or(AnalyzerError::NoData)?;
        let value = first.get(column).cloned().unwrap_or(Value::Null);

        match classify_value(&value) {
            ValueKind::Integer | ValueKind::Float => Ok(ColumnStatistics::Numeric(
                self.numeric_statistics(db, table, column).await?,
            )),
            ValueKind::Text => Ok(ColumnStatistics::Text(
                self.text_statistics(db, table, column).await?,
            )),
            ValueKind::Date | ValueKind::DateTime => Ok(ColumnStatistics::Date(
                self.date_statistics(db, table, column).await?,
            )),
            ValueKind::Null | ValueKind::Boolean => Ok(ColumnStatistics::Generic(
                self.generic_statistics(db, table, column).await?,
            )),
        }
    }

    async fn numeric_statistics(
        &self,
        db: &dyn SqlExecutor,
        table: &str,
        column: &str,
    ) -> AnalyzerResult<NumericStatistics> {
        let mut counts = self.base_counts(db, table, column).await?;

        let rows = db
            .execute_query(&format!(
                "SELECT MIN({column}) AS min, MAX({column}) AS max, AVG({column}) AS mean \
                 FROM {table} WHERE {column} IS NOT NULL"
            ))
            .await?;
        let row = rows.first();
        let min = row.and_then(|r| f64_field(r, "min"));
        let max = row.and_then(|r| f64_field(r, "max"));
        let mean = row.and_then(|r| f64_field(r, "mean"));

        let percentile_25 = self.percentile(db, table, column, 25).await;
        let percentile_75 = self.percentile(db, table, column, 75).await;

        counts.distinct_count = self.distinct_count(db, table, column).await?;
        counts.distinct_percent = percent(counts.distinct_count, counts.count);

        let histogram = match (min, max) {
            (Some(lo), Some(hi)) => Some(self.histogram(db, table, column, lo, hi).await),
            _ => None,
        };

        let top_values = self.top_values(db, table, column, counts.count).await?;

        Ok(NumericStatistics {
            counts,
            min,
            max,
            mean,
            percentile_25,
            percentile_75,
            histogram,
            top_values,
        })
    }

    async fn text_statistics(
        &self,
        db: &dyn SqlExecutor,
        table: &str,
        column: &str,
    ) -> AnalyzerResult<TextStatistics> {
        let mut counts = self.base_counts(db, table, column).await?;
        counts.distinct_count = self.distinct_count(db, table, column).await?;
        counts.distinct_percent = percent(counts.distinct_count, counts.count);

        let (mut min_length, mut max_length, mut avg_length) = (None, None, None);
        let length_sql = format!(
            "SELECT MIN(length({column})) AS min_length, MAX(length({column})) AS max_length, \
             AVG(length({column})) AS avg_length FROM {table} WHERE {column} IS NOT NULL"
        );
        match db.execute_query(&length_sql).await {
            Ok(rows) => {
                if let Some(row) = rows.first() {
                    min_length = row.get("min_length").and_then(|v| v.as_u64());
                    max_length = row.get("max_length").and_then(|v| v.as_u64());
                    avg_length = f64_field(row, "avg_length");
                }
            }
            Err(e) => {
                warn!(table, column, error = %e, "skipping length statistics");
            }
        }

        let top_values = self.top_values(db, table, column, counts.count).await?;

        let mut is_likely_categorical = false;
        let mut categories = None;
        if counts.distinct_count <= self.config.categorical_threshold {
            is_likely_categorical = true;
            let category_sql = format!(
                "SELECT {column} AS value, COUNT(*) AS count FROM {table} \
                 WHERE {column} IS NOT NULL GROUP BY {column} ORDER BY count DESC"
            );
            let rows = db.execute_query(&category_sql).await?;
            categories = Some(value_counts(rows, counts.count));
        }

        Ok(TextStatistics {
            counts,
            min_length,
            max_length,
            avg_length,
            top_values,
            is_likely_categorical,
            categories,
        })
    }

    async fn date_statistics(
        &self,
        db: &dyn SqlExecutor,
        table: &str,
        column: &str,
    ) -> AnalyzerResult<DateStatistics> {
        let mut counts = self.base_counts(db, table, column).await?;

        let rows = db
            .execute_query(&format!(
                "SELECT MIN({column}) AS min_date, MAX({column}) AS max_date \
                 FROM {table} WHERE {column} IS NOT NULL"
            ))
            .await?;
        let row = rows.first();
        let min_date = row
            .and_then(|r| r.get("min_date"))
            .filter(|v| !v.is_null())
            .map(|v| v.to_string());
        let max_date = row
            .and_then(|r| r.get("max_date"))
            .filter(|v| !v.is_null())
            .map(|v| v.to_string());

        let range_days = match (&min_date, &max_date) {
            (Some(lo), Some(hi)) => {
                let range = date_range_days(lo, hi);
                if range.is_none() {
                    warn!(table, column, "could not parse date bounds, omitting range");
                }
                range
            }
            _ => None,
        };

        counts.distinct_count = self.distinct_count(db, table, column).await?;
        counts.distinct_percent = percent(counts.distinct_count, counts.count);

        let year_sql = format!(
            "SELECT strftime('%Y', {column}) AS period, COUNT(*) AS count FROM {table} \
             WHERE {column} IS NOT NULL GROUP BY period ORDER BY period"
        );
        let year_distribution = match db.execute_query(&year_sql).await {
            Ok(rows) => Some(period_counts(rows, counts.count)),
            Err(e) => {
                warn!(table, column, error = %e, "skipping date distributions");
                None
            }
        };

        let month_distribution = if year_distribution.is_some() {
            let month_sql = format!(
                "SELECT strftime('%Y-%m', {column}) AS period, COUNT(*) AS count FROM {table} \
                 WHERE {column} IS NOT NULL GROUP BY period ORDER BY period LIMIT {MONTH_DISTRIBUTION_LIMIT}"
            );
            match db.execute_query(&month_sql).await {
                Ok(rows) => Some(period_counts(rows, counts.count)),
                Err(e) => {
                    warn!(table, column, error = %e, "skipping month distribution");
                    None
                }
            }
        } else {
            None
        };

        Ok(DateStatistics {
            counts,
            min_date,
            max_date,
            range_days,
            year_distribution,
            month_distribution,
        })
    }

    async fn generic_statistics(
        &self,
        db: &dyn SqlExecutor,
        table: &str,
        column: &str,
    ) -> AnalyzerResult<GenericStatistics> {
        let mut counts = self.base_counts(db, table, column).await?;
        counts.distinct_count = self.distinct_count(db, table, column).await?;
        counts.distinct_percent = percent(counts.distinct_count, counts.count);

        let top_values = self.top_values(db, table, column, counts.count).await?;

        Ok(GenericStatistics { counts, top_values })
    }

    /// Non-null and total row counts; distinct fields are filled in later.
    async fn base_counts(
        &self,
        db: &dyn SqlExecutor,
        table: &str,
        column: &str,
    ) -> AnalyzerResult<ColumnCounts> {
        let rows = db
            .execute_query(&format!(
                "SELECT COUNT({column}) AS count, COUNT(*) AS total FROM {table}"
            ))
            .await?;
        let row = rows
            .first()
            .ok_or_else(|| AnalyzerError::invalid_data("count query returned no rows"))?;

        let count = u64_field(row, "count");
        let total = u64_field(row, "total");
        let nulls = total.saturating_sub(count);

        Ok(ColumnCounts {
            count,
            nulls,
            null_percent: percent(nulls, total),
            distinct_count: 0,
            distinct_percent: 0,
        })
    }

    async fn distinct_count(
        &self,
        db: &dyn SqlExecutor,
        table: &str,
        column: &str,
    ) -> AnalyzerResult<u64> {
        let rows = db
            .execute_query(&format!(
                "SELECT COUNT(DISTINCT {column}) AS distinct_count FROM {table} \
                 WHERE {column} IS NOT NULL"
            ))
            .await?;
        Ok(rows.first().map(|r| u64_field(r, "distinct_count")).unwrap_or(0))
    }

    /// Nearest-rank percentile via an ordered scan with a computed offset.
    ///
    /// Not a true percentile under duplicates or skew; best-effort, and any
    /// failure just omits the field.
    async fn percentile(
        &self,
        db: &dyn SqlExecutor,
        table: &str,
        column: &str,
        pct: u32,
    ) -> Option<f64> {
        let sql = format!(
            "SELECT {column} FROM {table} WHERE {column} IS NOT NULL ORDER BY {column} \
             LIMIT 1 OFFSET (SELECT COUNT({column}) FROM {table} WHERE {column} IS NOT NULL) \
             * {pct} / 100 - 1"
        );

        match db.execute_query(&sql).await {
            Ok(rows) => rows.first().and_then(|r| f64_field(r, column)),
            Err(e) => {
                warn!(table, column, pct, error = %e, "skipping percentile");
                None
            }
        }
    }

    /// Equal-width histogram computed with one count query per bucket.
    ///
    /// The final bucket is closed on both ends so the column maximum is
    /// always counted; a failed bucket query records zero rather than
    /// aborting the histogram.
    async fn histogram(
        &self,
        db: &dyn SqlExecutor,
        table: &str,
        column: &str,
        min: f64,
        max: f64,
    ) -> Histogram {
        let bucket_count = self.config.histogram_buckets;
        let bucket_size = (max - min) / bucket_count as f64;

        let mut buckets = Vec::with_capacity(bucket_count);
        let mut counts = Vec::with_capacity(bucket_count);

        for i in 0..bucket_count {
            let lower = min + bucket_size * i as f64;
            let upper = min + bucket_size * (i + 1) as f64;
            buckets.push(format!("{} - {}", round2(lower), round2(upper)));

            let upper_op = if i + 1 == bucket_count { "<=" } else { "<" };
            let sql = format!(
                "SELECT COUNT(*) AS count FROM {table} \
                 WHERE {column} >= {lower} AND {column} {upper_op} {upper}"
            );

            let count = match db.execute_query(&sql).await {
                Ok(rows) => rows.first().map(|r| u64_field(r, "count")).unwrap_or(0),
                Err(e) => {
                    warn!(table, column, bucket = i, error = %e, "histogram bucket failed");
                    0
                }
            };
            counts.push(count);
        }

        Histogram { buckets, counts }
    }

    async fn top_values(
        &self,
        db: &dyn SqlExecutor,
        table: &str,
        column: &str,
        non_null_count: u64,
    ) -> AnalyzerResult<Vec<ValueCount>> {
        let rows = db
            .execute_query(&format!(
                "SELECT {column} AS value, COUNT(*) AS count FROM {table} \
                 WHERE {column} IS NOT NULL GROUP BY {column} ORDER BY count DESC LIMIT {}",
                self.config.top_values
            ))
            .await?;
        Ok(value_counts(rows, non_null_count))
    }
}

fn value_counts(rows: Vec<Row>, whole: u64) -> Vec<ValueCount> {
    rows.iter()
        .map(|row| {
            let count = u64_field(row, "count");
            ValueCount {
                value: row.get("value").cloned().unwrap_or(Value::Null),
                count,
                percent: percent(count, whole),
            }
        })
        .collect()
}

fn period_counts(rows: Vec<Row>, whole: u64) -> Vec<PeriodCount> {
    rows.iter()
        .map(|row| {
            let count = u64_field(row, "count");
            PeriodCount {
                period: row
                    .get("period")
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
                count,
                percent: percent(count, whole),
            }
        })
        .collect()
}

fn u64_field(row: &Row, key: &str) -> u64 {
    row.get(key).and_then(|v| v.as_u64()).unwrap_or(0)
}

fn f64_field(row: &Row, key: &str) -> Option<f64> {
    row.get(key).and_then(|v| v.as_f64())
}

fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as u32
    }
}

/// Rounds to two decimals and renders without trailing zeros, for bucket
/// labels.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn date_range_days(min: &str, max: &str) -> Option<i64> {
    let lo = parse_temporal(min)?;
    let hi = parse_temporal(max)?;
    let seconds = (hi - lo).num_seconds();
    Some((seconds as f64 / 86_400.0).round() as i64)
}
