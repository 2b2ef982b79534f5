//! Sample-based data type detection for table columns.
//!
//! Columns arrive untyped: SQLite declarations are advisory and many real
//! databases store numbers, dates, and flags as text. This module classifies
//! individual sample values ([`classify_value`]) and aggregates per-column
//! votes into a dominant type with a confidence score
//! ([`TypeDetector::detect`]).
//!
//! Classification never fails: degenerate input (an empty sample) yields a
//! well-formed [`DetectedType::Unknown`] result with zero confidence.
//!
//! # Example
//!
//! ```rust
//! use sqlite_eda::analyzers::inference::{DetectedType, TypeDetector};
//! use sqlite_eda::sources::Value;
//!
//! let detector = TypeDetector::new();
//! let values: Vec<Value> = (1..=30).map(Value::Integer).collect();
//! let info = detector.detect(&values);
//!
//! assert_eq!(info.data_type, DetectedType::Integer);
//! assert_eq!(info.confidence, 100);
//! ```

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::sources::Value;

/// Share of votes a type needs to become dominant.
const DOMINANCE_THRESHOLD: f64 = 0.8;
/// Share of numeric votes that must be integral for the column to be integer.
const INTEGER_RATIO_THRESHOLD: f64 = 0.9;
/// Number of distinct example values carried in the result.
const MAX_EXAMPLES: usize = 5;
/// Cardinality bounds for the numeric potential-category heuristic.
const NUMERIC_CATEGORY_MAX_UNIQUE: usize = 10;
const NUMERIC_CATEGORY_MIN_TOTAL: usize = 20;
/// Cardinality bound for the string potential-category heuristic.
const TEXT_CATEGORY_MAX_UNIQUE: usize = 20;

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

static DATETIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(:\d{2})?(\.\d+)?(Z|[+-]\d{2}:?\d{2})?$")
        .expect("datetime pattern is valid")
});

/// Classification of a single sample value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    Date,
    DateTime,
    Text,
}

/// Dominant type assigned to a column after vote aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedType {
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    #[serde(rename = "string")]
    Text,
    Unknown,
}

impl DetectedType {
    /// Whether the type is one of the numeric tags.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DetectedType::Integer | DetectedType::Float)
    }

    /// Whether the type is one of the temporal tags.
    pub fn is_temporal(&self) -> bool {
        matches!(self, DetectedType::Date | DetectedType::DateTime)
    }
}

/// Per-column vote counts accumulated while scanning a sample.
#[derive(Debug, Clone, Default)]
pub struct TypeTally {
    pub number: usize,
    pub integer: usize,
    pub float: usize,
    pub boolean: usize,
    pub date: usize,
    pub datetime: usize,
    pub text: usize,
}

/// Sample-derived statistics attached to a detection result.
///
/// The numeric block (`min`/`max`/`mean`) is present only for numeric
/// dominant types, the length block only for strings. `null_count` is always
/// zero here: the detector receives pre-filtered non-null values, and the
/// caller accounts for nulls separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleStats {
    pub unique_count: usize,
    pub unique_ratio: f64,
    pub null_count: u64,
    pub total_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub potential_category: bool,
}

/// Detection result for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTypeInfo {
    pub data_type: DetectedType,
    /// Percentage of sampled values consistent with the dominant type, 0-100.
    pub confidence: u8,
    /// Up to five distinct sample values in first-seen order.
    pub examples: Vec<Value>,
    pub stats: SampleStats,
}

impl ColumnTypeInfo {
    /// The result returned for a column with no sampled values.
    pub fn unknown() -> Self {
        Self {
            data_type: DetectedType::Unknown,
            confidence: 0,
            examples: Vec::new(),
            stats: SampleStats::default(),
        }
    }
}

/// Classifies a single sample value.
///
/// Precedence is fixed: null, boolean (native booleans and the exact strings
/// `"true"`/`"false"`), numeric (integral values are integers, the rest
/// floats; text counts when it parses as a finite number), `YYYY-MM-DD`
/// dates, ISO-8601-like datetimes, and finally plain text. A value matching
/// several rules takes the first.
pub fn classify_value(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Boolean(_) => ValueKind::Boolean,
        Value::Integer(_) => ValueKind::Integer,
        Value::Real(f) => {
            if f.fract() == 0.0 {
                ValueKind::Integer
            } else {
                ValueKind::Float
            }
        }
        Value::Text(s) => classify_text(s),
    }
}

fn classify_text(s: &str) -> ValueKind {
    if s == "true" || s == "false" {
        return ValueKind::Boolean;
    }

    if let Some(n) = parse_number(s) {
        return if n.fract() == 0.0 {
            ValueKind::Integer
        } else {
            ValueKind::Float
        };
    }

    if DATE_PATTERN.is_match(s) && parse_date(s).is_some() {
        return ValueKind::Date;
    }

    if DATETIME_PATTERN.is_match(s) && parse_datetime(s).is_some() {
        return ValueKind::DateTime;
    }

    ValueKind::Text
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| !f.is_nan())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let mut text = s.replacen(' ', "T", 1);
    if let Some(stripped) = text.strip_suffix('Z') {
        text = format!("{stripped}+00:00");
    }

    // An offset sign can only appear after the time part; the date part's
    // hyphens end at index 10.
    let has_offset = text.get(10..).is_some_and(|t| t.contains('+'))
        || text.get(11..).is_some_and(|t| t.contains('-'));

    if has_offset {
        for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"] {
            if let Ok(dt) = DateTime::parse_from_str(&text, format) {
                return Some(dt.naive_utc());
            }
        }
    } else {
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&text, format) {
                return Some(dt);
            }
        }
    }

    None
}

/// Parses a date or datetime string into a timeline position.
///
/// Used for date-range arithmetic; bare dates land at midnight.
pub(crate) fn parse_temporal(s: &str) -> Option<NaiveDateTime> {
    if let Some(date) = parse_date(s) {
        return date.and_hms_opt(0, 0, 0);
    }
    parse_datetime(s)
}

/// Aggregates per-value classifications into a dominant column type.
#[derive(Debug, Clone, Default)]
pub struct TypeDetector {
    _private: (),
}

impl TypeDetector {
    /// Creates a detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Detects the dominant type of a column from its non-null sample values.
    ///
    /// The caller filters out nulls and reports null/total counts itself;
    /// every value given here casts exactly one vote. An empty sample yields
    /// [`ColumnTypeInfo::unknown`].
    pub fn detect(&self, values: &[Value]) -> ColumnTypeInfo {
        let total = values.len();
        if total == 0 {
            return ColumnTypeInfo::unknown();
        }

        let mut tally = TypeTally::default();
        let mut unique: HashSet<String> = HashSet::new();
        let mut examples: Vec<Value> = Vec::new();
        let mut min_length: Option<usize> = None;
        let mut max_length: Option<usize> = None;
        let mut numeric_min: Option<f64> = None;
        let mut numeric_max: Option<f64> = None;
        let mut numeric_sum = 0.0;
        let mut numeric_count = 0usize;

        for value in values {
            // Debug rendering keeps Integer(1) and Text("1") distinct.
            unique.insert(format!("{value:?}"));

            if examples.len() < MAX_EXAMPLES && !examples.contains(value) {
                examples.push(value.clone());
            }

            let kind = classify_value(value);
            match kind {
                ValueKind::Null => {}
                ValueKind::Boolean => tally.boolean += 1,
                ValueKind::Integer | ValueKind::Float => {
                    if kind == ValueKind::Integer {
                        tally.integer += 1;
                    } else {
                        tally.float += 1;
                    }
                    tally.number += 1;

                    if let Some(n) = value.as_f64() {
                        numeric_sum += n;
                        numeric_count += 1;
                        numeric_min = Some(numeric_min.map_or(n, |m| m.min(n)));
                        numeric_max = Some(numeric_max.map_or(n, |m| m.max(n)));
                    }
                }
                ValueKind::Date => tally.date += 1,
                ValueKind::DateTime => tally.datetime += 1,
                ValueKind::Text => tally.text += 1,
            }

            if let Value::Text(s) = value {
                let len = s.chars().count();
                min_length = Some(min_length.map_or(len, |m| m.min(len)));
                max_length = Some(max_length.map_or(len, |m| m.max(len)));
            }
        }

        let total_f = total as f64;
        let mut data_type = DetectedType::Text;
        let mut confidence = tally.text as f64 / total_f * 100.0;

        if tally.number as f64 / total_f > DOMINANCE_THRESHOLD {
            data_type = if tally.integer as f64 / tally.number as f64 > INTEGER_RATIO_THRESHOLD {
                DetectedType::Integer
            } else {
                DetectedType::Float
            };
            confidence = tally.number as f64 / total_f * 100.0;
        }

        // Temporal checks run after the numeric one on purpose: a column
        // that is both (e.g. all-digit date encodings) reads as temporal.
        if tally.date as f64 / total_f > DOMINANCE_THRESHOLD {
            data_type = DetectedType::Date;
            confidence = tally.date as f64 / total_f * 100.0;
        } else if tally.datetime as f64 / total_f > DOMINANCE_THRESHOLD {
            data_type = DetectedType::DateTime;
            confidence = tally.datetime as f64 / total_f * 100.0;
        }

        // Boolean is evaluated last and overrides any earlier decision.
        if tally.boolean as f64 / total_f > DOMINANCE_THRESHOLD {
            data_type = DetectedType::Boolean;
            confidence = tally.boolean as f64 / total_f * 100.0;
        }

        let mut stats = SampleStats {
            unique_count: unique.len(),
            unique_ratio: unique.len() as f64 / total_f,
            null_count: 0,
            total_count: total,
            ..SampleStats::default()
        };

        match data_type {
            DetectedType::Integer | DetectedType::Float => {
                stats.min = numeric_min;
                stats.max = numeric_max;
                if numeric_count > 0 {
                    stats.mean = Some(numeric_sum / numeric_count as f64);
                }
                if stats.unique_count < NUMERIC_CATEGORY_MAX_UNIQUE
                    && total > NUMERIC_CATEGORY_MIN_TOTAL
                {
                    stats.potential_category = true;
                }
            }
            DetectedType::Text => {
                stats.min_length = min_length;
                stats.max_length = max_length;
                if stats.unique_count > 1 && stats.unique_count < TEXT_CATEGORY_MAX_UNIQUE {
                    stats.potential_category = true;
                }
            }
            _ => {}
        }

        ColumnTypeInfo {
            data_type,
            confidence: confidence.round() as u8,
            examples,
            stats,
        }
    }
}
