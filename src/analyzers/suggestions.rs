//! Chart suggestions derived from a table profile.
//!
//! A pure function of the profile: columns are classed as numeric,
//! categorical, or temporal, and a fixed set of [`ChartRule`]s proposes
//! chart specifications from those classes. Rules are independent and their
//! outputs are concatenated in rule order with no deduplication, filtering,
//! or re-ranking; display order is the presentation layer's concern.
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlite_eda::analyzers::profiler::TableProfiler;
//! use sqlite_eda::analyzers::suggestions::suggest_visualizations;
//! use sqlite_eda::sources::SqliteExecutor;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let db = SqliteExecutor::open("shop.db").unwrap();
//! let profile = TableProfiler::new().profile(&db, "orders").await.unwrap();
//!
//! for rec in suggest_visualizations(&profile) {
//!     println!("[{:?}] {}", rec.chart, rec.title);
//! }
//! # })
//! ```

use serde::Serialize;

use crate::analyzers::inference::DetectedType;
use crate::analyzers::profiler::{ColumnProfile, TableProfile};

/// Largest category count a pie chart stays readable at.
const PIE_MAX_CATEGORIES: usize = 10;
/// Distinct-count bound for treating a string column as categorical.
const CATEGORICAL_MAX_UNIQUE: usize = 20;

/// Supported chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Pie,
    Histogram,
    Line,
    Scatter,
}

/// How strongly a recommendation should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Column bindings for a recommended chart.
///
/// Either axis/column references into the profiled table, or a precomputed
/// aggregate query for count-based fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartBinding {
    Axes { x_column: String, y_column: String },
    LabelValue {
        label_column: String,
        value_column: String,
    },
    Column { column: String },
    Query { query: String },
}

/// A suggested chart specification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationRecommendation {
    pub chart: ChartType,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(flatten)]
    pub binding: ChartBinding,
}

/// A single heuristic producing recommendations from a profile.
pub trait ChartRule: Send + Sync {
    /// Human-readable rule name.
    fn name(&self) -> &str;

    /// Apply this rule to a profile and return its recommendations.
    fn apply(&self, profile: &TableProfile) -> Vec<VisualizationRecommendation>;
}

fn numeric_columns(profile: &TableProfile) -> Vec<&ColumnProfile> {
    profile
        .columns
        .iter()
        .filter(|col| col.detected_type.is_numeric())
        .collect()
}

fn categorical_columns(profile: &TableProfile) -> Vec<&ColumnProfile> {
    profile
        .columns
        .iter()
        .filter(|col| {
            col.stats.potential_category
                || (col.detected_type == DetectedType::Text
                    && col.unique_count > 0
                    && col.unique_count < CATEGORICAL_MAX_UNIQUE)
        })
        .collect()
}

fn temporal_columns(profile: &TableProfile) -> Vec<&ColumnProfile> {
    profile
        .columns
        .iter()
        .filter(|col| col.detected_type.is_temporal())
        .collect()
}

/// Bar charts for every categorical/numeric pairing, falling back to
/// count-by-category when the table has no numeric columns.
pub struct BarChartRule;

impl ChartRule for BarChartRule {
    fn name(&self) -> &str {
        "bar_chart"
    }

    fn apply(&self, profile: &TableProfile) -> Vec<VisualizationRecommendation> {
        let numeric = numeric_columns(profile);
        let mut recs = Vec::new();

        for cat in categorical_columns(profile) {
            for num in &numeric {
                recs.push(VisualizationRecommendation {
                    chart: ChartType::Bar,
                    title: format!("{} by {}", cat.name, num.name),
                    description: format!(
                        "Bar chart showing {} values grouped by {}",
                        num.name, cat.name
                    ),
                    priority: Priority::High,
                    binding: ChartBinding::Axes {
                        x_column: cat.name.clone(),
                        y_column: num.name.clone(),
                    },
                });
            }

            if numeric.is_empty() {
                recs.push(VisualizationRecommendation {
                    chart: ChartType::Bar,
                    title: format!("Count by {}", cat.name),
                    description: format!("Bar chart showing count of records by {}", cat.name),
                    priority: Priority::High,
                    binding: ChartBinding::Query {
                        query: format!(
                            "SELECT {}, COUNT(*) as count FROM {} GROUP BY {} ORDER BY count DESC",
                            cat.name, profile.table_name, cat.name
                        ),
                    },
                });
            }
        }

        recs
    }
}

/// Pie charts for low-cardinality categorical columns.
pub struct PieChartRule;

impl ChartRule for PieChartRule {
    fn name(&self) -> &str {
        "pie_chart"
    }

    fn apply(&self, profile: &TableProfile) -> Vec<VisualizationRecommendation> {
        let numeric = numeric_columns(profile);
        let mut recs = Vec::new();

        let pie_worthy = categorical_columns(profile)
            .into_iter()
            .filter(|col| col.unique_count > 0 && col.unique_count <= PIE_MAX_CATEGORIES);

        for cat in pie_worthy {
            for num in &numeric {
                recs.push(VisualizationRecommendation {
                    chart: ChartType::Pie,
                    title: format!("Distribution of {} by {}", num.name, cat.name),
                    description: format!(
                        "Pie chart showing distribution of {} across {} categories",
                        num.name, cat.name
                    ),
                    priority: Priority::Medium,
                    binding: ChartBinding::LabelValue {
                        label_column: cat.name.clone(),
                        value_column: num.name.clone(),
                    },
                });
            }

            if numeric.is_empty() {
                recs.push(VisualizationRecommendation {
                    chart: ChartType::Pie,
                    title: format!("Distribution by {}", cat.name),
                    description: format!(
                        "Pie chart showing distribution of records by {}",
                        cat.name
                    ),
                    priority: Priority::Medium,
                    binding: ChartBinding::Query {
                        query: format!(
                            "SELECT {}, COUNT(*) as count FROM {} GROUP BY {}",
                            cat.name, profile.table_name, cat.name
                        ),
                    },
                });
            }
        }

        recs
    }
}

/// One histogram per numeric column.
pub struct HistogramRule;

impl ChartRule for HistogramRule {
    fn name(&self) -> &str {
        "histogram"
    }

    fn apply(&self, profile: &TableProfile) -> Vec<VisualizationRecommendation> {
        numeric_columns(profile)
            .into_iter()
            .map(|num| VisualizationRecommendation {
                chart: ChartType::Histogram,
                title: format!("Distribution of {}", num.name),
                description: format!(
                    "Histogram showing the distribution of {} values",
                    num.name
                ),
                priority: Priority::Medium,
                binding: ChartBinding::Column {
                    column: num.name.clone(),
                },
            })
            .collect()
    }
}

/// Line charts for every temporal/numeric pairing, falling back to
/// count-over-time when the table has no numeric columns.
pub struct LineChartRule;

impl ChartRule for LineChartRule {
    fn name(&self) -> &str {
        "line_chart"
    }

    fn apply(&self, profile: &TableProfile) -> Vec<VisualizationRecommendation> {
        let numeric = numeric_columns(profile);
        let mut recs = Vec::new();

        for date in temporal_columns(profile) {
            for num in &numeric {
                recs.push(VisualizationRecommendation {
                    chart: ChartType::Line,
                    title: format!("{} over time", num.name),
                    description: format!("Line chart showing {} values over time", num.name),
                    priority: Priority::High,
                    binding: ChartBinding::Axes {
                        x_column: date.name.clone(),
                        y_column: num.name.clone(),
                    },
                });
            }

            if numeric.is_empty() {
                recs.push(VisualizationRecommendation {
                    chart: ChartType::Line,
                    title: "Count over time".to_string(),
                    description: "Line chart showing record count over time".to_string(),
                    priority: Priority::High,
                    binding: ChartBinding::Query {
                        query: format!(
                            "SELECT {}, COUNT(*) as count FROM {} GROUP BY {}",
                            date.name, profile.table_name, date.name
                        ),
                    },
                });
            }
        }

        recs
    }
}

/// Scatter plots for every unordered pair of distinct numeric columns.
pub struct ScatterRule;

impl ChartRule for ScatterRule {
    fn name(&self) -> &str {
        "scatter"
    }

    fn apply(&self, profile: &TableProfile) -> Vec<VisualizationRecommendation> {
        let numeric = numeric_columns(profile);
        let mut recs = Vec::new();

        for i in 0..numeric.len() {
            for j in (i + 1)..numeric.len() {
                recs.push(VisualizationRecommendation {
                    chart: ChartType::Scatter,
                    title: format!(
                        "Relationship between {} and {}",
                        numeric[i].name, numeric[j].name
                    ),
                    description: format!(
                        "Scatter plot showing relationship between {} and {}",
                        numeric[i].name, numeric[j].name
                    ),
                    priority: Priority::Low,
                    binding: ChartBinding::Axes {
                        x_column: numeric[i].name.clone(),
                        y_column: numeric[j].name.clone(),
                    },
                });
            }
        }

        recs
    }
}

/// Runs chart rules over a profile in a fixed order.
pub struct VisualizationAdvisor {
    rules: Vec<Box<dyn ChartRule>>,
}

impl Default for VisualizationAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualizationAdvisor {
    /// Creates an advisor with the standard rule set: bar, pie, histogram,
    /// line, scatter.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(BarChartRule),
                Box::new(PieChartRule),
                Box::new(HistogramRule),
                Box::new(LineChartRule),
                Box::new(ScatterRule),
            ],
        }
    }

    /// Creates an advisor with a custom rule set.
    pub fn with_rules(rules: Vec<Box<dyn ChartRule>>) -> Self {
        Self { rules }
    }

    /// Suggests charts for a profile.
    ///
    /// Output order is generation order: each rule's recommendations in rule
    /// order, unfiltered and unsorted.
    pub fn suggest(&self, profile: &TableProfile) -> Vec<VisualizationRecommendation> {
        self.rules
            .iter()
            .flat_map(|rule| rule.apply(profile))
            .collect()
    }
}

/// Suggests charts for a profile using the standard rule set.
pub fn suggest_visualizations(profile: &TableProfile) -> Vec<VisualizationRecommendation> {
    VisualizationAdvisor::new().suggest(profile)
}
