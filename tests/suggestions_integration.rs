//! End-to-end chart suggestion tests: profile a real table, then check the
//! recommended charts.

use sqlite_eda::analyzers::profiler::TableProfiler;
use sqlite_eda::analyzers::suggestions::{
    suggest_visualizations, ChartBinding, ChartType, Priority,
};
use sqlite_eda::sources::SqliteExecutor;
use sqlite_eda::test_fixtures::orders_database;

fn axes(x: &str, y: &str) -> ChartBinding {
    ChartBinding::Axes {
        x_column: x.to_string(),
        y_column: y.to_string(),
    }
}

#[tokio::test]
async fn orders_table_gets_the_expected_chart_mix() {
    let db = orders_database().unwrap();
    let profile = TableProfiler::new().profile(&db, "orders").await.unwrap();

    let recs = suggest_visualizations(&profile);

    // status x amount bar, high priority.
    assert!(recs.iter().any(|r| r.chart == ChartType::Bar
        && r.priority == Priority::High
        && r.binding == axes("status", "amount")));

    // status has 3 categories, few enough for pies.
    assert!(recs
        .iter()
        .any(|r| r.chart == ChartType::Pie && r.priority == Priority::Medium));

    // Histograms for both numeric columns.
    assert!(recs.iter().any(|r| r.chart == ChartType::Histogram
        && r.binding
            == ChartBinding::Column {
                column: "amount".to_string()
            }));
    assert!(recs.iter().any(|r| r.chart == ChartType::Histogram
        && r.binding
            == ChartBinding::Column {
                column: "id".to_string()
            }));

    // created_at x amount line, high priority.
    assert!(recs.iter().any(|r| r.chart == ChartType::Line
        && r.priority == Priority::High
        && r.binding == axes("created_at", "amount")));

    // id and amount are the two numeric columns: exactly one scatter pair.
    let scatters: Vec<_> = recs
        .iter()
        .filter(|r| r.chart == ChartType::Scatter)
        .collect();
    assert_eq!(scatters.len(), 1);
    assert_eq!(scatters[0].binding, axes("id", "amount"));
    assert_eq!(scatters[0].priority, Priority::Low);

    // Numeric columns exist, so no count-query fallbacks appear.
    assert!(!recs
        .iter()
        .any(|r| matches!(r.binding, ChartBinding::Query { .. })));
}

#[tokio::test]
async fn categorical_only_table_gets_count_fallbacks() {
    let db = SqliteExecutor::open_in_memory().unwrap();
    let mut seed = String::from("CREATE TABLE events (kind TEXT);");
    for i in 0..30 {
        let kind = ["click", "view", "purchase"][i % 3];
        seed.push_str(&format!("INSERT INTO events VALUES ('{kind}');"));
    }
    db.execute_batch(&seed).unwrap();

    let profile = TableProfiler::new().profile(&db, "events").await.unwrap();
    let recs = suggest_visualizations(&profile);

    let bar = recs
        .iter()
        .find(|r| r.chart == ChartType::Bar)
        .expect("fallback bar");
    match &bar.binding {
        ChartBinding::Query { query } => {
            assert_eq!(
                query,
                "SELECT kind, COUNT(*) as count FROM events GROUP BY kind ORDER BY count DESC"
            );
        }
        other => panic!("expected query binding, got {other:?}"),
    }

    assert!(recs
        .iter()
        .any(|r| r.chart == ChartType::Pie && matches!(r.binding, ChartBinding::Query { .. })));

    // No numeric columns: no histograms, no scatter plots.
    assert!(!recs.iter().any(|r| r.chart == ChartType::Histogram));
    assert!(!recs.iter().any(|r| r.chart == ChartType::Scatter));
}

#[tokio::test]
async fn recommendations_are_stable_across_runs() {
    let db = orders_database().unwrap();
    let profiler = TableProfiler::new();

    let first = suggest_visualizations(&profiler.profile(&db, "orders").await.unwrap());
    let second = suggest_visualizations(&profiler.profile(&db, "orders").await.unwrap());

    assert_eq!(first, second);
}

#[tokio::test]
async fn recommendations_serialize_with_flat_bindings() {
    let db = orders_database().unwrap();
    let profile = TableProfiler::new().profile(&db, "orders").await.unwrap();
    let recs = suggest_visualizations(&profile);

    let json = serde_json::to_value(&recs).unwrap();
    let first = &json.as_array().unwrap()[0];
    // Binding fields flatten into the recommendation object.
    assert!(first.get("x_column").is_some() || first.get("query").is_some());
    assert!(first.get("title").is_some());
    assert!(first.get("priority").is_some());
}
