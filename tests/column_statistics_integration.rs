//! Integration tests for the column statistics generator.

use sqlite_eda::analyzers::errors::AnalyzerError;
use sqlite_eda::analyzers::statistics::{ColumnStatistics, StatisticsGenerator};
use sqlite_eda::sources::{SqliteExecutor, Value};
use sqlite_eda::test_fixtures::{labels_database, measurements_database, orders_database};

#[tokio::test]
async fn numeric_statistics_over_one_to_ten() {
    let db = measurements_database().unwrap();
    let generator = StatisticsGenerator::new();

    let stats = generator
        .generate(&db, "measurements", "reading")
        .await
        .unwrap();

    let ColumnStatistics::Numeric(numeric) = stats else {
        panic!("expected numeric statistics");
    };

    assert_eq!(numeric.counts.count, 10);
    assert_eq!(numeric.counts.nulls, 0);
    assert_eq!(numeric.counts.null_percent, 0);
    assert_eq!(numeric.counts.distinct_count, 10);
    assert_eq!(numeric.counts.distinct_percent, 100);

    assert_eq!(numeric.min, Some(1.0));
    assert_eq!(numeric.max, Some(10.0));
    assert_eq!(numeric.mean, Some(5.5));

    // Nearest-rank percentiles over 1..=10.
    assert_eq!(numeric.percentile_25, Some(2.0));
    assert_eq!(numeric.percentile_75, Some(7.0));

    let histogram = numeric.histogram.expect("histogram");
    assert_eq!(histogram.buckets.len(), 10);
    assert_eq!(histogram.counts.len(), 10);
    assert_eq!(histogram.counts.iter().sum::<u64>(), 10);
    // The final bucket is inclusive, so the maximum lands in it.
    assert_eq!(*histogram.counts.last().unwrap(), 1);

    assert_eq!(numeric.top_values.len(), 5);
    assert!(numeric.top_values.iter().all(|tv| tv.count == 1));
}

#[tokio::test]
async fn numeric_statistics_count_nulls() {
    let db = SqliteExecutor::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE readings (v REAL);
         INSERT INTO readings VALUES (1.5), (2.5), (NULL), (NULL);",
    )
    .unwrap();

    let stats = StatisticsGenerator::new()
        .generate(&db, "readings", "v")
        .await
        .unwrap();

    let ColumnStatistics::Numeric(numeric) = stats else {
        panic!("expected numeric statistics");
    };
    assert_eq!(numeric.counts.count, 2);
    assert_eq!(numeric.counts.nulls, 2);
    assert_eq!(numeric.counts.null_percent, 50);
    assert_eq!(numeric.mean, Some(2.0));
}

#[tokio::test]
async fn text_statistics_mark_low_cardinality_as_categorical() {
    let db = labels_database().unwrap();
    let generator = StatisticsGenerator::new();

    let stats = generator.generate(&db, "labels", "tag").await.unwrap();

    let ColumnStatistics::Text(text) = stats else {
        panic!("expected text statistics");
    };

    assert_eq!(text.counts.count, 4);
    assert_eq!(text.counts.distinct_count, 3);
    assert_eq!(text.counts.distinct_percent, 75);
    assert_eq!(text.min_length, Some(1));
    assert_eq!(text.max_length, Some(1));
    assert_eq!(text.avg_length, Some(1.0));

    assert!(text.is_likely_categorical);
    let categories = text.categories.expect("categories");
    assert_eq!(categories.len(), 3);
    assert_eq!(categories.iter().map(|c| c.count).sum::<u64>(), 4);

    // 'a' appears twice and sorts first; the other two split the rest.
    assert_eq!(categories[0].value, Value::Text("a".into()));
    assert_eq!(categories[0].count, 2);
    assert_eq!(categories[0].percent, 50);
    assert!(categories[1..].iter().all(|c| c.count == 1 && c.percent == 25));

    let percents: Vec<u32> = categories.iter().map(|c| c.percent).collect();
    assert_eq!(percents, vec![50, 25, 25]);
}

#[tokio::test]
async fn text_statistics_skip_categories_for_high_cardinality() {
    let db = SqliteExecutor::open_in_memory().unwrap();
    let mut seed = String::from("CREATE TABLE notes (body TEXT);");
    for i in 0..30 {
        seed.push_str(&format!("INSERT INTO notes VALUES ('note_number_{i}');"));
    }
    db.execute_batch(&seed).unwrap();

    let stats = StatisticsGenerator::new()
        .generate(&db, "notes", "body")
        .await
        .unwrap();

    let ColumnStatistics::Text(text) = stats else {
        panic!("expected text statistics");
    };
    assert_eq!(text.counts.distinct_count, 30);
    assert!(!text.is_likely_categorical);
    assert!(text.categories.is_none());
    assert_eq!(text.top_values.len(), 5);
}

#[tokio::test]
async fn date_statistics_cover_range_and_distributions() {
    let db = orders_database().unwrap();
    let generator = StatisticsGenerator::new();

    let stats = generator
        .generate(&db, "orders", "created_at")
        .await
        .unwrap();

    let ColumnStatistics::Date(date) = stats else {
        panic!("expected date statistics");
    };

    assert_eq!(date.counts.count, 100);
    assert_eq!(date.min_date.as_deref(), Some("2024-01-01"));
    assert_eq!(date.max_date.as_deref(), Some("2024-12-28"));
    assert_eq!(date.range_days, Some(362));

    let years = date.year_distribution.expect("year distribution");
    assert_eq!(years.len(), 1);
    assert_eq!(years[0].period, "2024");
    assert_eq!(years[0].count, 100);
    assert_eq!(years[0].percent, 100);

    let months = date.month_distribution.expect("month distribution");
    assert_eq!(months.len(), 12);
    assert_eq!(months[0].period, "2024-01");
    assert_eq!(months.iter().map(|m| m.count).sum::<u64>(), 100);
}

#[tokio::test]
async fn first_null_value_falls_back_to_generic() {
    let db = SqliteExecutor::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE misc (note TEXT);
         INSERT INTO misc VALUES (NULL), ('x'), ('y');",
    )
    .unwrap();

    let stats = StatisticsGenerator::new()
        .generate(&db, "misc", "note")
        .await
        .unwrap();

    let ColumnStatistics::Generic(generic) = stats else {
        panic!("expected generic statistics");
    };
    assert_eq!(generic.counts.count, 2);
    assert_eq!(generic.counts.nulls, 1);
    assert_eq!(generic.counts.null_percent, 33);
    assert_eq!(generic.counts.distinct_count, 2);
    assert_eq!(generic.top_values.len(), 2);
}

#[tokio::test]
async fn empty_table_reports_no_data() {
    let db = SqliteExecutor::open_in_memory().unwrap();
    db.execute_batch("CREATE TABLE hollow (v INTEGER);").unwrap();

    let err = StatisticsGenerator::new()
        .generate(&db, "hollow", "v")
        .await;
    assert!(matches!(err, Err(AnalyzerError::NoData)));
}

#[tokio::test]
async fn unsafe_identifiers_are_rejected_before_querying() {
    let db = measurements_database().unwrap();
    let generator = StatisticsGenerator::new();

    let err = generator
        .generate(&db, "measurements", "reading; DROP TABLE measurements")
        .await;
    assert!(matches!(err, Err(AnalyzerError::InvalidIdentifier(_))));

    // The table is untouched.
    let ok = generator.generate(&db, "measurements", "reading").await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn missing_column_is_a_query_error() {
    let db = measurements_database().unwrap();
    let err = StatisticsGenerator::new()
        .generate(&db, "measurements", "nope")
        .await;
    assert!(matches!(err, Err(AnalyzerError::Query(_))));
}

#[tokio::test]
async fn statistics_serialize_to_tagged_json() {
    let db = measurements_database().unwrap();
    let stats = StatisticsGenerator::new()
        .generate(&db, "measurements", "reading")
        .await
        .unwrap();

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["kind"], "numeric");
    assert_eq!(json["count"], 10);
    assert_eq!(json["min"], 1.0);
    assert_eq!(json["histogram"]["counts"].as_array().unwrap().len(), 10);
}
