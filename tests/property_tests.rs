//! Property-based tests for the value classifier and type detector.

use proptest::prelude::*;
use sqlite_eda::analyzers::inference::{classify_value, DetectedType, TypeDetector, ValueKind};
use sqlite_eda::sources::Value;

proptest! {
    #[test]
    fn any_integer_classifies_as_integer(n in any::<i64>()) {
        prop_assert_eq!(classify_value(&Value::Integer(n)), ValueKind::Integer);
    }

    #[test]
    fn integer_text_classifies_as_integer(n in -1_000_000i64..1_000_000) {
        let value = Value::Text(n.to_string());
        prop_assert_eq!(classify_value(&value), ValueKind::Integer);
    }

    #[test]
    fn fractional_reals_classify_as_float(n in -1_000_000i64..1_000_000) {
        let value = Value::Real(n as f64 + 0.5);
        prop_assert_eq!(classify_value(&value), ValueKind::Float);
    }

    #[test]
    fn well_formed_dates_classify_as_date(
        year in 1970i32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
    ) {
        let value = Value::Text(format!("{year:04}-{month:02}-{day:02}"));
        prop_assert_eq!(classify_value(&value), ValueKind::Date);
    }

    #[test]
    fn well_formed_datetimes_classify_as_datetime(
        year in 1970i32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
        hour in 0u32..24,
        minute in 0u32..60,
        second in 0u32..60,
    ) {
        let value = Value::Text(format!(
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}"
        ));
        prop_assert_eq!(classify_value(&value), ValueKind::DateTime);
    }

    #[test]
    fn alphabetic_text_classifies_as_string(s in "[a-zA-Z]{1,24}") {
        // Exclude the boolean literals and anything Rust parses as a number
        // ("inf", "NaN", and friends).
        prop_assume!(s != "true" && s != "false");
        prop_assume!(s.parse::<f64>().is_err());

        prop_assert_eq!(classify_value(&Value::Text(s)), ValueKind::Text);
    }

    #[test]
    fn homogeneous_integer_columns_detect_with_full_confidence(
        values in prop::collection::vec(any::<i64>(), 1..200)
    ) {
        let sample: Vec<Value> = values.into_iter().map(Value::Integer).collect();
        let info = TypeDetector::new().detect(&sample);

        prop_assert_eq!(info.data_type, DetectedType::Integer);
        prop_assert_eq!(info.confidence, 100);
        prop_assert_eq!(info.stats.total_count, sample.len());
    }

    #[test]
    fn detection_never_panics_on_mixed_input(
        values in prop::collection::vec(
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Boolean),
                any::<i64>().prop_map(Value::Integer),
                any::<f64>().prop_map(Value::Real),
                "[ -~]{0,32}".prop_map(Value::Text),
            ],
            0..100,
        )
    ) {
        let info = TypeDetector::new().detect(&values);
        prop_assert!(info.confidence <= 100);
        prop_assert!(info.examples.len() <= 5);
    }
}
