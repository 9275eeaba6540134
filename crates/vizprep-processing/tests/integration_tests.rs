//! Integration tests for loading, cleaning and exporting datasets.
//!
//! These tests drive the public API end to end using the files in
//! `tests/fixtures` and a few generated inputs.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vizprep_processing::{
    CleaningConfig, CleaningPipeline, ColumnKind, DuplicateMode, MissingStrategy, OutlierHandler,
    OutlierStrategy, PipelineStage, PreprocessingError, Session, handle_duplicates,
    handle_missing, handle_outliers, load_dataset, load_dataset_from_path, summarize,
    to_csv_bytes,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn str_column(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect()
}

/// 20 values around 50 plus one far spike in each numeric column.
fn spiked_measurements() -> DataFrame {
    let mut temperature: Vec<f64> = (0..20).map(|i| 50.0 + (i % 5) as f64).collect();
    temperature.push(500.0);
    let mut pressure: Vec<f64> = (0..20).map(|i| 10.0 + (i % 3) as f64).collect();
    pressure.insert(3, 900.0);
    let sensor: Vec<String> = (0..21).map(|i| format!("s{}", i % 4)).collect();

    df![
        "sensor" => sensor,
        "temperature" => temperature,
        "pressure" => pressure,
    ]
    .unwrap()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_semicolon_csv_fixture() {
    let df = load_dataset_from_path(fixtures_path().join("sales_semicolon.csv")).unwrap();

    assert_eq!(df.shape(), (5, 4));
    assert_eq!(column_names(&df), vec!["region", "month", "units", "price"]);
    assert_eq!(df.column("units").unwrap().null_count(), 1);
}

#[test]
fn test_load_json_records_fixture() {
    let df = load_dataset_from_path(fixtures_path().join("people_records.json")).unwrap();

    assert_eq!(column_names(&df), vec!["name", "age", "score", "active"]);
    assert_eq!(df.column("age").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("score").unwrap().dtype(), &DataType::Float64);
    assert_eq!(df.column("active").unwrap().dtype(), &DataType::Boolean);
    assert_eq!(
        f64_column(&df, "score"),
        vec![Some(88.5), Some(92.0), Some(75.25)]
    );
}

#[test]
fn test_json_records_and_columns_agree() {
    let records = load_dataset_from_path(fixtures_path().join("people_records.json")).unwrap();
    let columns = load_dataset_from_path(fixtures_path().join("people_columns.json")).unwrap();

    assert_eq!(column_names(&columns), vec!["name", "age", "score"]);
    let records = records.select(["name", "age", "score"]).unwrap();
    assert!(records.equals_missing(&columns));
}

#[test]
fn test_latin1_csv_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cities.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"city,population\nN\xeemes,151001\nLyon,522250\n")
        .unwrap();
    drop(file);

    let session = Session::from_path(&path).unwrap();

    assert_eq!(session.source_name(), "cities.csv");
    assert_eq!(
        str_column(session.original(), "city"),
        vec![Some("Nîmes".to_string()), Some("Lyon".to_string())]
    );
}

#[test]
fn test_unsupported_format_is_reported() {
    let err = Session::from_bytes(b"a,b\n1,2\n", "notes.txt").unwrap_err();

    assert!(matches!(err, PreprocessingError::UnsupportedFormat(_)));
    assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    assert!(err.is_recoverable());
}

#[test]
fn test_corrupt_file_is_a_load_error() {
    let err = load_dataset(b"{not json", "broken.json").unwrap_err();
    assert_eq!(err.error_code(), "LOAD_ERROR");

    let err = load_dataset(b"", "empty.csv").unwrap_err();
    assert_eq!(err.error_code(), "LOAD_ERROR");
}

#[test]
fn test_na_tokens_load_as_missing() {
    let df = load_dataset(b"a,b\n1,x\nNA,y\n3,z\n", "tokens.csv").unwrap();

    assert_eq!(df.column("a").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("a").unwrap().null_count(), 1);
    assert_eq!(summarize(&df).unwrap().missing_cells, 1);
}

#[test]
fn test_nan_cells_are_filled_like_nulls() {
    let df = load_dataset(b"x,y\n1.0,a\nNaN,b\n3.0,c\n", "nan.csv").unwrap();
    assert_eq!(summarize(&df).unwrap().missing_cells, 1);

    let (out, report) = handle_missing(df, MissingStrategy::Mean).unwrap();

    assert_eq!(f64_column(&out, "x"), vec![Some(1.0), Some(2.0), Some(3.0)]);
    assert_eq!(report.values_filled, 1);
}

// ============================================================================
// Summary
// ============================================================================

#[test]
fn test_summary_of_fixture() {
    let df = load_dataset_from_path(fixtures_path().join("sales_semicolon.csv")).unwrap();
    let summary = summarize(&df).unwrap();

    assert_eq!(summary.rows, 5);
    assert_eq!(summary.columns, 4);
    assert_eq!(summary.missing_cells, 1);
    assert_eq!(summary.duplicate_rows, 1);
    assert!(summary.has_missing());

    let kinds: Vec<ColumnKind> = summary.column_summaries.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ColumnKind::Categorical,
            ColumnKind::Categorical,
            ColumnKind::Numeric,
            ColumnKind::Numeric,
        ]
    );
}

// ============================================================================
// Cleaning Scenarios
// ============================================================================

#[test]
fn test_mean_fill_of_single_gap() {
    let df = df!["x" => [Some(1.0), None, Some(3.0)]].unwrap();

    let (out, report) = handle_missing(df, MissingStrategy::Mean).unwrap();

    assert_eq!(f64_column(&out, "x"), vec![Some(1.0), Some(2.0), Some(3.0)]);
    assert_eq!(report.values_filled, 1);
}

#[test]
fn test_missing_handling_is_idempotent() {
    let df = df![
        "x" => [Some(1.0), None, Some(3.0)],
        "label" => [Some("a"), Some("a"), None],
    ]
    .unwrap();

    let (once, _) = handle_missing(df, MissingStrategy::Median).unwrap();
    let (twice, report) = handle_missing(once.clone(), MissingStrategy::Median).unwrap();

    assert!(once.equals_missing(&twice));
    assert_eq!(report.values_filled, 0);
}

#[test]
fn test_duplicates_keep_first_occurrence() {
    let df = df![
        "id" => [1, 2, 1, 3, 2],
        "tag" => ["a", "b", "a", "c", "b"],
    ]
    .unwrap();

    let (out, removed) = handle_duplicates(df, DuplicateMode::Remove).unwrap();

    assert_eq!(removed, 2);
    assert_eq!(
        str_column(&out, "tag"),
        vec![
            Some("a".to_string()),
            Some("b".to_string()),
            Some("c".to_string())
        ]
    );
}

#[test]
fn test_outlier_mean_replacement_scenario() {
    let df = df!["v" => [1.0, 2.0, 3.0, 1000.0]].unwrap();

    let (out, report) = handle_outliers(df, OutlierStrategy::Mean, 1.5).unwrap();

    assert_eq!(
        f64_column(&out, "v"),
        vec![Some(1.0), Some(2.0), Some(3.0), Some(251.5)]
    );
    assert_eq!(report.total_detected(), 1);
    assert_eq!(report.values_changed, 1);
}

#[test]
fn test_outlier_nothing_leaves_data_unchanged() {
    let df = spiked_measurements();

    let (out, report) = handle_outliers(df.clone(), OutlierStrategy::Nothing, 3.0).unwrap();

    assert!(out.equals_missing(&df));
    assert_eq!(report.total_detected(), 2);
    assert_eq!(report.values_changed, 0);
}

#[test]
fn test_outlier_drop_removes_exactly_flagged_rows() {
    let df = spiked_measurements();
    let threshold = 3.0;

    let scores = OutlierHandler::detect(&df, threshold).unwrap();
    let flagged_rows = (0..df.height())
        .filter(|&row| scores.iter().any(|s| s.flags[row]))
        .count();
    assert_eq!(flagged_rows, 2);

    let (out, report) = handle_outliers(df.clone(), OutlierStrategy::Drop, threshold).unwrap();

    assert_eq!(out.height(), df.height() - flagged_rows);
    assert_eq!(report.rows_dropped, flagged_rows);
    assert!(f64_column(&out, "temperature").iter().all(|v| v.unwrap() < 100.0));
    assert!(f64_column(&out, "pressure").iter().all(|v| v.unwrap() < 100.0));
}

#[test]
fn test_log_transformation_only_touches_positive_values() {
    let df = df!["v" => [0.0, -2.0, std::f64::consts::E - 1.0]].unwrap();

    let (out, _) = handle_outliers(df, OutlierStrategy::LogTransformation, 3.0).unwrap();

    let values = f64_column(&out, "v");
    assert_eq!(values[0], Some(0.0));
    assert_eq!(values[1], Some(-2.0));
    assert!((values[2].unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn test_invalid_threshold_is_rejected() {
    let df = spiked_measurements();
    assert!(handle_outliers(df, OutlierStrategy::Drop, 0.0).is_err());

    let config = CleaningConfig {
        outlier_threshold: -1.0,
        ..CleaningConfig::default()
    };
    assert!(CleaningPipeline::builder().config(config).build().is_err());
}

// ============================================================================
// Full Pipeline
// ============================================================================

#[test]
fn test_full_pipeline_on_fixture() {
    let df = load_dataset_from_path(fixtures_path().join("sales_semicolon.csv")).unwrap();
    let config = CleaningConfig::builder()
        .missing_strategy(MissingStrategy::Mean)
        .duplicate_mode(DuplicateMode::Remove)
        .outlier_strategy(OutlierStrategy::Nothing)
        .build()
        .unwrap();

    let outcome = CleaningPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(df)
        .unwrap();

    assert_eq!(outcome.data.height(), 4);
    assert_eq!(outcome.data.column("units").unwrap().null_count(), 0);
    // mean of 10, 12, 12, 11
    assert_eq!(f64_column(&outcome.data, "units")[1], Some(11.25));
    assert_eq!(outcome.report.rows_before, 5);
    assert_eq!(outcome.report.rows_after, 4);
    assert_eq!(outcome.report.missing.values_filled, 1);
    assert_eq!(outcome.report.duplicates_removed, 1);
}

#[test]
fn test_pipeline_reports_progress_until_complete() {
    let updates = Arc::new(AtomicUsize::new(0));
    let last_stage = Arc::new(std::sync::Mutex::new(None));

    let updates_clone = Arc::clone(&updates);
    let last_clone = Arc::clone(&last_stage);
    let pipeline = CleaningPipeline::builder()
        .on_progress(move |update| {
            updates_clone.fetch_add(1, Ordering::SeqCst);
            *last_clone.lock().unwrap() = Some(update.stage);
        })
        .build()
        .unwrap();

    pipeline.run(spiked_measurements()).unwrap();

    assert!(updates.load(Ordering::SeqCst) >= 4);
    assert_eq!(*last_stage.lock().unwrap(), Some(PipelineStage::Complete));
}

#[test]
fn test_session_clean_is_reproducible() {
    let bytes = std::fs::read(fixtures_path().join("sales_semicolon.csv")).unwrap();
    let mut session = Session::from_bytes(&bytes, "sales_semicolon.csv").unwrap();
    let config = CleaningConfig::builder()
        .missing_strategy(MissingStrategy::Drop)
        .build()
        .unwrap();

    session.clean(config.clone()).unwrap();
    let first = session.cleaned().unwrap().clone();
    session.clean(config).unwrap();

    assert!(first.equals_missing(session.cleaned().unwrap()));
    assert_eq!(session.original().height(), 5);
    assert_eq!(session.report().unwrap().missing.rows_dropped, 1);
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_round_trip() {
    let df = load_dataset_from_path(fixtures_path().join("sales_semicolon.csv")).unwrap();

    let bytes = to_csv_bytes(&df).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.starts_with("region,month,units,price\n"));

    let reloaded = load_dataset(&bytes, "export.csv").unwrap();
    assert_eq!(reloaded.shape(), df.shape());
    assert_eq!(column_names(&reloaded), column_names(&df));
    assert_eq!(str_column(&reloaded, "region"), str_column(&df, "region"));
    assert_eq!(f64_column(&reloaded, "price"), f64_column(&df, "price"));
}

#[test]
fn test_export_round_trip_with_separators_in_values() {
    let df = df![
        "note" => ["x;y", "a, b", "tab\there"],
        "n" => [1i64, 2, 3],
    ]
    .unwrap();

    let bytes = to_csv_bytes(&df).unwrap();
    let reloaded = load_dataset(&bytes, "notes.csv").unwrap();

    assert_eq!(column_names(&reloaded), vec!["note", "n"]);
    assert_eq!(str_column(&reloaded, "note"), str_column(&df, "note"));
    assert_eq!(reloaded.column("n").unwrap().dtype(), &DataType::Int64);
}

#[test]
fn test_session_export_to_disk() {
    let mut session =
        Session::from_path(fixtures_path().join("people_records.json")).unwrap();
    session.clean(CleaningConfig::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/people.csv");
    vizprep_processing::save_csv(session.current(), &path).unwrap();

    let reloaded = load_dataset_from_path(&path).unwrap();
    assert_eq!(reloaded.height(), 3);
    assert_eq!(reloaded.column("age").unwrap().null_count(), 0);
}
