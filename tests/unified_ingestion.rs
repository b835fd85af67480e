use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tidy_table::ingestion::{
    ingest_from_path, ingest_from_path_inferred, IngestionFormat, IngestionOptions, NameRules,
};
use tidy_table::types::{DataType, Field, Schema, Value};
use tidy_table::IngestionError;

const FIXTURE: &str = "tests/fixtures/mammals.tsv";

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tidy-table-unified-{nanos}.{ext}"))
}

/// The fixture rewritten with commas instead of tabs.
fn fixture_as_csv(ext: &str) -> PathBuf {
    let path = tmp_file(ext);
    let text = fs::read_to_string(FIXTURE).unwrap().replace('\t', ",");
    fs::write(&path, text).unwrap();
    path
}

fn mass_schema() -> Schema {
    Schema::new(vec![
        Field::new("binomial", DataType::Utf8),
        Field::new("adult_body_mass", DataType::Float64),
    ])
}

#[test]
fn tsv_is_detected_by_extension() {
    let ds = ingest_from_path(FIXTURE, &mass_schema(), &IngestionOptions::default()).unwrap();
    assert_eq!(ds.row_count(), 12);
    assert_eq!(ds.rows[11], vec![Value::from("Balaenoptera musculus"), Value::Float64(154321304.5)]);
}

#[test]
fn csv_is_detected_by_extension() {
    let path = fixture_as_csv("csv");
    let ds = ingest_from_path(&path, &mass_schema(), &IngestionOptions::default()).unwrap();
    let _ = fs::remove_file(&path);
    assert_eq!(ds.row_count(), 12);
    assert_eq!(ds.rows[1], vec![Value::from("Vulpes vulpes"), Value::Float64(5476.18)]);
}

#[test]
fn forced_format_overrides_extension() {
    let path = fixture_as_csv("dat");
    let opts = IngestionOptions {
        format: Some(IngestionFormat::Csv),
        ..Default::default()
    };
    let ds = ingest_from_path(&path, &mass_schema(), &opts).unwrap();
    let _ = fs::remove_file(&path);
    assert_eq!(ds.row_count(), 12);
}

#[test]
fn unknown_extension_is_rejected() {
    let err = ingest_from_path("tests/fixtures/mammals.parquet", &mass_schema(), &IngestionOptions::default())
        .unwrap_err();
    match err {
        IngestionError::SchemaMismatch { message } => assert!(message.contains("parquet")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn inferred_ingestion_keeps_every_column() {
    let ds = ingest_from_path_inferred(FIXTURE, &IngestionOptions::default()).unwrap();

    assert_eq!(
        ds.schema.field_names().collect::<Vec<_>>(),
        vec![
            "order",
            "family",
            "genus",
            "species",
            "binomial",
            "activity_cycle",
            "adult_body_mass",
            "adult_head_body_len",
            "home_range",
            "litter_size",
            "references",
        ]
    );
    let field = |name: &str| ds.schema.field(name).unwrap().data_type;
    assert_eq!(field("activity_cycle"), DataType::Int64);
    assert_eq!(field("adult_body_mass"), DataType::Float64);
    assert_eq!(field("references"), DataType::Utf8);

    let cycles = ds.column_values("activity_cycle").unwrap();
    assert_eq!(cycles[0], &Value::Int64(1));
    assert_eq!(cycles[8], &Value::Null);
}

#[test]
fn verbatim_name_rules_keep_raw_headers() {
    let opts = IngestionOptions {
        name_rules: NameRules::verbatim(),
        ..Default::default()
    };
    let schema = Schema::new(vec![Field::new("5-1_AdultBodyMass_g", DataType::Float64)]);
    let ds = ingest_from_path(FIXTURE, &schema, &opts).unwrap();
    assert_eq!(ds.rows[0][0], Value::Float64(19.3));
}
