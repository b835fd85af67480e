use std::sync::{Arc, Mutex};

use tidy_table::ingestion::{
    ingest_from_path, load_mammals_with, CompositeObserver, IngestionContext, IngestionFormat, IngestionObserver,
    IngestionOptions, IngestionSeverity, IngestionStats, TracingObserver,
};
use tidy_table::types::{DataType, Field, Schema};
use tidy_table::IngestionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestionStats>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn schema_missing_col() -> Schema {
    Schema::new(vec![Field::new("definitely_missing", DataType::Utf8)])
}

#[test]
fn observer_receives_row_and_missing_cell_counts() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    load_mammals_with("tests/fixtures/mammals.tsv", &opts).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![IngestionStats {
            rows: 12,
            missing_cells: 7,
        }]
    );
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        format: Some(IngestionFormat::Tsv),
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    };

    // Missing file -> Io error -> Critical
    let _ = ingest_from_path("tests/fixtures/does_not_exist.tsv", &schema_missing_col(), &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Critical]);
    assert_eq!(alerts, vec![IngestionSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    };

    // Schema mismatch -> Error severity (not Critical) -> should not alert
    let _ = ingest_from_path("tests/fixtures/mammals.tsv", &schema_missing_col(), &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn composite_observer_fans_out() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn IngestionObserver>> = vec![
        a.clone() as Arc<dyn IngestionObserver>,
        b.clone() as Arc<dyn IngestionObserver>,
        Arc::new(TracingObserver) as Arc<dyn IngestionObserver>,
    ];
    let composite = CompositeObserver::new(observers);
    let opts = IngestionOptions {
        observer: Some(Arc::new(composite)),
        alert_at_or_above: IngestionSeverity::Error,
        ..Default::default()
    };

    let _ = ingest_from_path("tests/fixtures/mammals.tsv", &schema_missing_col(), &opts).unwrap_err();

    for obs in [&a, &b] {
        assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Error]);
        assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestionSeverity::Error]);
    }
}
