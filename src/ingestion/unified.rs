//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`], which ingests a file into an in-memory
//! [`crate::types::DataSet`] using a provided [`crate::types::Schema`], or
//! [`ingest_from_path_inferred`] when column types should be read off the data.
//!
//! - If [`IngestionOptions::format`] is `None`, the ingestion format is inferred from the file
//!   extension.
//! - If an [`super::observability::IngestionObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Schema};

use super::delimited::{infer_delimited_from_path, ingest_delimited_from_path, DelimitedOptions};
use super::names::NameRules;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Tab-separated values.
    Tsv,
    /// Comma-separated values.
    Csv,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "tsv" | "tab" | "txt" => Some(Self::Tsv),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Field separator byte for this format.
    pub fn delimiter(self) -> u8 {
        match self {
            Self::Tsv => b'\t',
            Self::Csv => b',',
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Header cleaning rules.
    pub name_rules: NameRules,
    /// Cells treated as missing in every column.
    pub na_tokens: Vec<String>,
    /// Numeric values treated as missing.
    pub missing_sentinels: Vec<f64>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("name_rules", &self.name_rules)
            .field("na_tokens", &self.na_tokens)
            .field("missing_sentinels", &self.missing_sentinels)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        let delimited = DelimitedOptions::default();
        Self {
            format: None,
            name_rules: delimited.name_rules,
            na_tokens: delimited.na_tokens,
            missing_sentinels: delimited.missing_sentinels,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

impl IngestionOptions {
    fn delimited(&self, format: IngestionFormat) -> DelimitedOptions {
        DelimitedOptions {
            delimiter: format.delimiter(),
            name_rules: self.name_rules.clone(),
            na_tokens: self.na_tokens.clone(),
            missing_sentinels: self.missing_sentinels.clone(),
        }
    }
}

/// Unified ingestion entry point for path-based sources.
///
/// - If `options.format` is `None`, format is inferred from the file extension.
/// - Header names are cleaned with `options.name_rules` before they are matched against
///   `schema`; columns not in the schema are ignored.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row and missing-cell counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use tidy_table::ingestion::{ingest_from_path, IngestionOptions};
/// use tidy_table::types::{DataType, Field, Schema};
///
/// # fn main() -> Result<(), tidy_table::IngestionError> {
/// let schema = Schema::new(vec![
///     Field::new("binomial", DataType::Utf8),
///     Field::new("adult_body_mass", DataType::Float64),
/// ]);
///
/// // Uses `.tsv` to select tab-separated ingestion; `5-1_AdultBodyMass_g` matches
/// // `adult_body_mass` after header cleaning.
/// let ds = ingest_from_path("mammals.tsv", &schema, &IngestionOptions::default())?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
///
/// ## Observability (tracing + alert threshold)
///
/// ```no_run
/// use std::sync::Arc;
///
/// use tidy_table::ingestion::{ingest_from_path, IngestionOptions, IngestionSeverity, TracingObserver};
/// use tidy_table::types::{DataType, Field, Schema};
///
/// let schema = Schema::new(vec![Field::new("binomial", DataType::Utf8)]);
///
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(TracingObserver)),
///     alert_at_or_above: IngestionSeverity::Critical,
///     ..Default::default()
/// };
///
/// // Missing files are treated as Critical and will trigger `on_alert` at this threshold.
/// let _err = ingest_from_path("does_not_exist.tsv", &schema, &opts).unwrap_err();
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &IngestionOptions,
) -> IngestionResult<DataSet> {
    run_observed(path.as_ref(), options, |path, delimited| {
        ingest_delimited_from_path(path, schema, delimited)
    })
}

/// Like [`ingest_from_path`], but every column of the file is kept and its type is inferred
/// from the data (see [`super::delimited::infer_delimited_from_reader`]).
pub fn ingest_from_path_inferred(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<DataSet> {
    run_observed(path.as_ref(), options, |path, delimited| infer_delimited_from_path(path, delimited))
}

fn run_observed<F>(path: &Path, options: &IngestionOptions, ingest: F) -> IngestionResult<DataSet>
where
    F: FnOnce(&Path, &DelimitedOptions) -> IngestionResult<DataSet>,
{
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };
    debug!(format = ?fmt, path = %path.display(), "ingesting");

    let ctx = IngestionContext {
        path: path.to_path_buf(),
        format: fmt,
    };

    let result = ingest(path, &options.delimited(fmt));

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(ds) => obs.on_success(&ctx, IngestionStats::from_dataset(ds)),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        IngestionError::SchemaMismatch { .. } => IngestionSeverity::Error,
        IngestionError::ParseError { .. } => IngestionSeverity::Error,
    }
}

fn infer_format_from_path(path: &Path) -> IngestionResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!("cannot infer format: path has no extension ({})", path.display()),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| IngestionError::SchemaMismatch {
        message: format!("cannot infer format from extension '{ext}' for path ({})", path.display()),
    })
}
