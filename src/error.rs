use polars::prelude::PolarsError;
use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for processing verbs and pipelines.
pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Error type returned by ingestion and export functions.
///
/// This is a single error enum shared across delimited (TSV/CSV) ingestion and export.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text reader/writer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input does not conform to the provided schema (missing required columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Error type returned by the processing verbs (select/filter/arrange/mutate/summarise) and
/// pipelines.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// An expression or selector referenced a column that does not exist.
    #[error("column '{name}' not found. columns={available:?}")]
    ColumnNotFound { name: String, available: Vec<String> },

    /// An expression combined values of incompatible types.
    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },

    /// An expression, selector pattern or aggregation is malformed.
    #[error("invalid expression: {message}")]
    InvalidExpression { message: String },

    /// An operation would produce two columns with the same name.
    #[error("duplicate column '{name}'")]
    DuplicateColumn { name: String },

    /// A row does not have one value per schema field.
    #[error("row {row} has {found} values, schema has {expected} fields")]
    RowWidth { row: usize, expected: usize, found: usize },

    /// The dataframe engine rejected a plan.
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    /// A serialized pipeline could not be decoded.
    #[error("invalid pipeline spec: {message}")]
    Spec { message: String },

    /// Underlying I/O error while reading a pipeline spec.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ProcessingError {
    fn from(e: serde_json::Error) -> Self {
        ProcessingError::Spec {
            message: e.to_string(),
        }
    }
}
