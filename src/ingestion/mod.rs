//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]) which:
//!
//! - auto-detects TSV/CSV by file extension (or you can override via [`IngestionOptions`])
//! - cleans header names ([`names`]) and maps NA tokens and numeric sentinels to missing values
//! - performs ingestion into an in-memory [`crate::types::DataSet`]
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! [`mammals::load_mammals`] loads the mammal trait table with its fixed schema. Reader-level
//! functions are available under [`delimited`].

pub mod delimited;
pub mod mammals;
pub mod names;
pub mod observability;
pub mod unified;

pub use delimited::DelimitedOptions;
pub use mammals::{load_mammals, load_mammals_with, mammal_schema};
pub use names::{clean_name, clean_names, NameRules};
pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, TracingObserver,
};
pub use unified::{ingest_from_path, ingest_from_path_inferred, IngestionFormat, IngestionOptions};
