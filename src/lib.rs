//! `tidy-table` loads delimited trait tables into an in-memory [`types::DataSet`] and reshapes
//! them with a small set of table verbs.
//!
//! The primary entrypoints are [`ingestion::ingest_from_path`] (explicit [`types::Schema`]),
//! [`ingestion::ingest_from_path_inferred`] (types read off the data) and
//! [`ingestion::load_mammals`] (the PanTHERIA mammal table with its fixed schema).
//!
//! ## Ingestion
//!
//! **File formats (auto-detected by extension):**
//!
//! - **TSV**: `.tsv`, `.tab`, `.txt`
//! - **CSV**: `.csv`
//!
//! Header names are cleaned before use (`5-1_AdultBodyMass_g` → `adult_body_mass`,
//! `MSW05_Order` → `order`). Empty cells, `NA` and the numeric sentinel `-999` map to
//! [`types::Value::Null`].
//!
//! ## Verbs
//!
//! - [`processing::select()`]: keep columns by name, range, prefix/suffix, glob or regex
//! - [`processing::filter_expr()`]: keep rows where an [`expr::Expr`] predicate is true
//! - [`processing::arrange()`]: stable sort by one or more keys, ascending or descending
//! - [`processing::mutate()`]: add or replace columns computed from expressions
//! - [`processing::group_by()`] + summarise: one row per group of aggregated values
//!
//! Each verb is also a [`types::DataSet`] method, and a [`pipeline::Pipeline`] holds the same
//! steps as data (JSON-serializable).
//!
//! ```rust
//! use tidy_table::expr::col;
//! use tidy_table::processing::{Aggregation, SortKey};
//! use tidy_table::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("order", DataType::Utf8),
//!     Field::new("adult_body_mass", DataType::Float64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::from("Rodentia"), Value::Float64(19.3)],
//!         vec![Value::from("Carnivora"), Value::Float64(5000.0)],
//!         vec![Value::from("Rodentia"), Value::Null],
//!     ],
//! );
//!
//! let by_order = ds
//!     .filter(&col("adult_body_mass").is_not_null())?
//!     .group_by(&["order"])?
//!     .summarise(&[Aggregation::count(), Aggregation::mean("adult_body_mass")])?
//!     .arrange(&[SortKey::desc("mean_adult_body_mass")])?;
//!
//! assert_eq!(by_order.rows[0][0], Value::from("Carnivora"));
//! assert_eq!(by_order.rows[1][1], Value::Int64(1));
//! # Ok::<(), tidy_table::ProcessingError>(())
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: delimited readers, header cleaning, the mammal schema, observers
//! - [`types`]: schema + in-memory dataset types
//! - [`expr`]: row expressions used by filter and mutate
//! - [`processing`]: the table verbs
//! - [`pipeline`]: serializable verb sequences
//! - [`display`] / [`export`]: console preview and delimited output
//! - [`error`]: error types

pub mod display;
pub mod error;
pub mod export;
pub mod expr;
mod frame;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod types;

pub use error::{IngestionError, IngestionResult, ProcessingError, ProcessingResult};
