//! In-memory table verbs.
//!
//! The processing layer operates on [`crate::types::DataSet`] values produced by ingestion.
//! Every verb borrows its input and returns a new dataset:
//!
//! - [`select()`] / [`rename()`]: column projection and renaming
//! - [`filter()`] / [`filter_expr()`]: row filtering by closure or by [`crate::expr::Expr`]
//! - [`arrange()`]: stable multi-key row ordering
//! - [`mutate()`]: column derivation, evaluated left to right
//! - [`group_by()`] + [`GroupedDataSet::summarise`] / [`summarise()`]: aggregation
//! - [`reduce()`]: a single reduction over one column
//!
//! The same verbs are available as methods on [`DataSet`], so a sequence of steps can be written
//! either as a `?`-chain or as nested calls.
//!
//! ## Example: mutate → arrange → select
//!
//! ```rust
//! use tidy_table::expr::col;
//! use tidy_table::processing::{arrange, mutate, select, ColumnSelector, SortKey};
//! use tidy_table::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("binomial", DataType::Utf8),
//!     Field::new("mass", DataType::Float64),
//!     Field::new("length", DataType::Float64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::from("Mus musculus"), Value::Float64(20.0), Value::Float64(80.0)],
//!         vec![Value::from("Vulpes vulpes"), Value::Float64(5000.0), Value::Float64(650.0)],
//!     ],
//! );
//!
//! let ratio = (col("mass") / col("length")).alias("ratio");
//! let keep: Vec<ColumnSelector> = vec!["binomial".into(), "ratio".into()];
//!
//! // Chained.
//! let chained = ds
//!     .mutate(&[ratio.clone()])?
//!     .arrange(&[SortKey::desc("ratio")])?
//!     .select(&keep)?;
//!
//! // Nested.
//! let nested = select(&arrange(&mutate(&ds, &[ratio])?, &[SortKey::desc("ratio")])?, &keep)?;
//!
//! assert_eq!(chained, nested);
//! assert_eq!(chained.rows[0][0], Value::from("Vulpes vulpes"));
//! # Ok::<(), tidy_table::ProcessingError>(())
//! ```

pub mod arrange;
pub mod filter;
pub mod mutate;
pub mod reduce;
pub mod select;
pub mod summarise;

pub use arrange::{arrange, SortKey};
pub use filter::{filter, filter_expr};
pub use mutate::mutate;
pub use reduce::{reduce, MissingPolicy, ReduceOp};
pub use select::{rename, resolve_columns, select, ColumnSelector};
pub use summarise::{group_by, summarise, Aggregation, GroupedDataSet};

use crate::error::ProcessingResult;
use crate::expr::{Expr, NamedExpr};
use crate::types::DataSet;

/// Method forms of the verbs, for `?`-chaining.
impl DataSet {
    /// See [`select()`].
    pub fn select(&self, selectors: &[ColumnSelector]) -> ProcessingResult<DataSet> {
        select(self, selectors)
    }

    /// See [`rename()`].
    pub fn rename(&self, renames: &[(String, String)]) -> ProcessingResult<DataSet> {
        rename(self, renames)
    }

    /// See [`filter_expr()`].
    pub fn filter(&self, predicate: &Expr) -> ProcessingResult<DataSet> {
        filter_expr(self, predicate)
    }

    /// See [`arrange()`].
    pub fn arrange(&self, keys: &[SortKey]) -> ProcessingResult<DataSet> {
        arrange(self, keys)
    }

    /// See [`mutate()`].
    pub fn mutate(&self, columns: &[NamedExpr]) -> ProcessingResult<DataSet> {
        mutate(self, columns)
    }

    /// See [`group_by()`].
    pub fn group_by<S: AsRef<str>>(&self, keys: &[S]) -> ProcessingResult<GroupedDataSet<'_>> {
        group_by(self, keys)
    }

    /// See [`summarise()`].
    pub fn summarise(&self, aggregations: &[Aggregation]) -> ProcessingResult<DataSet> {
        summarise(self, aggregations)
    }
}
