//! Row filtering for [`crate::types::DataSet`].

use crate::error::{ProcessingError, ProcessingResult};
use crate::expr::Expr;
use crate::frame::run_lazy;
use crate::types::{DataSet, DataType, Value};

/// Returns a new [`DataSet`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`DataSet::filter_rows`].
pub fn filter<F>(dataset: &DataSet, predicate: F) -> DataSet
where
    F: FnMut(&[Value]) -> bool,
{
    dataset.filter_rows(predicate)
}

/// Returns a new [`DataSet`] containing only rows where `predicate` evaluates to `true`.
///
/// The predicate must be boolean. Rows where it evaluates to a missing value are dropped, the
/// same as rows where it is `false`. Schema and relative row order are preserved.
pub fn filter_expr(dataset: &DataSet, predicate: &Expr) -> ProcessingResult<DataSet> {
    let ty = predicate.output_type(&dataset.schema)?;
    if ty != DataType::Bool {
        return Err(ProcessingError::TypeMismatch {
            message: format!("filter predicate `{predicate}` must be bool, got {ty}"),
        });
    }

    let predicate = predicate.to_polars();
    run_lazy(dataset, dataset.schema.clone(), |lf| lf.filter(predicate))
}
