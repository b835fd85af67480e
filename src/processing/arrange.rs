//! Row ordering for [`crate::types::DataSet`].

use polars::prelude::{self as pl, SortMultipleOptions};
use serde::{Deserialize, Serialize};

use crate::error::ProcessingResult;
use crate::frame::run_lazy;
use crate::types::{DataSet, DataType};

/// One sort key: a column and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

impl SortKey {
    /// Ascending by `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Descending by `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// Sort or group key expression for a column. Float keys are shifted by `+0.0` so that `-0.0`
/// and `0.0` fall together.
pub(crate) fn key_expr(name: &str, data_type: DataType) -> pl::Expr {
    match data_type {
        DataType::Float64 => (pl::col(name) + pl::lit(0.0)).alias(name),
        _ => pl::col(name),
    }
}

/// Returns a new [`DataSet`] with rows ordered by `keys`.
///
/// Missing values sort last in either direction. The sort is stable: rows that compare equal
/// on every key keep their input order, so arranging an already arranged table by the same keys
/// returns it unchanged.
pub fn arrange(dataset: &DataSet, keys: &[SortKey]) -> ProcessingResult<DataSet> {
    if keys.is_empty() {
        return Ok(dataset.clone());
    }

    let mut by = Vec::with_capacity(keys.len());
    for key in keys {
        let idx = dataset.schema.require_index(&key.column)?;
        by.push(key_expr(&key.column, dataset.schema.fields[idx].data_type));
    }
    let options = SortMultipleOptions::default()
        .with_order_descending_multi(keys.iter().map(|k| k.descending))
        .with_nulls_last(true)
        .with_maintain_order(true);

    run_lazy(dataset, dataset.schema.clone(), |lf| lf.sort_by_exprs(by, options))
}
