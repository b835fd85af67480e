//! Reduction operations for [`crate::types::DataSet`].

use serde::{Deserialize, Serialize};

use super::summarise::{summarise, Aggregation};
use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DataSet, DataType, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReduceOp {
    /// Count rows (or, with [`MissingPolicy::Exclude`], present values).
    Count,
    /// Sum of numeric values.
    Sum,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
    /// Arithmetic mean.
    Mean,
    /// Median; the mean of the two middle values for an even count.
    Median,
    /// Sample variance (`n - 1` denominator).
    Variance,
    /// Sample standard deviation.
    StdDev,
    /// Number of distinct values.
    NDistinct,
}

impl ReduceOp {
    /// Lower-case name, used for default output column names.
    pub fn name(self) -> &'static str {
        match self {
            ReduceOp::Count => "count",
            ReduceOp::Sum => "sum",
            ReduceOp::Min => "min",
            ReduceOp::Max => "max",
            ReduceOp::Mean => "mean",
            ReduceOp::Median => "median",
            ReduceOp::Variance => "variance",
            ReduceOp::StdDev => "std_dev",
            ReduceOp::NDistinct => "n_distinct",
        }
    }

    /// Type of the reduced value for an input column of type `input`.
    pub fn output_type(self, input: DataType) -> ProcessingResult<DataType> {
        match self {
            ReduceOp::Count | ReduceOp::NDistinct => Ok(DataType::Int64),
            ReduceOp::Min | ReduceOp::Max => Ok(input),
            ReduceOp::Sum if input.is_numeric() => Ok(input),
            ReduceOp::Mean | ReduceOp::Median | ReduceOp::Variance | ReduceOp::StdDev if input.is_numeric() => {
                Ok(DataType::Float64)
            }
            op => Err(ProcessingError::TypeMismatch {
                message: format!("{}() expects a numeric column, got {input}", op.name()),
            }),
        }
    }
}

/// What a reduction does with missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Any missing input makes the result missing.
    #[default]
    Propagate,
    /// Missing inputs are dropped before reducing.
    Exclude,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Errors if `column` does not exist, or if `op` needs numbers and the column is not numeric.
/// - [`ReduceOp::Count`] counts all rows; with [`MissingPolicy::Exclude`] it counts present values.
/// - Other ops return [`Value::Null`] if a missing value is present under
///   [`MissingPolicy::Propagate`], or if nothing is left to reduce.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp, missing: MissingPolicy) -> ProcessingResult<Value> {
    let mut aggregation = Aggregation::new(op, column);
    aggregation.missing = missing;
    let out = summarise(dataset, &[aggregation])?;
    Ok(out
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.into_iter().next())
        .unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::{reduce, MissingPolicy, ReduceOp};
    use crate::error::ProcessingError;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn numeric_dataset_with_nulls() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("score", DataType::Float64),
            Field::new("order", DataType::Utf8),
        ]);

        let rows = vec![
            vec![Value::Int64(1), Value::Float64(10.0), Value::from("Rodentia")],
            vec![Value::Int64(2), Value::Null, Value::from("Carnivora")],
            vec![Value::Int64(3), Value::Float64(5.5), Value::from("Rodentia")],
        ];

        DataSet::new(schema, rows)
    }

    const EXCLUDE: MissingPolicy = MissingPolicy::Exclude;
    const PROPAGATE: MissingPolicy = MissingPolicy::Propagate;

    #[test]
    fn reduce_count_counts_rows_or_present_values() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "score", ReduceOp::Count, PROPAGATE).unwrap(), Value::Int64(3));
        assert_eq!(reduce(&ds, "score", ReduceOp::Count, EXCLUDE).unwrap(), Value::Int64(2));
        assert_eq!(reduce(&ds, "id", ReduceOp::Count, PROPAGATE).unwrap(), Value::Int64(3));
    }

    #[test]
    fn reduce_sum_preserves_type() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "score", ReduceOp::Sum, EXCLUDE).unwrap(), Value::Float64(15.5));
        assert_eq!(reduce(&ds, "id", ReduceOp::Sum, PROPAGATE).unwrap(), Value::Int64(6));
    }

    #[test]
    fn missing_values_propagate_unless_excluded() {
        let ds = numeric_dataset_with_nulls();
        for op in [ReduceOp::Sum, ReduceOp::Mean, ReduceOp::Median, ReduceOp::Min, ReduceOp::Max] {
            assert_eq!(reduce(&ds, "score", op, PROPAGATE).unwrap(), Value::Null, "{op:?}");
        }
        assert_eq!(reduce(&ds, "score", ReduceOp::Mean, EXCLUDE).unwrap(), Value::Float64(7.75));
        assert_eq!(reduce(&ds, "score", ReduceOp::Median, EXCLUDE).unwrap(), Value::Float64(7.75));
        assert_eq!(reduce(&ds, "score", ReduceOp::Min, EXCLUDE).unwrap(), Value::Float64(5.5));
        assert_eq!(reduce(&ds, "score", ReduceOp::Max, EXCLUDE).unwrap(), Value::Float64(10.0));
    }

    #[test]
    fn median_variance_and_std_dev() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "id", ReduceOp::Median, PROPAGATE).unwrap(), Value::Float64(2.0));
        assert_eq!(reduce(&ds, "id", ReduceOp::Variance, PROPAGATE).unwrap(), Value::Float64(1.0));
        assert_eq!(reduce(&ds, "id", ReduceOp::StdDev, PROPAGATE).unwrap(), Value::Float64(1.0));
        assert_eq!(reduce(&ds, "id", ReduceOp::Mean, PROPAGATE).unwrap(), Value::Float64(2.0));
    }

    #[test]
    fn min_max_and_distinct_work_on_strings() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "order", ReduceOp::Min, PROPAGATE).unwrap(), Value::from("Carnivora"));
        assert_eq!(reduce(&ds, "order", ReduceOp::NDistinct, PROPAGATE).unwrap(), Value::Int64(2));
        assert_eq!(reduce(&ds, "score", ReduceOp::NDistinct, PROPAGATE).unwrap(), Value::Int64(3));
        assert_eq!(reduce(&ds, "score", ReduceOp::NDistinct, EXCLUDE).unwrap(), Value::Int64(2));
    }

    #[test]
    fn reduce_errors_for_missing_column_and_non_numeric_mean() {
        let ds = numeric_dataset_with_nulls();
        assert!(matches!(
            reduce(&ds, "missing", ReduceOp::Count, PROPAGATE),
            Err(ProcessingError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            reduce(&ds, "order", ReduceOp::Mean, PROPAGATE),
            Err(ProcessingError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn reduce_returns_null_if_nothing_left() {
        let schema = Schema::new(vec![Field::new("score", DataType::Float64)]);
        let ds = DataSet::new(schema, vec![vec![Value::Null], vec![Value::Null]]);
        for op in [ReduceOp::Sum, ReduceOp::Min, ReduceOp::Max, ReduceOp::Mean, ReduceOp::StdDev] {
            assert_eq!(reduce(&ds, "score", op, EXCLUDE).unwrap(), Value::Null, "{op:?}");
        }
        assert_eq!(reduce(&ds, "score", ReduceOp::Count, EXCLUDE).unwrap(), Value::Int64(0));
    }
}
