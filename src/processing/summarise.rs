//! Grouped aggregation for [`crate::types::DataSet`].
//!
//! [`group_by`] partitions rows by the values of one or more key columns;
//! [`GroupedDataSet::summarise`] reduces each partition to a single row. Without keys,
//! [`summarise`] reduces the whole table to exactly one row.

use polars::prelude::{self as pl, SortMultipleOptions};
use serde::{Deserialize, Serialize};

use super::arrange::key_expr;
use super::reduce::{MissingPolicy, ReduceOp};
use crate::error::{ProcessingError, ProcessingResult};
use crate::frame::{polars_type, run_lazy};
use crate::types::{DataSet, DataType, Field, Schema};

/// One output column of a summarise: `name = op(column)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub name: String,
    pub op: ReduceOp,
    /// Input column. Only [`ReduceOp::Count`] may omit it, meaning "rows in the group".
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub missing: MissingPolicy,
}

impl Aggregation {
    /// `op(column)`, named `<op>_<column>` until [`Aggregation::alias`] renames it.
    pub fn new(op: ReduceOp, column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: format!("{}_{column}", op.name()),
            op,
            column: Some(column),
            missing: MissingPolicy::default(),
        }
    }

    /// Number of rows in each group, named `n`.
    pub fn count() -> Self {
        Self {
            name: "n".to_string(),
            op: ReduceOp::Count,
            column: None,
            missing: MissingPolicy::default(),
        }
    }

    pub fn mean(column: impl Into<String>) -> Self {
        Self::new(ReduceOp::Mean, column)
    }

    pub fn median(column: impl Into<String>) -> Self {
        Self::new(ReduceOp::Median, column)
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Self::new(ReduceOp::Sum, column)
    }

    pub fn min(column: impl Into<String>) -> Self {
        Self::new(ReduceOp::Min, column)
    }

    pub fn max(column: impl Into<String>) -> Self {
        Self::new(ReduceOp::Max, column)
    }

    pub fn std_dev(column: impl Into<String>) -> Self {
        Self::new(ReduceOp::StdDev, column)
    }

    pub fn n_distinct(column: impl Into<String>) -> Self {
        Self::new(ReduceOp::NDistinct, column)
    }

    /// Rename the output column.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Drop missing values before reducing.
    pub fn exclude_missing(mut self) -> Self {
        self.missing = MissingPolicy::Exclude;
        self
    }

    /// Resolve against `schema`: the output field and the Polars aggregation producing it.
    fn bind(&self, schema: &Schema) -> ProcessingResult<(Field, pl::Expr)> {
        let Some(column) = &self.column else {
            if self.op != ReduceOp::Count {
                return Err(ProcessingError::InvalidExpression {
                    message: format!("aggregation '{}' needs an input column for {}()", self.name, self.op.name()),
                });
            }
            let expr = pl::len().cast(pl::DataType::Int64).alias(self.name.as_str());
            return Ok((Field::new(self.name.clone(), DataType::Int64), expr));
        };

        let idx = schema.require_index(column)?;
        let data_type = self.op.output_type(schema.fields[idx].data_type)?;
        let expr = self
            .reduction(column.as_str())
            .cast(polars_type(data_type))
            .alias(self.name.as_str());
        Ok((Field::new(self.name.clone(), data_type), expr))
    }

    fn reduction(&self, column: &str) -> pl::Expr {
        let values = pl::col(column);
        let reduced = match (self.op, self.missing) {
            (ReduceOp::Count, MissingPolicy::Propagate) => return values.len(),
            (ReduceOp::Count, MissingPolicy::Exclude) => return values.count(),
            (ReduceOp::NDistinct, MissingPolicy::Propagate) => return values.n_unique(),
            (ReduceOp::NDistinct, MissingPolicy::Exclude) => return values.drop_nulls().n_unique(),
            (ReduceOp::Sum, _) => values.sum(),
            (ReduceOp::Min, _) => values.min(),
            (ReduceOp::Max, _) => values.max(),
            (ReduceOp::Mean, _) => values.mean(),
            (ReduceOp::Median, _) => values.median(),
            (ReduceOp::Variance, _) => values.var(1),
            (ReduceOp::StdDev, _) => values.std(1),
        };

        // Too few present values, or any missing one under `Propagate`, gives a missing result.
        let needed = match self.op {
            ReduceOp::Variance | ReduceOp::StdDev => 2,
            _ => 1,
        };
        let mut undefined = pl::col(column).count().lt(pl::lit(needed));
        if self.missing == MissingPolicy::Propagate {
            undefined = undefined.or(pl::col(column).null_count().gt(pl::lit(0)));
        }
        pl::when(undefined).then(pl::lit(pl::NULL)).otherwise(reduced)
    }
}

/// A dataset partitioned by key columns, ready for [`GroupedDataSet::summarise`].
#[derive(Debug, Clone)]
pub struct GroupedDataSet<'a> {
    dataset: &'a DataSet,
    keys: Vec<Field>,
}

/// Partition `dataset` by the distinct values of `keys`.
///
/// Each key must exist and may appear only once. With no keys the whole table is one group.
pub fn group_by<'a, S: AsRef<str>>(dataset: &'a DataSet, keys: &[S]) -> ProcessingResult<GroupedDataSet<'a>> {
    let mut fields: Vec<Field> = Vec::with_capacity(keys.len());
    for key in keys {
        let key = key.as_ref();
        let idx = dataset.schema.require_index(key)?;
        if fields.iter().any(|f| f.name == key) {
            return Err(ProcessingError::DuplicateColumn { name: key.to_string() });
        }
        fields.push(dataset.schema.fields[idx].clone());
    }
    Ok(GroupedDataSet { dataset, keys: fields })
}

impl GroupedDataSet<'_> {
    /// Key column names.
    pub fn keys(&self) -> Vec<&str> {
        self.keys.iter().map(|f| f.name.as_str()).collect()
    }

    /// One row per distinct key combination: the key columns followed by one column per
    /// aggregation.
    ///
    /// Groups come out in ascending key order with the missing key last. Without keys the result
    /// is exactly one row, even for an empty table.
    pub fn summarise(&self, aggregations: &[Aggregation]) -> ProcessingResult<DataSet> {
        let mut fields = self.keys.clone();
        let mut exprs = Vec::with_capacity(aggregations.len());
        for agg in aggregations {
            let (field, expr) = agg.bind(&self.dataset.schema)?;
            if fields.iter().any(|f| f.name == field.name) {
                return Err(ProcessingError::DuplicateColumn { name: field.name });
            }
            fields.push(field);
            exprs.push(expr);
        }
        let schema = Schema::new(fields);

        if self.keys.is_empty() {
            if exprs.is_empty() {
                return Ok(DataSet::new(schema, vec![Vec::new()]));
            }
            return run_lazy(self.dataset, schema, |lf| lf.select(exprs));
        }

        let by: Vec<pl::Expr> = self.keys.iter().map(|f| key_expr(&f.name, f.data_type)).collect();
        let order: Vec<pl::Expr> = self.keys.iter().map(|f| pl::col(f.name.as_str())).collect();
        let options = SortMultipleOptions::default()
            .with_nulls_last(true)
            .with_maintain_order(true);
        run_lazy(self.dataset, schema, |lf| {
            lf.group_by(by).agg(exprs).sort_by_exprs(order, options)
        })
    }
}

/// Reduce the whole table to exactly one row.
pub fn summarise(dataset: &DataSet, aggregations: &[Aggregation]) -> ProcessingResult<DataSet> {
    group_by::<&str>(dataset, &[])?.summarise(aggregations)
}

#[cfg(test)]
mod tests {
    use super::{group_by, summarise, Aggregation};
    use crate::error::ProcessingError;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn sample() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("order", DataType::Utf8),
            Field::new("adult_body_mass", DataType::Float64),
        ]);
        let row = |o: Option<&str>, m: Option<f64>| vec![Value::from(o), Value::from(m)];
        DataSet::new(
            schema,
            vec![
                row(Some("Rodentia"), Some(20.0)),
                row(Some("Carnivora"), Some(5000.0)),
                row(Some("Rodentia"), None),
                row(None, Some(1.0)),
                row(Some("Carnivora"), Some(3000.0)),
                row(Some("Rodentia"), Some(40.0)),
            ],
        )
    }

    #[test]
    fn one_row_per_group_in_key_order() {
        let ds = sample();
        let out = group_by(&ds, &["order"])
            .unwrap()
            .summarise(&[Aggregation::count(), Aggregation::mean("adult_body_mass").exclude_missing()])
            .unwrap();

        assert_eq!(
            out.schema.field_names().collect::<Vec<_>>(),
            vec!["order", "n", "mean_adult_body_mass"]
        );
        assert_eq!(
            out.rows,
            vec![
                vec![Value::from("Carnivora"), Value::Int64(2), Value::Float64(4000.0)],
                vec![Value::from("Rodentia"), Value::Int64(3), Value::Float64(30.0)],
                vec![Value::Null, Value::Int64(1), Value::Float64(1.0)],
            ]
        );
    }

    #[test]
    fn missing_policy_only_matters_for_groups_with_missing_values() {
        let ds = sample();
        let grouped = group_by(&ds, &["order"]).unwrap();
        let kept = grouped.summarise(&[Aggregation::median("adult_body_mass").alias("m")]).unwrap();
        let dropped = grouped
            .summarise(&[Aggregation::median("adult_body_mass").alias("m").exclude_missing()])
            .unwrap();

        // Carnivora has no missing masses: same result either way.
        assert_eq!(kept.rows[0], dropped.rows[0]);
        // Rodentia has one: propagated vs. excluded.
        assert_eq!(kept.rows[1][1], Value::Null);
        assert_eq!(dropped.rows[1][1], Value::Float64(30.0));
    }

    #[test]
    fn ungrouped_summarise_yields_exactly_one_row() {
        let ds = sample();
        let out = summarise(&ds, &[Aggregation::max("adult_body_mass").exclude_missing().alias("heaviest")]).unwrap();
        assert_eq!(out.rows, vec![vec![Value::Float64(5000.0)]]);

        let empty = DataSet::empty(ds.schema.clone());
        let out = summarise(&empty, &[Aggregation::count()]).unwrap();
        assert_eq!(out.rows, vec![vec![Value::Int64(0)]]);

        let out = group_by(&empty, &["order"]).unwrap().summarise(&[Aggregation::count()]).unwrap();
        assert_eq!(out.row_count(), 0);
    }

    #[test]
    fn invalid_aggregations_are_rejected() {
        let ds = sample();
        let grouped = group_by(&ds, &["order"]).unwrap();
        assert!(matches!(
            grouped.summarise(&[Aggregation::mean("order")]),
            Err(ProcessingError::TypeMismatch { .. })
        ));
        assert!(matches!(
            grouped.summarise(&[Aggregation::count().alias("order")]),
            Err(ProcessingError::DuplicateColumn { .. })
        ));
        assert!(matches!(
            group_by(&ds, &["family"]),
            Err(ProcessingError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_group_keys_are_rejected() {
        let ds = sample();
        assert_eq!(group_by(&ds, &["order"]).unwrap().keys(), vec!["order"]);
        assert!(matches!(
            group_by(&ds, &["order", "order"]),
            Err(ProcessingError::DuplicateColumn { name }) if name == "order"
        ));
    }

    #[test]
    fn signed_zero_keys_form_one_group() {
        let schema = Schema::new(vec![Field::new("x", DataType::Float64)]);
        let ds = DataSet::new(schema, vec![vec![Value::Float64(0.0)], vec![Value::Float64(-0.0)]]);
        let out = group_by(&ds, &["x"]).unwrap().summarise(&[Aggregation::count()]).unwrap();
        assert_eq!(out.rows, vec![vec![Value::Float64(0.0), Value::Int64(2)]]);
    }

    #[test]
    fn sample_statistics_need_two_values() {
        let ds = sample();
        let out = group_by(&ds, &["order"])
            .unwrap()
            .summarise(&[Aggregation::std_dev("adult_body_mass").exclude_missing().alias("sd")])
            .unwrap();
        let sd = |row: usize| match out.rows[row][1] {
            Value::Float64(x) => x,
            ref other => panic!("expected a float, got {other:?}"),
        };
        assert!((sd(0) - 2_000_000.0_f64.sqrt()).abs() < 1e-9);
        assert!((sd(1) - 200.0_f64.sqrt()).abs() < 1e-9);
        // The missing-key group holds a single mass.
        assert_eq!(out.rows[2][1], Value::Null);
    }
}
