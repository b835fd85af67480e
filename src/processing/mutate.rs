//! Column derivation for [`crate::types::DataSet`].

use crate::error::ProcessingResult;
use crate::expr::NamedExpr;
use crate::frame::run_lazy;
use crate::types::{DataSet, Field};

/// Returns a new [`DataSet`] with derived columns.
///
/// Expressions are type-checked and evaluated left to right, each against the table produced
/// by the ones before it, so a later expression may use a column derived earlier in the same
/// call. A name that already exists replaces that column in place; a new name is appended.
pub fn mutate(dataset: &DataSet, columns: &[NamedExpr]) -> ProcessingResult<DataSet> {
    let mut schema = dataset.schema.clone();
    let mut exprs = Vec::with_capacity(columns.len());

    for NamedExpr { name, expr } in columns {
        let data_type = expr.output_type(&schema)?;
        match schema.index_of(name) {
            Some(idx) => schema.fields[idx].data_type = data_type,
            None => schema.fields.push(Field::new(name.clone(), data_type)),
        }
        exprs.push(expr.to_polars().alias(name.as_str()));
    }

    // One `with_column` per expression, so each sees the ones before it.
    run_lazy(dataset, schema, |lf| exprs.into_iter().fold(lf, |lf, e| lf.with_column(e)))
}

#[cfg(test)]
mod tests {
    use super::mutate;
    use crate::error::ProcessingError;
    use crate::expr::{col, lit};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn sample() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("binomial", DataType::Utf8),
            Field::new("adult_body_mass", DataType::Float64),
            Field::new("adult_head_body_len", DataType::Float64),
        ]);
        DataSet::new(
            schema,
            vec![
                vec![Value::from("Vulpes vulpes"), Value::Float64(5000.0), Value::Float64(500.0)],
                vec![Value::from("Mus musculus"), Value::Float64(20.0), Value::Null],
            ],
        )
    }

    #[test]
    fn appends_derived_columns_and_propagates_missing() {
        let ds = sample();
        let out = mutate(
            &ds,
            &[(col("adult_body_mass") / col("adult_head_body_len")).alias("ratio")],
        )
        .unwrap();
        assert_eq!(out.schema.index_of("ratio"), Some(3));
        assert_eq!(out.schema.fields[3].data_type, DataType::Float64);
        assert_eq!(out.rows[0][3], Value::Float64(10.0));
        assert_eq!(out.rows[1][3], Value::Null);
        // Input untouched.
        assert_eq!(ds.column_count(), 3);
    }

    #[test]
    fn later_expressions_see_earlier_derived_columns() {
        let ds = sample();
        let out = mutate(
            &ds,
            &[
                (col("adult_body_mass") / lit(1000.0)).alias("mass_kg"),
                (col("mass_kg") * lit(2.0)).alias("double_kg"),
            ],
        )
        .unwrap();
        assert_eq!(out.rows[0][3], Value::Float64(5.0));
        assert_eq!(out.rows[0][4], Value::Float64(10.0));
    }

    #[test]
    fn existing_name_is_replaced_in_place() {
        let ds = sample();
        let out = mutate(&ds, &[(col("adult_body_mass") / lit(1000.0)).alias("adult_body_mass")]).unwrap();
        assert_eq!(out.column_count(), 3);
        assert_eq!(out.schema.index_of("adult_body_mass"), Some(1));
        assert_eq!(out.rows[1][1], Value::Float64(0.02));
    }

    #[test]
    fn replacing_a_column_can_change_its_type() {
        let ds = sample();
        let out = mutate(
            &ds,
            &[col("adult_body_mass").gt(lit(100.0)).alias("adult_body_mass")],
        )
        .unwrap();
        assert_eq!(out.schema.fields[1].data_type, DataType::Bool);
        assert_eq!(out.rows[0][1], Value::Bool(true));
    }

    #[test]
    fn unknown_column_reference_fails_before_evaluation() {
        let ds = sample();
        let err = mutate(
            &ds,
            &[
                (col("adult_body_mass") * lit(2.0)).alias("ok"),
                (col("not_yet") + lit(1.0)).alias("bad"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ProcessingError::ColumnNotFound { name, .. } if name == "not_yet"));
    }
}
