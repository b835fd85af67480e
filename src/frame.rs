//! Conversion between [`DataSet`] and a Polars [`DataFrame`].
//!
//! The verbs in [`crate::processing`] build a `polars::lazy` plan; a table crosses into a
//! `DataFrame` on the way in and back into rows on the way out. On the way back each column is
//! cast to the type recorded in the expected [`Schema`], so engine widths such as `UInt32`
//! counts come out as the crate's four logical types.

use polars::prelude::{self as pl, Column, DataFrame, IntoLazy, LazyFrame, NamedFrom, PlSmallStr, Series};

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DataSet, DataType, Schema, Value};

/// The Polars type backing a logical [`DataType`].
pub(crate) fn polars_type(data_type: DataType) -> pl::DataType {
    match data_type {
        DataType::Int64 => pl::DataType::Int64,
        DataType::Float64 => pl::DataType::Float64,
        DataType::Bool => pl::DataType::Boolean,
        DataType::Utf8 => pl::DataType::String,
    }
}

/// Build a column-major `DataFrame` from `dataset`.
pub(crate) fn to_data_frame(dataset: &DataSet) -> ProcessingResult<DataFrame> {
    dataset.check_row_widths()?;
    let fields = &dataset.schema.fields;
    for (i, field) in fields.iter().enumerate() {
        if fields[..i].iter().any(|f| f.name == field.name) {
            return Err(ProcessingError::DuplicateColumn {
                name: field.name.clone(),
            });
        }
    }

    let columns = fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let cells = dataset.rows.iter().map(|row| &row[idx]);
            series_from_values(&field.name, field.data_type, cells)
        })
        .collect::<ProcessingResult<Vec<Series>>>()?;
    Ok(DataFrame::new(
        dataset.rows.len(),
        columns.into_iter().map(Column::from).collect(),
    )?)
}

fn series_from_values<'a>(
    name: &str,
    data_type: DataType,
    cells: impl Iterator<Item = &'a Value>,
) -> ProcessingResult<Series> {
    let mismatch = |v: &Value| ProcessingError::TypeMismatch {
        message: format!("column '{name}' is {data_type} but holds {v:?}"),
    };
    let label = PlSmallStr::from(name);

    let series = match data_type {
        DataType::Int64 => {
            let values = cells
                .map(|v| match v {
                    Value::Null => Ok(None),
                    Value::Int64(i) => Ok(Some(*i)),
                    other => Err(mismatch(other)),
                })
                .collect::<ProcessingResult<Vec<Option<i64>>>>()?;
            Series::new(label, values)
        }
        DataType::Float64 => {
            let values = cells
                .map(|v| match v {
                    Value::Null => Ok(None),
                    Value::Float64(f) => Ok(Some(*f)),
                    Value::Int64(i) => Ok(Some(*i as f64)),
                    other => Err(mismatch(other)),
                })
                .collect::<ProcessingResult<Vec<Option<f64>>>>()?;
            Series::new(label, values)
        }
        DataType::Bool => {
            let values = cells
                .map(|v| match v {
                    Value::Null => Ok(None),
                    Value::Bool(b) => Ok(Some(*b)),
                    other => Err(mismatch(other)),
                })
                .collect::<ProcessingResult<Vec<Option<bool>>>>()?;
            Series::new(label, values)
        }
        DataType::Utf8 => {
            let values = cells
                .map(|v| match v {
                    Value::Null => Ok(None),
                    Value::Utf8(s) => Ok(Some(s.as_str())),
                    other => Err(mismatch(other)),
                })
                .collect::<ProcessingResult<Vec<Option<&str>>>>()?;
            Series::new(label, values)
        }
    };
    Ok(series)
}

/// Read `frame` back into rows laid out as `schema`.
pub(crate) fn from_data_frame(frame: &DataFrame, schema: Schema) -> ProcessingResult<DataSet> {
    let mut rows: Vec<Vec<Value>> = (0..frame.height())
        .map(|_| Vec::with_capacity(schema.len()))
        .collect();

    for field in &schema.fields {
        let series = frame
            .column(&field.name)?
            .as_materialized_series()
            .cast(&polars_type(field.data_type))?;
        for (row, value) in rows.iter_mut().zip(values_of(&series, field.data_type)?) {
            row.push(value);
        }
    }
    Ok(DataSet::new(schema, rows))
}

fn values_of(series: &Series, data_type: DataType) -> ProcessingResult<Vec<Value>> {
    Ok(match data_type {
        DataType::Int64 => series.i64()?.into_iter().map(Value::from).collect(),
        DataType::Float64 => series.f64()?.into_iter().map(Value::from).collect(),
        DataType::Bool => series.bool()?.into_iter().map(Value::from).collect(),
        DataType::Utf8 => series.str()?.into_iter().map(Value::from).collect(),
    })
}

/// Run a lazy plan over `dataset` and read the result back as `schema`.
pub(crate) fn run_lazy(
    dataset: &DataSet,
    schema: Schema,
    plan: impl FnOnce(LazyFrame) -> LazyFrame,
) -> ProcessingResult<DataSet> {
    let frame = to_data_frame(dataset)?;
    let out = plan(frame.lazy()).collect()?;
    from_data_frame(&out, schema)
}
