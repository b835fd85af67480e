//! Core data model types.
//!
//! Ingestion produces an in-memory [`DataSet`] described by a [`Schema`] (a list of typed
//! [`Field`]s). Every processing verb takes a `&DataSet` and returns a new one; a dataset is
//! never modified in place once built.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, ProcessingResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

impl DataType {
    /// Whether values of this type take part in arithmetic.
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }

    /// Short type tag used when printing tables (`<dbl>`, `<chr>`, ...).
    pub fn abbreviation(self) -> &'static str {
        match self {
            DataType::Int64 => "int",
            DataType::Float64 => "dbl",
            DataType::Bool => "lgl",
            DataType::Utf8 => "chr",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Bool => "bool",
            DataType::Utf8 => "utf8",
        };
        f.write_str(name)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Like [`Schema::index_of`], but reports a [`ProcessingError::ColumnNotFound`] listing the
    /// available columns.
    pub fn require_index(&self, name: &str) -> ProcessingResult<usize> {
        self.index_of(name)
            .ok_or_else(|| ProcessingError::ColumnNotFound {
                name: name.to_string(),
                available: self.field_names().map(str::to_string).collect(),
            })
    }

    /// Returns a field by name, if present.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single typed cell in a [`DataSet`].
///
/// Serialized untagged, so JSON `null`, numbers, booleans and strings map directly onto
/// values (integers without a fractional part become [`Value::Int64`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Whether this is the missing marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, widening integers. `None` for non-numeric and missing values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// The logical type of this value, or `None` for [`Value::Null`].
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Utf8(_) => Some(DataType::Utf8),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

static MISSING: Value = Value::Null;

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    ///
    /// Every row must hold one value per schema field. This is not checked here; the verbs
    /// report a [`ProcessingError::RowWidth`] for a ragged table. Use [`DataSet::try_new`] to
    /// check up front.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Like [`DataSet::new`], but rejects rows whose width differs from the schema.
    pub fn try_new(schema: Schema, rows: Vec<Vec<Value>>) -> ProcessingResult<Self> {
        let dataset = Self { schema, rows };
        dataset.check_row_widths()?;
        Ok(dataset)
    }

    /// Error on the first row whose width differs from the schema.
    pub fn check_row_widths(&self) -> ProcessingResult<()> {
        let expected = self.schema.len();
        match self.rows.iter().position(|row| row.len() != expected) {
            Some(row) => Err(ProcessingError::RowWidth {
                row,
                expected,
                found: self.rows[row].len(),
            }),
            None => Ok(()),
        }
    }

    /// A dataset with the given schema and no rows.
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Borrow every value of one column, in row order.
    pub fn column_values(&self, name: &str) -> ProcessingResult<Vec<&Value>> {
        let idx = self.schema.require_index(name)?;
        Ok(self.rows.iter().map(|row| row.get(idx).unwrap_or(&MISSING)).collect())
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Reduce (fold) all rows into an accumulator value.
    ///
    /// This is similar to `Iterator::fold`, but provides each row as `&[Value]`.
    pub fn reduce_rows<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &[Value]) -> A,
    {
        self.rows
            .iter()
            .fold(init, |acc, row| reducer(acc, row.as_slice()))
    }

    /// The first `n` rows (all rows if the dataset is shorter).
    pub fn head(&self, n: usize) -> Self {
        Self {
            schema: self.schema.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}
