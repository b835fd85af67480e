//! Writing a [`DataSet`] back out as delimited text.
//!
//! Output has a header row with the dataset's column names; missing values are written as `NA`.
//! Floats always carry a decimal point or exponent, so a whole-number `Float64` column reads back
//! through [`crate::ingestion`] as `Float64` rather than `Int64`.
//!
//! Reading back is exact only where written values do not collide with the reader's missing
//! markers: text cells equal to an NA token (`NA`, empty) and numbers equal to a missing
//! sentinel (`-999`) come back missing unless the read options clear those lists.

use std::io::Write;
use std::path::Path;

use crate::error::IngestionResult;
use crate::types::{DataSet, Value};

/// Token written for [`Value::Null`].
pub const MISSING_TOKEN: &str = "NA";

/// Write `dataset` to `writer`, fields separated by `delimiter`.
pub fn write_delimited<W: Write>(dataset: &DataSet, writer: W, delimiter: u8) -> IngestionResult<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    wtr.write_record(dataset.schema.field_names())?;
    for row in &dataset.rows {
        wtr.write_record(row.iter().map(field_text))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `dataset` to a file, choosing the delimiter from the extension (`.csv` → comma,
/// anything else → tab).
pub fn write_delimited_to_path(dataset: &DataSet, path: impl AsRef<Path>) -> IngestionResult<()> {
    let path = path.as_ref();
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    };
    let file = std::fs::File::create(path)?;
    write_delimited(dataset, file, delimiter)
}

fn field_text(value: &Value) -> String {
    match value {
        Value::Null => MISSING_TOKEN.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::Float64(v) => format!("{v:?}"),
        Value::Bool(v) => v.to_string(),
        Value::Utf8(s) => s.clone(),
    }
}
