//! Delimited-text (TSV/CSV) ingestion implementation.

use std::io::Read;
use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::names::{clean_names, NameRules};

/// Parsing options for delimited text.
#[derive(Debug, Clone, PartialEq)]
pub struct DelimitedOptions {
    /// Field separator byte (`b'\t'` or `b','`).
    pub delimiter: u8,
    /// How header names are cleaned before they are matched against a schema.
    pub name_rules: NameRules,
    /// Cells equal to one of these (after trimming) are missing, whatever the column type.
    pub na_tokens: Vec<String>,
    /// Numeric cells equal to one of these are missing (`-999` also matches `-999.00`).
    pub missing_sentinels: Vec<f64>,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self::tsv()
    }
}

impl DelimitedOptions {
    /// Tab-separated, PanTHERIA header rules, `""`/`NA`/`-999` as missing.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            name_rules: NameRules::default(),
            na_tokens: vec![String::new(), "NA".to_string()],
            missing_sentinels: vec![-999.0],
        }
    }

    /// Same as [`DelimitedOptions::tsv`] with a comma separator.
    pub fn csv() -> Self {
        Self {
            delimiter: b',',
            ..Self::tsv()
        }
    }

    fn is_na_token(&self, trimmed: &str) -> bool {
        self.na_tokens.iter().any(|t| t == trimmed)
    }

    fn is_sentinel(&self, v: f64) -> bool {
        self.missing_sentinels.contains(&v)
    }

    fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.has_headers(true).delimiter(self.delimiter);
        builder
    }
}

/// Ingest a delimited file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - The file must have a header row; header names are cleaned with
///   [`DelimitedOptions::name_rules`] first.
/// - Cleaned headers must contain all schema fields (order can differ, extra columns are ignored).
/// - Each value is parsed according to the schema field type.
pub fn ingest_delimited_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &DelimitedOptions,
) -> IngestionResult<DataSet> {
    let mut rdr = options.reader_builder().from_path(path)?;
    ingest_delimited_from_reader(&mut rdr, schema, options)
}

/// Ingest delimited data from an existing reader.
pub fn ingest_delimited_from_reader<R: Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
    options: &DelimitedOptions,
) -> IngestionResult<DataSet> {
    let headers = clean_names(rdr.headers()?.iter(), &options.name_rules);

    // Map schema fields -> file column indexes (allows re-ordered columns).
    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| *h == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(IngestionError::SchemaMismatch {
                    message: format!("missing required column '{}'. headers={headers:?}", field.name),
                });
            }
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;
        rows.push(parse_record(&record, user_row, &schema.fields, &col_idxs, options)?);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

/// Ingest a delimited file, inferring one type per column from its contents.
pub fn infer_delimited_from_path(path: impl AsRef<Path>, options: &DelimitedOptions) -> IngestionResult<DataSet> {
    let mut rdr = options.reader_builder().from_path(path)?;
    infer_delimited_from_reader(&mut rdr, options)
}

/// Ingest delimited data from an existing reader, inferring column types.
///
/// A column is `Int64` if every present value parses as an integer, else `Float64` if every
/// present value parses as a number, else `Bool` if every present value is `true`/`false`,
/// else `Utf8`. Columns with no present values at all are `Float64`.
pub fn infer_delimited_from_reader<R: Read>(
    rdr: &mut csv::Reader<R>,
    options: &DelimitedOptions,
) -> IngestionResult<DataSet> {
    let headers = clean_names(rdr.headers()?.iter(), &options.name_rules);
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

    let fields: Vec<Field> = headers
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let data_type = infer_type(records.iter().map(|r| r.get(i).unwrap_or("")), options);
            Field::new(name, data_type)
        })
        .collect();
    let col_idxs: Vec<usize> = (0..fields.len()).collect();

    let rows = records
        .iter()
        .enumerate()
        .map(|(row_idx0, record)| parse_record(record, row_idx0 + 2, &fields, &col_idxs, options))
        .collect::<IngestionResult<Vec<_>>>()?;

    Ok(DataSet::new(Schema::new(fields), rows))
}

fn parse_record(
    record: &csv::StringRecord,
    user_row: usize,
    fields: &[Field],
    col_idxs: &[usize],
    options: &DelimitedOptions,
) -> IngestionResult<Vec<Value>> {
    fields
        .iter()
        .zip(col_idxs)
        .map(|(field, &idx)| {
            let raw = record.get(idx).unwrap_or("");
            parse_typed_value(user_row, &field.name, field.data_type, raw, options)
        })
        .collect()
}

fn infer_type<'a>(cells: impl Iterator<Item = &'a str>, options: &DelimitedOptions) -> DataType {
    let (mut int, mut float, mut boolean) = (true, true, true);
    let mut present = false;
    for cell in cells {
        let trimmed = cell.trim();
        if options.is_na_token(trimmed) {
            continue;
        }
        present = true;
        int &= trimmed.parse::<i64>().is_ok();
        float &= trimmed.parse::<f64>().is_ok();
        boolean &= matches!(trimmed.to_ascii_lowercase().as_str(), "true" | "false");
        if !(int || float || boolean) {
            return DataType::Utf8;
        }
    }

    if !present {
        DataType::Float64
    } else if int {
        DataType::Int64
    } else if float {
        DataType::Float64
    } else {
        DataType::Bool
    }
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
    options: &DelimitedOptions,
) -> IngestionResult<Value> {
    let trimmed = raw.trim();
    if options.is_na_token(trimmed) {
        return Ok(Value::Null);
    }

    let parse_err = |message: String| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => {
            let v = trimmed.parse::<i64>().map_err(|e| parse_err(e.to_string()))?;
            Ok(if options.is_sentinel(v as f64) { Value::Null } else { Value::Int64(v) })
        }
        DataType::Float64 => {
            let v = trimmed.parse::<f64>().map_err(|e| parse_err(e.to_string()))?;
            Ok(if options.is_sentinel(v) { Value::Null } else { Value::Float64(v) })
        }
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_err),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}
