//! Console rendering for [`DataSet`].
//!
//! The layout follows the familiar tibble print:
//!
//! ```text
//! # A table: 2 × 2
//!   binomial      adult_body_mass
//!   <chr>                   <dbl>
//! 1 Mus musculus             19.3
//! 2 Vulpes vulpes              NA
//! ```
//!
//! Numbers are right-aligned, text left-aligned, missing values print as `NA`.

use std::fmt;

use crate::types::{DataSet, DataType, Value};

/// Tables up to this many rows print in full through `Display`.
const FULL_PRINT_MAX_ROWS: usize = 20;
/// Rows shown through `Display` for longer tables.
const DEFAULT_PREVIEW_ROWS: usize = 10;
const SIGNIFICANT_DIGITS: i32 = 4;

/// A row-limited view of a dataset, see [`DataSet::preview`].
#[derive(Debug, Clone, Copy)]
pub struct Preview<'a> {
    dataset: &'a DataSet,
    limit: usize,
}

impl DataSet {
    /// Render at most `n` rows, followed by a note on how many were left out.
    pub fn preview(&self, n: usize) -> Preview<'_> {
        Preview {
            dataset: self,
            limit: n,
        }
    }
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let limit = if self.row_count() > FULL_PRINT_MAX_ROWS {
            DEFAULT_PREVIEW_ROWS
        } else {
            self.row_count()
        };
        fmt::Display::fmt(&self.preview(limit), f)
    }
}

struct Column {
    header: String,
    tag: String,
    cells: Vec<String>,
    right_align: bool,
    width: usize,
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ds = self.dataset;
        let shown = ds.row_count().min(self.limit);
        writeln!(f, "# A table: {} × {}", ds.row_count(), ds.column_count())?;

        let columns: Vec<Column> = ds
            .schema
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let cells: Vec<String> = ds.rows[..shown]
                    .iter()
                    .map(|row| row.get(i).map(cell_text).unwrap_or_default())
                    .collect();
                let header = field.name.clone();
                let tag = format!("<{}>", field.data_type.abbreviation());
                let width = cells
                    .iter()
                    .map(|c| c.chars().count())
                    .chain([header.chars().count(), tag.chars().count()])
                    .max()
                    .unwrap_or(0);
                Column {
                    header,
                    tag,
                    cells,
                    right_align: field.data_type != DataType::Utf8,
                    width,
                }
            })
            .collect();

        let index_width = shown.to_string().len();
        writeln!(f, "{}", render_line("", index_width, &columns, |c| c.header.as_str()))?;
        writeln!(f, "{}", render_line("", index_width, &columns, |c| c.tag.as_str()))?;
        for r in 0..shown {
            let index = (r + 1).to_string();
            writeln!(f, "{}", render_line(&index, index_width, &columns, |c| c.cells[r].as_str()))?;
        }

        let omitted = ds.row_count() - shown;
        if omitted > 0 {
            let plural = if omitted == 1 { "" } else { "s" };
            writeln!(f, "# ... with {omitted} more row{plural}")?;
        }
        Ok(())
    }
}

fn render_line(index: &str, index_width: usize, columns: &[Column], pick: impl Fn(&Column) -> &str) -> String {
    let mut out = format!("{index:>index_width$}");
    for col in columns {
        let text = pick(col);
        let width = col.width;
        if col.right_align {
            out.push_str(&format!(" {text:>width$}"));
        } else {
            out.push_str(&format!(" {text:<width$}"));
        }
    }
    out.trim_end().to_string()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NA".to_string(),
        Value::Int64(v) => v.to_string(),
        Value::Float64(v) => format_float(*v),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Utf8(s) => s.clone(),
    }
}

/// Up to four significant digits after the leading digit group, trailing zeros dropped.
/// Magnitudes below `1e-5` or from `1e15` up switch to exponent form.
fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }
    // Also catches `-0.0`.
    if v == 0.0 {
        return "0".to_string();
    }

    let magnitude = v.abs().log10().floor() as i32;
    if !(-5..15).contains(&magnitude) {
        let text = format!("{v:.prec$e}", prec = (SIGNIFICANT_DIGITS - 1) as usize);
        return match text.split_once('e') {
            Some((mantissa, exponent)) => {
                let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
                format!("{mantissa}e{exponent}")
            }
            None => text,
        };
    }
    if v == v.trunc() {
        return format!("{v:.0}");
    }

    let decimals = if magnitude >= 0 {
        SIGNIFICANT_DIGITS
    } else {
        SIGNIFICANT_DIGITS - magnitude - 1
    };
    let text = format!("{v:.prec$}", prec = decimals as usize);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}
