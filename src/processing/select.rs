//! Column projection and renaming for [`crate::types::DataSet`].

use polars::prelude as pl;
use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, ProcessingResult};
use crate::frame::run_lazy;
use crate::types::{DataSet, Field, Schema};

/// Picks columns out of a [`Schema`].
///
/// Pattern selectors match column names and may match nothing; [`ColumnSelector::Name`] and
/// the endpoints of [`ColumnSelector::Range`] must exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSelector {
    /// A single column by exact name.
    Name(String),
    /// All columns from `from` to `to` inclusive, by schema position (either direction).
    Range { from: String, to: String },
    /// Columns whose name starts with the prefix.
    StartsWith(String),
    /// Columns whose name ends with the suffix.
    EndsWith(String),
    /// Columns whose name contains the substring.
    Contains(String),
    /// Columns whose name matches a shell-style pattern (`adult_*`).
    Glob(String),
    /// Columns whose name matches a regular expression.
    Regex(String),
    /// Every column.
    Everything,
    /// Removes the matches of the inner selector from the selection so far.
    Exclude(Box<ColumnSelector>),
}

impl ColumnSelector {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn range(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Range {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn exclude(inner: ColumnSelector) -> Self {
        Self::Exclude(Box::new(inner))
    }

    /// Schema positions matched by this selector, in output order.
    fn matches(&self, schema: &Schema) -> ProcessingResult<Vec<usize>> {
        let by_name = |pred: &dyn Fn(&str) -> bool| -> Vec<usize> {
            schema
                .fields
                .iter()
                .enumerate()
                .filter(|(_, f)| pred(&f.name))
                .map(|(i, _)| i)
                .collect()
        };

        match self {
            ColumnSelector::Name(name) => Ok(vec![schema.require_index(name)?]),
            ColumnSelector::Range { from, to } => {
                let a = schema.require_index(from)?;
                let b = schema.require_index(to)?;
                if a <= b {
                    Ok((a..=b).collect())
                } else {
                    Ok((b..=a).rev().collect())
                }
            }
            ColumnSelector::StartsWith(p) => Ok(by_name(&|n: &str| n.starts_with(p.as_str()))),
            ColumnSelector::EndsWith(s) => Ok(by_name(&|n: &str| n.ends_with(s.as_str()))),
            ColumnSelector::Contains(s) => Ok(by_name(&|n: &str| n.contains(s.as_str()))),
            ColumnSelector::Glob(pattern) => {
                let pattern = glob::Pattern::new(pattern).map_err(|e| ProcessingError::InvalidExpression {
                    message: format!("invalid glob '{pattern}': {e}"),
                })?;
                Ok(by_name(&|n: &str| pattern.matches(n)))
            }
            ColumnSelector::Regex(pattern) => {
                let re = regex::Regex::new(pattern).map_err(|e| ProcessingError::InvalidExpression {
                    message: format!("invalid regex '{pattern}': {e}"),
                })?;
                Ok(by_name(&|n: &str| re.is_match(n)))
            }
            ColumnSelector::Everything => Ok((0..schema.len()).collect()),
            ColumnSelector::Exclude(inner) => inner.matches(schema),
        }
    }
}

impl From<&str> for ColumnSelector {
    fn from(name: &str) -> Self {
        ColumnSelector::Name(name.to_string())
    }
}

/// Resolve selectors to schema positions.
///
/// Selectors apply in order: a positive selector appends its matches that are not selected yet,
/// an [`ColumnSelector::Exclude`] removes its matches. When the first selector is an exclusion
/// the selection starts out as every column.
pub fn resolve_columns(schema: &Schema, selectors: &[ColumnSelector]) -> ProcessingResult<Vec<usize>> {
    let mut selected: Vec<usize> = match selectors.first() {
        Some(ColumnSelector::Exclude(_)) => (0..schema.len()).collect(),
        _ => Vec::new(),
    };

    for selector in selectors {
        let matched = selector.matches(schema)?;
        if matches!(selector, ColumnSelector::Exclude(_)) {
            selected.retain(|idx| !matched.contains(idx));
        } else {
            for idx in matched {
                if !selected.contains(&idx) {
                    selected.push(idx);
                }
            }
        }
    }
    Ok(selected)
}

/// Returns a new [`DataSet`] with only the selected columns, in selection order.
///
/// Row count and row order are unchanged.
pub fn select(dataset: &DataSet, selectors: &[ColumnSelector]) -> ProcessingResult<DataSet> {
    let idxs = resolve_columns(&dataset.schema, selectors)?;
    let schema = Schema::new(idxs.iter().map(|&i| dataset.schema.fields[i].clone()).collect());
    if schema.is_empty() {
        dataset.check_row_widths()?;
        return Ok(DataSet::new(schema, vec![Vec::new(); dataset.row_count()]));
    }

    let exprs: Vec<pl::Expr> = schema.field_names().map(|name| pl::col(name)).collect();
    run_lazy(dataset, schema, |lf| lf.select(exprs))
}

/// Returns a new [`DataSet`] with columns renamed. Each pair is `(new_name, old_name)`.
pub fn rename(dataset: &DataSet, renames: &[(String, String)]) -> ProcessingResult<DataSet> {
    let mut fields: Vec<Field> = dataset.schema.fields.clone();
    for (new_name, old_name) in renames {
        let idx = dataset.schema.require_index(old_name)?;
        fields[idx].name = new_name.clone();
    }

    for (i, f) in fields.iter().enumerate() {
        if fields[..i].iter().any(|g| g.name == f.name) {
            return Err(ProcessingError::DuplicateColumn { name: f.name.clone() });
        }
    }

    Ok(DataSet::new(Schema::new(fields), dataset.rows.clone()))
}
