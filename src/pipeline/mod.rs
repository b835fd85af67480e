//! Named, serializable sequences of verbs.
//!
//! A [`Pipeline`] is the data form of a `?`-chain: the same steps applied in the same order to
//! the same input produce the same table whether they are chained as [`DataSet`] methods, nested
//! as function calls, or run here. Pipelines can be built in code or loaded from JSON:
//!
//! ```json
//! {
//!   "name": "mass_per_length",
//!   "steps": [
//!     { "verb": "mutate", "columns": [
//!         { "name": "ratio", "expr": { "binary": { "op": "div",
//!             "left": { "column": "adult_body_mass" },
//!             "right": { "column": "adult_head_body_len" } } } } ] },
//!     { "verb": "arrange", "keys": [ { "column": "ratio", "descending": true } ] },
//!     { "verb": "select", "columns": [ { "name": "binomial" }, { "name": "ratio" } ] }
//!   ]
//! }
//! ```
//!
//! Runs report progress to a [`PipelineObserver`]; [`Pipeline::run`] logs through `tracing`.

mod observer;

use std::fs;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::ProcessingResult;
use crate::expr::{Expr, NamedExpr};
use crate::processing::{
    arrange, filter_expr, group_by, mutate, rename, select, Aggregation, ColumnSelector, SortKey,
};
use crate::types::DataSet;

pub use observer::{NoopPipelineObserver, PipelineEvent, PipelineObserver, TracingPipelineObserver};

/// One verb application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "snake_case")]
pub enum Step {
    Select {
        columns: Vec<ColumnSelector>,
    },
    /// Each pair is `[new_name, old_name]`.
    Rename {
        columns: Vec<(String, String)>,
    },
    Filter {
        predicate: Expr,
    },
    Arrange {
        keys: Vec<SortKey>,
    },
    Mutate {
        columns: Vec<NamedExpr>,
    },
    Summarise {
        #[serde(default)]
        group_by: Vec<String>,
        aggregations: Vec<Aggregation>,
    },
    Head {
        n: usize,
    },
}

impl Step {
    /// Verb name, for logs and events.
    pub fn verb(&self) -> &'static str {
        match self {
            Step::Select { .. } => "select",
            Step::Rename { .. } => "rename",
            Step::Filter { .. } => "filter",
            Step::Arrange { .. } => "arrange",
            Step::Mutate { .. } => "mutate",
            Step::Summarise { .. } => "summarise",
            Step::Head { .. } => "head",
        }
    }

    /// Apply this step to `dataset`.
    pub fn apply(&self, dataset: &DataSet) -> ProcessingResult<DataSet> {
        match self {
            Step::Select { columns } => select(dataset, columns),
            Step::Rename { columns } => rename(dataset, columns),
            Step::Filter { predicate } => filter_expr(dataset, predicate),
            Step::Arrange { keys } => arrange(dataset, keys),
            Step::Mutate { columns } => mutate(dataset, columns),
            Step::Summarise {
                group_by: keys,
                aggregations,
            } => group_by(dataset, keys)?.summarise(aggregations),
            Step::Head { n } => Ok(dataset.head(*n)),
        }
    }
}

/// An ordered list of [`Step`]s.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(default)]
    pub name: String,
    pub steps: Vec<Step>,
}

impl Pipeline {
    /// An empty pipeline; running it returns the input unchanged.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append an arbitrary step.
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn select(self, columns: Vec<ColumnSelector>) -> Self {
        self.then(Step::Select { columns })
    }

    pub fn rename(self, columns: Vec<(String, String)>) -> Self {
        self.then(Step::Rename { columns })
    }

    pub fn filter(self, predicate: Expr) -> Self {
        self.then(Step::Filter { predicate })
    }

    pub fn arrange(self, keys: Vec<SortKey>) -> Self {
        self.then(Step::Arrange { keys })
    }

    pub fn mutate(self, columns: Vec<NamedExpr>) -> Self {
        self.then(Step::Mutate { columns })
    }

    pub fn summarise(self, group_by: Vec<String>, aggregations: Vec<Aggregation>) -> Self {
        self.then(Step::Summarise {
            group_by,
            aggregations,
        })
    }

    pub fn head(self, n: usize) -> Self {
        self.then(Step::Head { n })
    }

    /// Decode a pipeline from JSON.
    pub fn from_json_str(json: &str) -> ProcessingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and decode a JSON pipeline file.
    pub fn from_path(path: impl AsRef<Path>) -> ProcessingResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json_string(&self) -> ProcessingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Run every step in order, logging progress through `tracing`.
    pub fn run(&self, input: &DataSet) -> ProcessingResult<DataSet> {
        self.run_observed(input, &TracingPipelineObserver)
    }

    /// Run every step in order, reporting to `observer`. Stops at the first failing step.
    pub fn run_observed(&self, input: &DataSet, observer: &dyn PipelineObserver) -> ProcessingResult<DataSet> {
        let start = Instant::now();
        observer.on_event(&PipelineEvent::RunStarted {
            pipeline: self.name.clone(),
            steps: self.steps.len(),
        });

        let mut current: Option<DataSet> = None;
        for (index, step) in self.steps.iter().enumerate() {
            let source = current.as_ref().unwrap_or(input);
            let verb = step.verb();
            observer.on_event(&PipelineEvent::StepStarted {
                index,
                verb,
                rows_in: source.row_count(),
            });

            let step_start = Instant::now();
            let out = match step.apply(source) {
                Ok(out) => out,
                Err(e) => {
                    observer.on_event(&PipelineEvent::StepFailed {
                        index,
                        verb,
                        message: e.to_string(),
                    });
                    return Err(e);
                }
            };

            observer.on_event(&PipelineEvent::StepFinished {
                index,
                verb,
                rows_out: out.row_count(),
                columns_out: out.column_count(),
                elapsed: step_start.elapsed(),
            });
            current = Some(out);
        }

        let out = current.unwrap_or_else(|| input.clone());
        observer.on_event(&PipelineEvent::RunFinished {
            pipeline: self.name.clone(),
            rows_out: out.row_count(),
            elapsed: start.elapsed(),
        });
        Ok(out)
    }
}
