//! Command-line front end: load a table, optionally run a JSON pipeline over it, print a
//! preview and optionally write the result.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tidy_table::export::write_delimited_to_path;
use tidy_table::ingestion::{
    ingest_from_path_inferred, load_mammals_with, IngestionFormat, IngestionOptions, TracingObserver,
};
use tidy_table::pipeline::Pipeline;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemaArg {
    /// The six-column mammal trait schema
    Mammals,
    /// Keep every column and infer its type
    Infer,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Tsv,
    Csv,
}

impl From<FormatArg> for IngestionFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Tsv => IngestionFormat::Tsv,
            FormatArg::Csv => IngestionFormat::Csv,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tidy-table", version, about = "Preview and reshape delimited trait tables")]
struct Args {
    /// Delimited input file
    input: PathBuf,

    #[arg(long, value_enum, default_value_t = SchemaArg::Mammals)]
    schema: SchemaArg,

    /// JSON pipeline to run over the loaded table
    #[arg(long)]
    pipeline: Option<PathBuf>,

    /// Rows to print
    #[arg(long, default_value_t = 10)]
    head: usize,

    /// Write the result here (`.csv` → comma-separated, otherwise tab-separated)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Input format (default: from the file extension)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the table; logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let options = IngestionOptions {
        format: args.format.map(Into::into),
        observer: Some(Arc::new(TracingObserver)),
        ..Default::default()
    };

    let input = match args.schema {
        SchemaArg::Mammals => load_mammals_with(&args.input, &options),
        SchemaArg::Infer => ingest_from_path_inferred(&args.input, &options),
    }
    .with_context(|| format!("failed to load {}", args.input.display()))?;

    let result = match &args.pipeline {
        Some(path) => {
            let pipeline =
                Pipeline::from_path(path).with_context(|| format!("failed to read pipeline {}", path.display()))?;
            pipeline
                .run(&input)
                .with_context(|| format!("pipeline '{}' failed", pipeline.name))?
        }
        None => input,
    };

    print!("{}", result.preview(args.head));

    if let Some(path) = &args.output {
        write_delimited_to_path(&result, path).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), rows = result.row_count(), "wrote output");
    }

    Ok(())
}
