//! The mammal life-history table (PanTHERIA layout).
//!
//! One row per species. Raw headers such as `5-1_AdultBodyMass_g` are cleaned to the column
//! names below; every other column of the raw file is ignored. `-999` marks an unmeasured
//! trait and is read as missing.

use std::path::Path;

use crate::error::IngestionResult;
use crate::types::{DataSet, DataType, Field, Schema};

use super::unified::{ingest_from_path, IngestionOptions};

pub const ORDER: &str = "order";
pub const BINOMIAL: &str = "binomial";
/// Grams.
pub const ADULT_BODY_MASS: &str = "adult_body_mass";
/// Millimetres.
pub const ADULT_HEAD_BODY_LEN: &str = "adult_head_body_len";
/// Square kilometres.
pub const HOME_RANGE: &str = "home_range";
pub const LITTER_SIZE: &str = "litter_size";

/// Schema of the cleaned mammal table.
pub fn mammal_schema() -> Schema {
    Schema::new(vec![
        Field::new(ORDER, DataType::Utf8),
        Field::new(BINOMIAL, DataType::Utf8),
        Field::new(ADULT_BODY_MASS, DataType::Float64),
        Field::new(ADULT_HEAD_BODY_LEN, DataType::Float64),
        Field::new(HOME_RANGE, DataType::Float64),
        Field::new(LITTER_SIZE, DataType::Float64),
    ])
}

/// Load a PanTHERIA-style file with the default cleaning rules and missing markers.
pub fn load_mammals(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    load_mammals_with(path, &IngestionOptions::default())
}

/// [`load_mammals`] with caller-supplied options (observer, forced format, extra NA tokens).
pub fn load_mammals_with(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<DataSet> {
    ingest_from_path(path, &mammal_schema(), options)
}
