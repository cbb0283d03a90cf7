// crates/etlkit-core/src/error.rs

use std::path::PathBuf;

use etlkit_io::DatasetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{step}: required column '{column}' not found")]
    MissingColumn { step: &'static str, column: String },

    #[error("could not parse '{value}' in column '{column}' at row {row}")]
    ParseFailure {
        column: String,
        row: usize,
        value: String,
    },

    #[error("column '{column}' has type {found}, expected {expected}")]
    SchemaMismatch {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("column '{column}' has missing values but no value to take the mode of")]
    NoMode { column: String },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("nothing was extracted from {}", path.display())]
    NoInput { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
