use std::path::Path;

use polars::prelude::DataFrame;
use tracing::{error, info};

use crate::errors::DatasetError;
use crate::formats::{read_csv, read_json, read_parquet, DataFormat};

/// Reads `path` into a dataset, dispatching on its extension.
///
/// A missing CSV file is logged and reported as `Ok(None)` so the caller decides whether an
/// absent input is fatal. Every other failure is returned as an error.
pub fn extract(path: impl AsRef<Path>) -> Result<Option<DataFrame>, DatasetError> {
    let path = path.as_ref();
    let format = DataFormat::from_path(path)?;
    info!(path = %path.display(), %format, "Extracting data");

    let df = match format {
        DataFormat::Csv => match read_csv(path) {
            Ok(df) => df,
            Err(DatasetError::FileNotFound { .. }) => {
                error!(path = %path.display(), "Cannot read file");
                return Ok(None);
            }
            Err(err) => return Err(err),
        },
        DataFormat::Parquet => read_parquet(path)?,
        DataFormat::Json => read_json(path)?,
    };

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Extracted data"
    );
    Ok(Some(df))
}

/// Like [`extract`], restricted to delimited text and Parquet.
pub fn extract_tabular(path: impl AsRef<Path>) -> Result<Option<DataFrame>, DatasetError> {
    let path = path.as_ref();
    match DataFormat::from_path(path)? {
        DataFormat::Csv | DataFormat::Parquet => extract(path),
        DataFormat::Json => Err(DatasetError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Reads a JSON document and flattens it into a table.
pub fn extract_json(path: impl AsRef<Path>) -> Result<DataFrame, DatasetError> {
    let path = path.as_ref();
    info!(path = %path.display(), "Extracting nested JSON");
    let df = read_json(path)?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Flattened JSON"
    );
    Ok(df)
}
