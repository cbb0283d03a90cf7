use std::path::Path;

use polars::prelude::DataFrame;
use tracing::{info, warn};

use crate::errors::DatasetError;
use crate::formats::{write_csv, write_parquet, DataFormat};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Log a warning before replacing an existing file.
    pub warn_on_overwrite: bool,
    /// Prepend an unnamed index column (CSV only).
    pub write_index: bool,
    /// Values for the index column. Positions `0..height` when absent.
    pub index_labels: Option<Vec<i64>>,
}

impl LoadOptions {
    fn index(&self, df: &DataFrame, path: &Path) -> Result<Option<Vec<i64>>, DatasetError> {
        if !self.write_index {
            return Ok(None);
        }
        match &self.index_labels {
            Some(labels) if labels.len() != df.height() => Err(DatasetError::IndexLength {
                path: path.to_path_buf(),
                expected: df.height(),
                found: labels.len(),
            }),
            Some(labels) => Ok(Some(labels.clone())),
            None => Ok(Some((0..df.height() as i64).collect())),
        }
    }
}

/// Writes `df` to `path`, dispatching on its extension. Unsupported extensions fail before
/// anything touches the filesystem.
pub fn load(
    df: &DataFrame,
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<(), DatasetError> {
    let path = path.as_ref();
    let format = DataFormat::from_path(path)?;
    if !format.supports_write() {
        return Err(unsupported(path));
    }

    info!(
        path = %path.display(),
        %format,
        rows = df.height(),
        columns = df.width(),
        "Loading data"
    );

    if options.warn_on_overwrite && path.exists() {
        warn!(path = %path.display(), "File already exists. Overwriting...");
    }

    match format {
        DataFormat::Csv => write_csv(df, path, options.index(df, path)?)?,
        DataFormat::Parquet => write_parquet(df, path)?,
        DataFormat::Json => return Err(unsupported(path)),
    }

    info!(path = %path.display(), "File saved successfully");
    Ok(())
}

fn unsupported(path: &Path) -> DatasetError {
    DatasetError::UnsupportedFormat {
        path: path.to_path_buf(),
    }
}
