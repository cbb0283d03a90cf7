use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::formats::FlattenError;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("unsupported file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("{} index labels supplied for {} rows: {}", found, expected, path.display())]
    IndexLength {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("polars failed on {}: {source}", path.display())]
    Polars {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot flatten JSON from {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: FlattenError,
    },
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            DatasetError::FileNotFound { path }
        } else {
            DatasetError::Io { path, source }
        }
    }

    pub(crate) fn polars(path: impl Into<PathBuf>, source: PolarsError) -> Self {
        DatasetError::Polars {
            path: path.into(),
            source,
        }
    }
}
