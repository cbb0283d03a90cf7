mod csv;
mod json;
mod parquet;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::DatasetError;

pub(crate) use csv::{read_csv, write_csv};
pub use json::{flatten_json_value, FlattenError};
pub(crate) use json::read_json;
pub(crate) use parquet::{read_parquet, write_parquet};

/// File formats the extractor and loader know how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Csv,
    Parquet,
    Json,
}

impl DataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Parquet => "parquet",
            DataFormat::Json => "json",
        }
    }

    pub fn supports_write(&self) -> bool {
        matches!(self, DataFormat::Csv | DataFormat::Parquet)
    }

    /// Resolves the format tag from the path's extension.
    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| DataFormat::try_from(ext).ok())
            .ok_or_else(|| DatasetError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DataFormat {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(DataFormat::Csv),
            "parquet" => Ok(DataFormat::Parquet),
            "json" => Ok(DataFormat::Json),
            other => Err(format!("unknown data format '{other}'")),
        }
    }
}
