use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV: &str = "ETLKIT_CONFIG";
pub const LOG_FILE_ENV: &str = "ETLKIT_LOG_FILE";
pub const LOG_DIR_ENV: &str = "ETLKIT_LOG_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    pub log_dir: PathBuf,
    pub log_file: String,
    pub netflix: NetflixConfig,
    pub energy: EnergyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetflixConfig {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnergyConfig {
    pub sales_input: PathBuf,
    pub capability_input: PathBuf,
    pub sales_output: PathBuf,
    pub capability_output: PathBuf,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            log_file: "netfilx_etl.log".to_string(),
            netflix: NetflixConfig::default(),
            energy: EnergyConfig::default(),
        }
    }
}

impl Default for NetflixConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("Netflix.csv"),
            output: PathBuf::from("cleaned_netflix.csv"),
        }
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            sales_input: PathBuf::from("electricity_sales.csv"),
            capability_input: PathBuf::from("electricity_capability_nested.json"),
            sales_output: PathBuf::from("loaded_electricity_sales.csv"),
            capability_output: PathBuf::from("loaded_capability.parquet"),
        }
    }
}

impl EtlConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then the optional file, then environment overrides read through `lookup`.
    pub fn resolve(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let from_env = lookup(CONFIG_ENV).map(PathBuf::from);
        let mut config = match path.or(from_env.as_deref()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(log_file) = lookup(LOG_FILE_ENV) {
            config.log_file = log_file;
        }
        if let Some(log_dir) = lookup(LOG_DIR_ENV) {
            config.log_dir = PathBuf::from(log_dir);
        }

        Ok(config)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }
}
