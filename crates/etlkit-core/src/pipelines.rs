use std::path::{Path, PathBuf};

use chrono::Utc;
use etlkit_io::{extract, extract_json, extract_tabular, load, LoadOptions};
use once_cell::sync::Lazy;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::{EnergyConfig, NetflixConfig};
use crate::context::RunContext;
use crate::energy::transform_energy_sales;
use crate::error::{PipelineError, Result};
use crate::netflix::transform_netflix;
use crate::steps::SkippedColumn;

pub const NETFLIX_CATALOG: &str = "netflix_catalog_v1";
pub const ENERGY_SALES: &str = "energy_sales_v1";

#[derive(Debug, Clone, Serialize)]
pub struct OutputSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
}

impl OutputSummary {
    fn new(path: &Path, df: &DataFrame) -> Self {
        Self {
            path: path.to_path_buf(),
            rows: df.height(),
            columns: df
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub pipeline: &'static str,
    pub run_id: Uuid,
    pub rows_read: usize,
    pub outputs: Vec<OutputSummary>,
    pub skipped_columns: Vec<SkippedColumn>,
    pub elapsed_ms: i64,
}

pub trait EtlPipeline {
    fn code_identifier(&self) -> &'static str;
    fn run(&self, context: &RunContext) -> Result<RunSummary>;
}

#[derive(Debug, Clone)]
pub struct PipelineDescriptor {
    pub code: &'static str,
    pub version: &'static str,
    pub inputs: &'static str,
    pub outputs: &'static str,
    pub description: &'static str,
}

static PIPELINES: Lazy<Vec<PipelineDescriptor>> = Lazy::new(|| {
    vec![
        PipelineDescriptor {
            code: NETFLIX_CATALOG,
            version: "0.1.0",
            inputs: "csv",
            outputs: "csv",
            description: "Fill country/director/cast, drop identifiers, parse date_added",
        },
        PipelineDescriptor {
            code: ENERGY_SALES,
            version: "0.1.0",
            inputs: "csv|parquet + nested json",
            outputs: "csv + parquet",
            description: "Residential/transportation sales prices; flattened capability table",
        },
    ]
});

pub fn all_pipeline_descriptors() -> &'static [PipelineDescriptor] {
    PIPELINES.as_slice()
}

/// Runs `pipeline` once inside a fresh [`RunContext`].
pub fn run_pipeline(pipeline: &dyn EtlPipeline) -> Result<RunSummary> {
    let context = RunContext::new(pipeline.code_identifier());
    context.in_scope(|| {
        info!("Starting ETL Pipeline");
        let summary = pipeline.run(&context)?;
        info!(
            rows_read = summary.rows_read,
            outputs = summary.outputs.len(),
            skipped = summary.skipped_columns.len(),
            elapsed_ms = summary.elapsed_ms,
            "ETL Pipeline finished"
        );
        Ok(summary)
    })
}

#[derive(Debug, Clone)]
pub struct NetflixCatalogPipeline {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl From<&NetflixConfig> for NetflixCatalogPipeline {
    fn from(config: &NetflixConfig) -> Self {
        Self {
            input: config.input.clone(),
            output: config.output.clone(),
        }
    }
}

impl EtlPipeline for NetflixCatalogPipeline {
    fn code_identifier(&self) -> &'static str {
        NETFLIX_CATALOG
    }

    fn run(&self, context: &RunContext) -> Result<RunSummary> {
        let raw = extract(&self.input)?.ok_or_else(|| PipelineError::NoInput {
            path: self.input.clone(),
        })?;

        let cleaned = transform_netflix(&raw)?;

        let options = LoadOptions {
            warn_on_overwrite: true,
            ..LoadOptions::default()
        };
        load(&cleaned.dataframe, &self.output, &options)?;

        Ok(RunSummary {
            pipeline: NETFLIX_CATALOG,
            run_id: context.run_id,
            rows_read: raw.height(),
            outputs: vec![OutputSummary::new(&self.output, &cleaned.dataframe)],
            skipped_columns: cleaned.skipped_columns,
            elapsed_ms: elapsed_ms(context),
        })
    }
}

#[derive(Debug, Clone)]
pub struct EnergySalesPipeline {
    pub sales_input: PathBuf,
    pub capability_input: PathBuf,
    pub sales_output: PathBuf,
    pub capability_output: PathBuf,
}

impl From<&EnergyConfig> for EnergySalesPipeline {
    fn from(config: &EnergyConfig) -> Self {
        Self {
            sales_input: config.sales_input.clone(),
            capability_input: config.capability_input.clone(),
            sales_output: config.sales_output.clone(),
            capability_output: config.capability_output.clone(),
        }
    }
}

impl EtlPipeline for EnergySalesPipeline {
    fn code_identifier(&self) -> &'static str {
        ENERGY_SALES
    }

    fn run(&self, context: &RunContext) -> Result<RunSummary> {
        let capability = extract_json(&self.capability_input)?;
        let sales = extract_tabular(&self.sales_input)?.ok_or_else(|| PipelineError::NoInput {
            path: self.sales_input.clone(),
        })?;

        let cleaned = transform_energy_sales(&sales)?;

        load(&capability, &self.capability_output, &LoadOptions::default())?;
        let options = LoadOptions {
            warn_on_overwrite: false,
            write_index: true,
            index_labels: cleaned.row_labels.clone(),
        };
        load(&cleaned.dataframe, &self.sales_output, &options)?;

        Ok(RunSummary {
            pipeline: ENERGY_SALES,
            run_id: context.run_id,
            rows_read: capability.height() + sales.height(),
            outputs: vec![
                OutputSummary::new(&self.capability_output, &capability),
                OutputSummary::new(&self.sales_output, &cleaned.dataframe),
            ],
            skipped_columns: cleaned.skipped_columns,
            elapsed_ms: elapsed_ms(context),
        })
    }
}

fn elapsed_ms(context: &RunContext) -> i64 {
    (Utc::now() - context.started_at).num_milliseconds()
}
