pub mod config;
pub mod context;
pub mod energy;
pub mod error;
pub mod netflix;
pub mod pipelines;
pub mod steps;

pub use config::{ConfigError, EtlConfig};
pub use context::RunContext;
pub use error::{PipelineError, Result, TransformError};
pub use pipelines::{
    all_pipeline_descriptors, run_pipeline, EnergySalesPipeline, EtlPipeline,
    NetflixCatalogPipeline, RunSummary,
};
pub use steps::{SkippedColumn, TransformResult, TransformStep};
