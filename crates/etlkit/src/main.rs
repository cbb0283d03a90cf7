mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use etlkit_core::{
    all_pipeline_descriptors, run_pipeline, EnergySalesPipeline, EtlConfig,
    NetflixCatalogPipeline, RunSummary,
};
use tracing::error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Batch ETL jobs for the catalogue and energy exports", long_about = None)]
struct Cli {
    /// TOML config file (falls back to ETLKIT_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How to print the run summary
    #[arg(long, value_enum, default_value_t = SummaryFormat::Text, global = true)]
    summary: SummaryFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean the Netflix catalogue export
    Netflix(NetflixArgs),
    /// Flatten capability records and clean electricity sales
    Energy(EnergyArgs),
    /// List registered pipelines
    List,
}

#[derive(Args, Debug, Default)]
struct NetflixArgs {
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct EnergyArgs {
    #[arg(long)]
    sales_input: Option<PathBuf>,
    #[arg(long)]
    capability_input: Option<PathBuf>,
    #[arg(long)]
    sales_output: Option<PathBuf>,
    #[arg(long)]
    capability_output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SummaryFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = EtlConfig::resolve(cli.config.as_deref(), |key| std::env::var(key).ok())
        .context("loading configuration")?;

    match cli.command {
        Command::List => {
            print_pipelines();
            Ok(())
        }
        Command::Netflix(args) => {
            override_path(&mut config.netflix.input, args.input);
            override_path(&mut config.netflix.output, args.output);
            let _guard = logging::init(&config)?;

            let pipeline = NetflixCatalogPipeline::from(&config.netflix);
            let summary = run_pipeline(&pipeline)?;
            print_summary(&summary, cli.summary)
        }
        Command::Energy(args) => {
            override_path(&mut config.energy.sales_input, args.sales_input);
            override_path(&mut config.energy.capability_input, args.capability_input);
            override_path(&mut config.energy.sales_output, args.sales_output);
            override_path(&mut config.energy.capability_output, args.capability_output);
            let _guard = logging::init(&config)?;

            let pipeline = EnergySalesPipeline::from(&config.energy);
            match run_pipeline(&pipeline) {
                Ok(summary) => print_summary(&summary, cli.summary),
                Err(err) => {
                    // Energy runs report failures and still exit cleanly.
                    error!(error = %err, "Energy pipeline failed");
                    println!("something went wrong: {err}");
                    Ok(())
                }
            }
        }
    }
}

fn override_path(target: &mut PathBuf, value: Option<PathBuf>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn print_pipelines() {
    let mut table = Table::new();
    table.set_header(vec!["code", "version", "inputs", "outputs", "description"]);
    for descriptor in all_pipeline_descriptors() {
        table.add_row(vec![
            descriptor.code,
            descriptor.version,
            descriptor.inputs,
            descriptor.outputs,
            descriptor.description,
        ]);
    }
    println!("{table}");
}

fn print_summary(summary: &RunSummary, format: SummaryFormat) -> Result<()> {
    match format {
        SummaryFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        SummaryFormat::Text => {
            println!(
                "{} run {} finished in {} ms ({} rows read)",
                summary.pipeline, summary.run_id, summary.elapsed_ms, summary.rows_read
            );
            for output in &summary.outputs {
                println!(
                    "  wrote {} ({} rows, {} columns)",
                    output.path.display(),
                    output.rows,
                    output.columns.len()
                );
            }
            for skipped in &summary.skipped_columns {
                println!("  skipped '{}' in {}", skipped.column, skipped.step);
            }
        }
    }
    Ok(())
}
