//! Cleaning rules for the electricity retail sales export.
//!
//! Unlike the catalogue rules these have no local recovery: a missing column or a wrong
//! dtype is returned as an error and the caller decides what to do with the run.

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::TransformError;
use crate::steps::{
    apply_steps, has_column, require_column, with_replaced_column, StepOutput, TransformResult,
    TransformStep,
};

pub const PRICE: &str = "price";
pub const SECTOR_NAME: &str = "sectorName";
pub const PERIOD: &str = "period";
pub const MONTH: &str = "month";
pub const YEAR: &str = "year";

pub const REPORTED_SECTORS: [&str; 2] = ["residential", "transportation"];

pub const OUTPUT_COLUMNS: [&str; 5] = [YEAR, MONTH, "stateid", PRICE, "price-units"];

/// Input row position, carried through the filters and split off into `row_labels`.
pub const SOURCE_ROW: &str = "source_row";

// `period` arrives as "YYYY-MM"; the split below keeps the historical 4/5 offsets.
const MONTH_CHARS: usize = 4;
const YEAR_OFFSET: usize = 5;

pub static ENERGY_SALES_STEPS: &[TransformStep] = &[
    TransformStep {
        name: "drop_missing_price",
        apply: drop_missing_price,
    },
    TransformStep {
        name: "keep_reported_sectors",
        apply: keep_reported_sectors,
    },
    TransformStep {
        name: "derive_period_parts",
        apply: derive_period_parts,
    },
    TransformStep {
        name: "select_output_columns",
        apply: select_output_columns,
    },
];

pub fn transform_energy_sales(df: &DataFrame) -> Result<TransformResult, TransformError> {
    info!(rows = df.height(), "Transforming electricity sales");
    let labelled = df.with_row_index(SOURCE_ROW.into(), None)?;
    let mut result = apply_steps(&labelled, ENERGY_SALES_STEPS)?;

    let labels = result.dataframe.column(SOURCE_ROW)?.cast(&DataType::Int64)?;
    result.row_labels = Some(labels.i64()?.into_no_null_iter().collect());
    result.dataframe = result.dataframe.drop(SOURCE_ROW)?;
    Ok(result)
}

pub fn drop_missing_price(df: &DataFrame) -> Result<StepOutput, TransformError> {
    let price = require_column(df, "drop_missing_price", PRICE)?;
    let mut keep = price.is_not_null();
    if price.dtype().is_float() {
        let not_nan = price.as_materialized_series().is_not_nan()?;
        keep = &keep & &not_nan;
    }

    let out = df.filter(&keep)?;
    debug!(
        dropped = df.height() - out.height(),
        "Dropped rows with missing price"
    );
    Ok(StepOutput::new(out))
}

pub fn keep_reported_sectors(df: &DataFrame) -> Result<StepOutput, TransformError> {
    let sectors = require_column(df, "keep_reported_sectors", SECTOR_NAME)?.str()?;
    let keep: BooleanChunked = sectors
        .into_iter()
        .map(|sector| Some(sector.is_some_and(|name| REPORTED_SECTORS.contains(&name))))
        .collect();

    let out = df.filter(&keep)?;
    debug!(
        kept = out.height(),
        sectors = ?REPORTED_SECTORS,
        "Filtered sectors"
    );
    Ok(StepOutput::new(out))
}

/// Adds `month` (first four characters of `period`) and `year` (everything from the sixth).
pub fn derive_period_parts(df: &DataFrame) -> Result<StepOutput, TransformError> {
    let period = require_column(df, "derive_period_parts", PERIOD)?.str()?;

    let month: StringChunked = period
        .into_iter()
        .map(|value| value.map(|text| text.chars().take(MONTH_CHARS).collect::<String>()))
        .collect();
    let year: StringChunked = period
        .into_iter()
        .map(|value| value.map(|text| text.chars().skip(YEAR_OFFSET).collect::<String>()))
        .collect();

    debug!("Derived 'month' and 'year' from 'period'");
    let out = with_replaced_column(df, month.with_name(MONTH.into()).into_series())?;
    let out = with_replaced_column(&out, year.with_name(YEAR.into()).into_series())?;
    Ok(StepOutput::new(out))
}

/// Keeps exactly [`OUTPUT_COLUMNS`], preceded by [`SOURCE_ROW`] when the frame carries it.
pub fn select_output_columns(df: &DataFrame) -> Result<StepOutput, TransformError> {
    let mut selected = Vec::with_capacity(OUTPUT_COLUMNS.len() + 1);
    if has_column(df, SOURCE_ROW) {
        selected.push(SOURCE_ROW);
    }
    for name in OUTPUT_COLUMNS {
        require_column(df, "select_output_columns", name)?;
        selected.push(name);
    }
    Ok(StepOutput::new(df.select(selected)?))
}
