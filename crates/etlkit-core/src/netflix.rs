//! Cleaning rules for the Netflix catalogue export.
//!
//! Missing optional columns are never fatal here: each rule logs a warning and records the
//! column as skipped. Only an unparseable `date_added` value (or a `country` column with
//! nothing to take the mode of) fails the transform.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::TransformError;
use crate::steps::{
    apply_steps, has_column, with_replaced_column, StepOutput, TransformResult, TransformStep,
};

pub const COUNTRY: &str = "country";
pub const DIRECTOR: &str = "director";
pub const CAST: &str = "cast";
pub const DATE_ADDED: &str = "date_added";
pub const DROPPED_COLUMNS: [&str; 2] = ["show_id", "description"];

/// Fill value for unknown directors and cast members.
pub const UNKNOWN_PLACEHOLDER: &str = "Unknow";

const COUNTRY_DELIMITER: &str = ", ";

static DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

static DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%Y-%m-%d", "%m/%d/%Y", "%d-%b-%y"];

pub static NETFLIX_STEPS: &[TransformStep] = &[
    TransformStep {
        name: "clean_country",
        apply: clean_country,
    },
    TransformStep {
        name: "fill_director_and_cast",
        apply: fill_director_and_cast,
    },
    TransformStep {
        name: "drop_identifier_columns",
        apply: drop_identifier_columns,
    },
    TransformStep {
        name: "parse_date_added",
        apply: parse_date_added,
    },
];

pub fn transform_netflix(df: &DataFrame) -> Result<TransformResult, TransformError> {
    info!(rows = df.height(), "Transforming dataframe from csv");
    apply_steps(df, NETFLIX_STEPS)
}

/// Fills missing countries with the column mode, then keeps the first listed country.
pub fn clean_country(df: &DataFrame) -> Result<StepOutput, TransformError> {
    if !has_column(df, COUNTRY) {
        warn!("'country' column not found in dataframe");
        let mut output = StepOutput::new(df.clone());
        output.skip("clean_country", COUNTRY);
        return Ok(output);
    }

    debug!("Cleaning 'country' column");
    let as_text = df.column(COUNTRY)?.cast(&DataType::String)?;
    let values = as_text.str()?;

    let fill = if values.null_count() > 0 {
        Some(column_mode(values).ok_or_else(|| TransformError::NoMode {
            column: COUNTRY.to_string(),
        })?)
    } else {
        None
    };

    let cleaned: StringChunked = values
        .into_iter()
        .map(|value| value.or(fill.as_deref()).map(first_listed))
        .collect();

    let series = cleaned.with_name(COUNTRY.into()).into_series();
    Ok(StepOutput::new(with_replaced_column(df, series)?))
}

/// Replaces missing directors and cast members with [`UNKNOWN_PLACEHOLDER`].
///
/// Each column is filled on its own: a frame carrying only one of them still has that one
/// filled, and the other is recorded as skipped.
pub fn fill_director_and_cast(df: &DataFrame) -> Result<StepOutput, TransformError> {
    let mut output = StepOutput::new(df.clone());

    for name in [DIRECTOR, CAST] {
        if !has_column(&output.dataframe, name) {
            warn!(column = name, "'{name}' column not found in dataframe");
            output.skip("fill_director_and_cast", name);
            continue;
        }

        debug!(column = name, "Cleaning '{name}' column");
        let as_text = output.dataframe.column(name)?.cast(&DataType::String)?;
        let filled: StringChunked = as_text
            .str()?
            .into_iter()
            .map(|value| Some(value.unwrap_or(UNKNOWN_PLACEHOLDER)))
            .collect();
        let series = filled.with_name(name.into()).into_series();
        output.dataframe = with_replaced_column(&output.dataframe, series)?;
    }

    Ok(output)
}

/// Drops the identifier and free-text columns; absent columns are ignored.
pub fn drop_identifier_columns(df: &DataFrame) -> Result<StepOutput, TransformError> {
    debug!("Dropping 'show_id' and 'description' column");
    let mut out = df.clone();
    for name in DROPPED_COLUMNS {
        if has_column(&out, name) {
            out = out.drop(name)?;
        }
    }
    Ok(StepOutput::new(out))
}

/// Converts `date_added` into a datetime column. One bad value fails the whole transform.
pub fn parse_date_added(df: &DataFrame) -> Result<StepOutput, TransformError> {
    if !has_column(df, DATE_ADDED) {
        warn!("'date_added' column not found in dataframe");
        let mut output = StepOutput::new(df.clone());
        output.skip("parse_date_added", DATE_ADDED);
        return Ok(output);
    }

    debug!("Convert datatype 'date_added' to datetime");
    let target = DataType::Datetime(TimeUnit::Microseconds, None);
    let column = df.column(DATE_ADDED)?;

    let parsed = match column.dtype() {
        DataType::String => {
            let mut micros: Vec<Option<i64>> = Vec::with_capacity(column.len());
            for (row, value) in column.str()?.into_iter().enumerate() {
                let parsed = match value {
                    Some(text) => Some(parse_timestamp(text).ok_or_else(|| {
                        TransformError::ParseFailure {
                            column: DATE_ADDED.to_string(),
                            row,
                            value: text.to_string(),
                        }
                    })?),
                    None => None,
                };
                micros.push(parsed);
            }
            Series::new(DATE_ADDED.into(), micros).cast(&target)?
        }
        DataType::Date | DataType::Datetime(_, _) | DataType::Null => column
            .as_materialized_series()
            .cast(&target)?,
        other => {
            return Err(TransformError::SchemaMismatch {
                column: DATE_ADDED.to_string(),
                expected: "string or temporal",
                found: other.to_string(),
            })
        }
    };

    Ok(StepOutput::new(with_replaced_column(df, parsed)?))
}

/// Most frequent non-null value. Ties go to the smallest value.
fn column_mode(values: &StringChunked) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_value, a_count), (b_value, b_count)| {
            a_count.cmp(b_count).then_with(|| b_value.cmp(a_value))
        })
        .map(|(value, _)| value.to_string())
}

fn first_listed(value: &str) -> &str {
    value.split(COUNTRY_DELIMITER).next().unwrap_or(value)
}

fn parse_timestamp(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.and_utc().timestamp_micros());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_micros());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_listed_keeps_leading_country() {
        assert_eq!(first_listed("United States, Ghana"), "United States");
        assert_eq!(first_listed("India"), "India");
        assert_eq!(first_listed("France,Belgium"), "France,Belgium");
    }

    #[test]
    fn parses_catalogue_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2017, 8, 4)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_micros();
        assert_eq!(parse_timestamp(" August 4, 2017"), Some(expected));
        assert_eq!(parse_timestamp("2017-08-04"), Some(expected));
        assert_eq!(parse_timestamp("08/04/2017"), Some(expected));
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn mode_ties_resolve_to_smallest_value() {
        let values: StringChunked = [Some("b"), Some("a"), None, Some("b"), Some("a")]
            .into_iter()
            .collect();
        assert_eq!(column_mode(&values).as_deref(), Some("a"));
    }
}
