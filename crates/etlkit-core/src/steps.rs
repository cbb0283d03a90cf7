use std::fmt;

use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::TransformError;

/// An expected column that was absent and therefore left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedColumn {
    pub step: &'static str,
    pub column: String,
}

#[derive(Debug, Clone)]
pub struct StepOutput {
    pub dataframe: DataFrame,
    pub skipped: Vec<SkippedColumn>,
}

impl StepOutput {
    pub fn new(dataframe: DataFrame) -> Self {
        Self {
            dataframe,
            skipped: Vec::new(),
        }
    }

    pub fn skip(&mut self, step: &'static str, column: impl Into<String>) {
        self.skipped.push(SkippedColumn {
            step,
            column: column.into(),
        });
    }
}

/// A single cleaning rule. Rules never mutate their input; each returns a new frame.
#[derive(Clone, Copy)]
pub struct TransformStep {
    pub name: &'static str,
    pub apply: fn(&DataFrame) -> Result<StepOutput, TransformError>,
}

impl fmt::Debug for TransformStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformStep")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub dataframe: DataFrame,
    pub skipped_columns: Vec<SkippedColumn>,
    /// Input row position of every surviving row, for transforms that filter rows.
    pub row_labels: Option<Vec<i64>>,
}

/// Runs `steps` in order, feeding each step the previous step's output.
pub fn apply_steps(
    df: &DataFrame,
    steps: &[TransformStep],
) -> Result<TransformResult, TransformError> {
    let mut current = df.clone();
    let mut skipped_columns = Vec::new();

    for step in steps {
        debug!(
            step = step.name,
            rows = current.height(),
            columns = current.width(),
            "Applying transform step"
        );
        let output = (step.apply)(&current)?;
        current = output.dataframe;
        skipped_columns.extend(output.skipped);
    }

    Ok(TransformResult {
        dataframe: current,
        skipped_columns,
        row_labels: None,
    })
}

pub(crate) fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

pub(crate) fn require_column<'a>(
    df: &'a DataFrame,
    step: &'static str,
    name: &str,
) -> Result<&'a Column, TransformError> {
    df.column(name).map_err(|_| TransformError::MissingColumn {
        step,
        column: name.to_string(),
    })
}

/// Returns a copy of `df` with `column` replacing the column of the same name, or appended.
pub(crate) fn with_replaced_column(
    df: &DataFrame,
    column: Series,
) -> Result<DataFrame, TransformError> {
    let mut out = df.clone();
    out.with_column(column)?;
    Ok(out)
}
