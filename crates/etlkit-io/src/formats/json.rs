use std::collections::HashMap;
use std::fs;
use std::path::Path;

use polars::prelude::{Column, DataFrame, NamedFrom, PolarsError, Series};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::errors::DatasetError;

#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("expected a JSON object or an array of objects, found {found}")]
    UnexpectedShape { found: &'static str },
    #[error("array element {index} is {found}, expected an object")]
    NonObjectRecord { index: usize, found: &'static str },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Boolean,
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => ColumnKind::Boolean,
            Value::Number(number) if number.is_i64() => ColumnKind::Integer,
            Value::Number(_) => ColumnKind::Float,
            _ => ColumnKind::Text,
        }
    }

    fn merge(self, other: ColumnKind) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Text,
        }
    }
}

pub(crate) fn read_json(path: &Path) -> Result<DataFrame, DatasetError> {
    let text = fs::read_to_string(path).map_err(|err| DatasetError::io(path, err))?;
    let value: Value = serde_json::from_str(&text).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    flatten_json_value(&value).map_err(|source| DatasetError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Flattens a JSON document into one row per record. Nested objects become dotted
/// column names; arrays are kept as their JSON text.
pub fn flatten_json_value(value: &Value) -> Result<DataFrame, FlattenError> {
    let records: Vec<&Map<String, Value>> = match value {
        Value::Object(map) => vec![map],
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(FlattenError::NonObjectRecord {
                    index,
                    found: json_type_name(other),
                }),
            })
            .collect::<Result<_, _>>()?,
        other => {
            return Err(FlattenError::UnexpectedShape {
                found: json_type_name(other),
            })
        }
    };

    let mut order: Vec<String> = Vec::new();
    let mut rows: Vec<HashMap<String, &Value>> = Vec::with_capacity(records.len());
    for record in records {
        let mut row = HashMap::new();
        flatten_object(record, None, &mut row, &mut order);
        rows.push(row);
    }

    if order.is_empty() {
        return Ok(DataFrame::empty_with_height(rows.len()));
    }

    let mut columns: Vec<Column> = Vec::with_capacity(order.len());
    for name in &order {
        let values: Vec<Option<&Value>> = rows
            .iter()
            .map(|row| row.get(name).copied().filter(|value| !value.is_null()))
            .collect();
        columns.push(build_series(name, &values).into());
    }

    Ok(DataFrame::new(columns)?)
}

fn flatten_object<'a>(
    object: &'a Map<String, Value>,
    prefix: Option<&str>,
    row: &mut HashMap<String, &'a Value>,
    order: &mut Vec<String>,
) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_object(nested, Some(&name), row, order),
            _ => {
                if !order.contains(&name) {
                    order.push(name.clone());
                }
                row.insert(name, value);
            }
        }
    }
}

fn build_series(name: &str, values: &[Option<&Value>]) -> Series {
    let kind = values
        .iter()
        .flatten()
        .map(|value| ColumnKind::of(value))
        .reduce(ColumnKind::merge)
        .unwrap_or(ColumnKind::Text);

    match kind {
        ColumnKind::Boolean => {
            let data: Vec<Option<bool>> = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Series::new(name.into(), data)
        }
        ColumnKind::Integer => {
            let data: Vec<Option<i64>> = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Series::new(name.into(), data)
        }
        ColumnKind::Float => {
            let data: Vec<Option<f64>> = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Series::new(name.into(), data)
        }
        ColumnKind::Text => {
            let data: Vec<Option<String>> = values
                .iter()
                .map(|v| {
                    v.map(|value| match value {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                })
                .collect();
            Series::new(name.into(), data)
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
