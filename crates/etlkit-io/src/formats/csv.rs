use std::fs::File;
use std::io::Write;
use std::path::Path;

use polars::prelude::*;

use crate::errors::DatasetError;

/// Markers read as null in addition to empty fields.
const NULL_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan", "null"];

/// Header of the index column written ahead of the data.
pub(crate) const INDEX_COLUMN: &str = "";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn read_csv(path: &Path) -> Result<DataFrame, DatasetError> {
    let file = File::open(path).map_err(|err| DatasetError::io(path, err))?;

    let parse_options = CsvParseOptions::default().with_null_values(Some(NullValues::AllColumns(
        NULL_MARKERS.iter().map(|marker| (*marker).into()).collect(),
    )));

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|err| DatasetError::polars(path, err))
}

pub(crate) fn write_csv(
    df: &DataFrame,
    path: &Path,
    index: Option<Vec<i64>>,
) -> Result<(), DatasetError> {
    let mut frame = df.clone();
    let has_index = index.is_some();
    if let Some(index) = index {
        frame
            .insert_column(0, Series::new(INDEX_COLUMN.into(), index))
            .map_err(|err| DatasetError::polars(path, err))?;
    }
    let datetime_format = datetime_format(&frame).map_err(|err| DatasetError::polars(path, err))?;

    let mut file = File::create(path).map_err(|err| DatasetError::io(path, err))?;
    // The writer quotes an empty header name, so the index header row is written here.
    if has_index {
        writeln!(file, "{}", header_line(&frame)).map_err(|err| DatasetError::io(path, err))?;
    }
    CsvWriter::new(&mut file)
        .include_header(!has_index)
        .with_datetime_format(datetime_format)
        .finish(&mut frame)
        .map_err(|err| DatasetError::polars(path, err))
}

/// Date-only output when every datetime value falls on midnight, full timestamps otherwise.
fn datetime_format(df: &DataFrame) -> PolarsResult<Option<String>> {
    let mut any_datetime = false;
    for column in df.get_columns() {
        let DataType::Datetime(unit, _) = column.dtype() else {
            continue;
        };
        any_datetime = true;
        let ticks_per_day = match unit {
            TimeUnit::Nanoseconds => 86_400_000_000_000,
            TimeUnit::Microseconds => 86_400_000_000,
            TimeUnit::Milliseconds => 86_400_000,
        };
        let ticks = column.cast(&DataType::Int64)?;
        if ticks
            .i64()?
            .into_iter()
            .flatten()
            .any(|tick| tick.rem_euclid(ticks_per_day) != 0)
        {
            return Ok(Some(TIMESTAMP_FORMAT.to_string()));
        }
    }
    Ok(any_datetime.then(|| DATE_FORMAT.to_string()))
}

fn header_line(df: &DataFrame) -> String {
    df.get_column_names()
        .iter()
        .map(|name| quote_field(name.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
