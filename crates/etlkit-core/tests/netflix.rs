use std::io::Write;
use std::sync::{Arc, Mutex};

use etlkit_core::netflix::{self, transform_netflix, UNKNOWN_PLACEHOLDER};
use etlkit_core::{SkippedColumn, TransformError};
use polars::prelude::*;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn catalogue() -> DataFrame {
    df![
        "show_id" => ["s1", "s2", "s3", "s4", "s5"],
        "title" => ["Dick Johnson Is Dead", "Blood & Water", "Ganglands", "Sankofa", "Grown Ups"],
        "director" => [Some("Kirsten Johnson"), None, Some("Julien Leclercq"), Some("Haile Gerima"), None],
        "cast" => [None, Some("Ama Qamata, Khosi Ngema"), Some("Sami Bouajila"), None, Some("Adam Sandler")],
        "country" => [
            Some("United States"),
            Some("South Africa"),
            None,
            Some("United States, Ghana, Burkina Faso"),
            Some("United States"),
        ],
        "date_added" => [
            Some("September 25, 2021"),
            Some("September 24, 2021"),
            Some(" August 4, 2017"),
            None,
            Some("2021-09-01"),
        ],
        "description" => ["a", "b", "c", "d", "e"],
    ]
    .unwrap()
}

fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect()
}

#[test]
fn country_has_no_nulls_and_only_first_listed_country() -> PolarsResult<()> {
    let result = transform_netflix(&catalogue()).expect("transform");
    let df = &result.dataframe;

    assert_eq!(df.column("country")?.null_count(), 0);
    let countries = strings(df, "country");
    assert!(countries
        .iter()
        .flatten()
        .all(|country| !country.contains(", ")));
    assert_eq!(countries[2].as_deref(), Some("United States"));
    assert_eq!(countries[3].as_deref(), Some("United States"));
    assert_eq!(countries[1].as_deref(), Some("South Africa"));
    Ok(())
}

#[test]
fn director_and_cast_are_filled_with_placeholder() -> PolarsResult<()> {
    let result = transform_netflix(&catalogue()).expect("transform");
    let df = &result.dataframe;

    assert_eq!(df.column("director")?.null_count(), 0);
    assert_eq!(df.column("cast")?.null_count(), 0);
    assert_eq!(strings(df, "director")[1].as_deref(), Some("Unknow"));
    assert_eq!(strings(df, "cast")[0].as_deref(), Some(UNKNOWN_PLACEHOLDER));
    assert_eq!(strings(df, "cast")[2].as_deref(), Some("Sami Bouajila"));
    Ok(())
}

#[test]
fn identifier_columns_are_dropped_whether_or_not_present() {
    let with_ids = transform_netflix(&catalogue()).unwrap().dataframe;
    let without_ids = transform_netflix(
        &catalogue()
            .drop("show_id")
            .unwrap()
            .drop("description")
            .unwrap(),
    )
    .unwrap()
    .dataframe;

    for df in [&with_ids, &without_ids] {
        assert!(df.column("show_id").is_err());
        assert!(df.column("description").is_err());
        assert_eq!(df.height(), 5);
    }
    assert_eq!(with_ids.get_column_names(), without_ids.get_column_names());
}

#[test]
fn date_added_becomes_datetime() -> PolarsResult<()> {
    let df = transform_netflix(&catalogue()).unwrap().dataframe;
    let dates = df.column("date_added")?;

    assert_eq!(
        dates.dtype(),
        &DataType::Datetime(TimeUnit::Microseconds, None)
    );
    assert_eq!(dates.null_count(), 1);

    let expected = chrono::NaiveDate::from_ymd_opt(2017, 8, 4)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp_micros();
    assert_eq!(dates.datetime()?.get(2), Some(expected));
    Ok(())
}

#[test]
fn unparseable_date_fails_the_transform() {
    let df = df![
        "title" => ["a", "b"],
        "date_added" => ["September 25, 2021", "sometime last week"],
    ]
    .unwrap();

    let err = transform_netflix(&df).unwrap_err();
    match err {
        TransformError::ParseFailure { column, row, value } => {
            assert_eq!(column, "date_added");
            assert_eq!(row, 1);
            assert_eq!(value, "sometime last week");
        }
        other => panic!("expected ParseFailure, got {other:?}"),
    }
}

#[test]
fn temporal_date_added_is_cast() -> PolarsResult<()> {
    let dates = Series::new("date_added".into(), [Some(18_000i32), None]).cast(&DataType::Date)?;
    let df = DataFrame::new(vec![dates.into()])?;

    let out = netflix::parse_date_added(&df).unwrap().dataframe;
    assert_eq!(
        out.column("date_added")?.dtype(),
        &DataType::Datetime(TimeUnit::Microseconds, None)
    );
    Ok(())
}

#[test]
fn missing_columns_are_skipped_with_warnings() {
    let df = df!["title" => ["a", "b"]].unwrap();
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || transform_netflix(&df))
        .expect("missing columns are not fatal");

    let skipped: Vec<&str> = result
        .skipped_columns
        .iter()
        .map(|skip| skip.column.as_str())
        .collect();
    assert_eq!(skipped, ["country", "director", "cast", "date_added"]);
    assert!(result.dataframe.equals_missing(&df));

    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("WARN"), "logs were: {text}");
    assert!(text.contains("'country' column not found"), "logs were: {text}");
    assert!(text.contains("INFO"), "logs were: {text}");
}

#[test]
fn director_without_cast_is_still_filled() -> PolarsResult<()> {
    let df = df!["director" => [None, Some("Haile Gerima")]]?;
    let output = netflix::fill_director_and_cast(&df).unwrap();

    assert_eq!(output.dataframe.column("director")?.null_count(), 0);
    assert_eq!(
        output.skipped,
        vec![SkippedColumn {
            step: "fill_director_and_cast",
            column: "cast".to_string(),
        }]
    );
    Ok(())
}

#[test]
fn non_text_country_is_coerced_to_string() -> PolarsResult<()> {
    let df = df!["country" => [Some(7i64), None, Some(7), Some(3)]]?;
    let out = netflix::clean_country(&df).unwrap().dataframe;

    assert_eq!(out.column("country")?.dtype(), &DataType::String);
    assert_eq!(
        strings(&out, "country"),
        vec![
            Some("7".to_string()),
            Some("7".to_string()),
            Some("7".to_string()),
            Some("3".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn country_without_any_value_has_no_mode() {
    let countries = Series::new("country".into(), [None::<&str>, None]);
    let df = DataFrame::new(vec![countries.into()]).unwrap();

    let err = netflix::clean_country(&df).unwrap_err();
    assert!(matches!(err, TransformError::NoMode { .. }));
}

#[test]
fn input_frame_is_left_untouched() {
    let input = catalogue();
    let before = input.clone();
    let _ = transform_netflix(&input).unwrap();
    assert!(input.equals_missing(&before));
}
