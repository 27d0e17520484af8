use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use thiserror::Error;

use super::model::{AccessLog, AccessRecord, Category};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Columns every log file must provide, looked up by name.
pub const COLUMNS: [&str; 8] = [
    "accessed_date",
    "gender",
    "membership",
    "pay_method",
    "country",
    "age",
    "sales",
    "duration_(secs)",
];

const ACCESSED_DATE: usize = 0;
const GENDER: usize = 1;
const MEMBERSHIP: usize = 2;
const PAY_METHOD: usize = 3;
const COUNTRY: usize = 4;
const AGE: usize = 5;
const SALES: usize = 6;
const DURATION: usize = 7;

#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and validate an access log.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-delimited with a header row
/// * `.tsv`          – tab-delimited with a header row
/// * `.parquet`      – any column types; cells are read through their
///   display form and coerced exactly like delimited text
pub fn load_file(path: &Path) -> Result<AccessLog> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let log = match ext.as_str() {
        "csv" | "txt" => load_delimited(path, b',')?,
        "tsv" => load_delimited(path, b'\t')?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    };

    Ok(log.with_source(path))
}

// ---------------------------------------------------------------------------
// Row validation (shared by every format)
// ---------------------------------------------------------------------------

/// Accumulates validated rows and counts the rejected ones.
#[derive(Default)]
struct RowSink {
    records: Vec<AccessRecord>,
    dropped: usize,
}

impl RowSink {
    fn push(&mut self, cells: [Option<&str>; 8]) {
        match coerce_row(cells) {
            Some(rec) => self.records.push(rec),
            None => self.dropped += 1,
        }
    }

    fn finish(self) -> AccessLog {
        if self.dropped > 0 {
            log::warn!(
                "Dropped {} rows without a valid timestamp, sales or duration",
                self.dropped
            );
        }
        AccessLog::from_records(self.records).with_dropped(self.dropped)
    }
}

/// Coerce one row of raw cells (in [`COLUMNS`] order). Returns `None` when
/// the timestamp, sales or duration is missing or malformed.
fn coerce_row(cells: [Option<&str>; 8]) -> Option<AccessRecord> {
    let accessed_at = cells[ACCESSED_DATE].and_then(parse_timestamp)?;
    let sales = cells[SALES].and_then(parse_number)?;
    let duration_secs = cells[DURATION].and_then(parse_number)?;

    Some(AccessRecord {
        accessed_at,
        gender: Category::from_cell(cells[GENDER]),
        membership: Category::from_cell(cells[MEMBERSHIP]),
        pay_method: Category::from_cell(cells[PAY_METHOD]),
        country: Category::from_cell(cells[COUNTRY]),
        age: cells[AGE].and_then(parse_number),
        sales,
        duration_secs,
    })
}

/// Lenient numeric parse: anything that is not a finite number is missing.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Lenient timestamp parse. Offsets are normalised to UTC; bare dates
/// land at midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, delimiter: u8) -> Result<AccessLog> {
    // Short rows are padded with missing cells instead of failing the load.
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = reader
        .headers()
        .context("reading CSV headers")?
        .clone();

    let mut positions = [0usize; 8];
    for (slot, name) in positions.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(LoadError::MissingColumn(name))?;
    }

    let mut sink = RowSink::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV data row {}", row_no + 1))?;
        sink.push(positions.map(|idx| record.get(idx)));
    }

    Ok(sink.finish())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the log. Column types are free: strings,
/// numbers and timestamps all go through the same coercion as text.
fn load_parquet(path: &Path) -> Result<AccessLog> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut sink = RowSink::default();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let mut columns = Vec::with_capacity(COLUMNS.len());
        for name in COLUMNS {
            let idx = schema
                .index_of(name)
                .map_err(|_| LoadError::MissingColumn(name))?;
            columns.push(batch.column(idx).clone());
        }

        for row in 0..batch.num_rows() {
            let cells: Vec<Option<String>> = columns
                .iter()
                .map(|col| {
                    if col.is_null(row) {
                        None
                    } else {
                        array_value_to_string(col.as_ref(), row).ok()
                    }
                })
                .collect();

            let mut view: [Option<&str>; 8] = [None; 8];
            for (slot, cell) in view.iter_mut().zip(&cells) {
                *slot = cell.as_deref();
            }
            sink.push(view);
        }
    }

    Ok(sink.finish())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::Dimension;

    const HEADER: &str =
        "accessed_date,duration_(secs),network_protocol,age,gender,country,membership,sales,pay_method";

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_rows_are_coerced_and_invalid_ones_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}\n\
             2017-03-14 17:43:57.172,2533,TCP,43,Male,Japan,Normal,261.96,Credit Card\n\
             2017-03-15 09:00:00,120,TCP,--,Female,Italy,Premium,12.5,Cash\n\
             not a date,100,TCP,30,Male,Peru,Normal,10.0,Cash\n\
             2017-03-16 10:00:00,abc,TCP,30,Male,Peru,Normal,10.0,Cash\n\
             2017-03-16 10:00:00,50,TCP,30,Male,Peru,Normal,,Cash\n\
             2017-03-17,75,UDP,22,,Peru,Not Logged In,3,Debit Card\n"
        );
        let path = write_file(&dir, "log.csv", &body);

        let log = load_file(&path).unwrap();

        assert_eq!(log.len(), 3);
        assert_eq!(log.dropped, 3);
        assert_eq!(log.source.as_deref(), Some(path.as_path()));

        let first = &log.records[0];
        assert_eq!(first.country, Category::from("Japan"));
        assert_eq!(first.age, Some(43.0));
        assert!((first.sales - 261.96).abs() < 1e-9);
        assert_eq!(first.duration_secs, 2533.0);

        // non-numeric age is tolerated as missing
        assert_eq!(log.records[1].age, None);
        // blank gender is tolerated as a missing category
        assert_eq!(log.records[2].gender, Category::Missing);
        assert_eq!(
            log.records[2].accessed_at,
            NaiveDate::from_ymd_opt(2017, 3, 17).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn short_rows_lose_only_their_trailing_cells() {
        let dir = tempfile::tempdir().unwrap();

        // duration is the last column: a row cut before it has no duration
        let body = "accessed_date,sales,gender,membership,pay_method,country,age,duration_(secs)\n\
                    2017-01-01 10:00:00,5.0,Male,Normal,Cash,Italy,20,60\n\
                    2017-01-02 10:00:00,7.0,Female,Premium,Cash,Peru,31\n";
        let log = load_file(&write_file(&dir, "no_duration.csv", body)).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.dropped, 1);

        // optional columns last: a short row is kept with those cells missing
        let body = "accessed_date,sales,duration_(secs),gender,membership,country,pay_method,age\n\
                    2017-01-01 10:00:00,5.0,60,Male,Normal,Italy,Cash,20\n\
                    2017-01-02 10:00:00,7.0,90,Female,Premium,Peru,Cash\n\
                    2017-01-03 10:00:00,9.0,30,Female,Premium\n";
        let log = load_file(&write_file(&dir, "no_age.csv", body)).unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log.dropped, 0);
        assert_eq!(log.records[1].age, None);
        assert_eq!(log.records[2].country, Category::Missing);
        assert_eq!(log.records[2].pay_method, Category::Missing);
    }

    #[test]
    fn whitespace_only_category_is_kept_as_its_own_value() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}\n\
             2017-01-01,60,TCP,20, ,Italy,Normal,5,Cash\n\
             2017-01-02,60,TCP,20,,Italy,Normal,5,Cash\n"
        );
        let log = load_file(&write_file(&dir, "spaces.csv", &body)).unwrap();

        assert_eq!(log.records[0].gender, Category::Value(" ".into()));
        assert_eq!(log.records[1].gender, Category::Missing);
        assert_eq!(log.unique_values[&Dimension::Gender].len(), 2);
    }

    #[test]
    fn unreadable_row_is_reported_with_one_based_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        let mut bytes =
            format!("{HEADER}\n2017-01-01,60,TCP,20,Male,Italy,Normal,5,Cash\n").into_bytes();
        bytes.extend_from_slice(b"2017-01-02,60,TCP,20,\xff\xfe,Italy,Normal,5,Cash\n");
        std::fs::write(&path, bytes).unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("CSV data row 2"), "{err:#}");
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let body = "accessed_date\tgender\tmembership\tpay_method\tcountry\tage\tsales\tduration_(secs)\n\
                    2017-01-01 00:00:00\tMale\tNormal\tCash\tItaly\t20\t5.5\t60\n";
        let path = write_file(&dir, "log.tsv", body);

        let log = load_file(&path).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.records[0].pay_method, Category::from("Cash"));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let body = "accessed_date,gender,membership,pay_method,country,age,duration_(secs)\n";
        let path = write_file(&dir, "log.csv", body);

        let err = load_file(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::MissingColumn("sales"))
        );
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("access.xlsx")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::UnsupportedExtension("xlsx".into()))
        );
    }

    #[test]
    fn absent_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file(&dir.path().join("nope.csv")).is_err());
    }

    #[test]
    fn parquet_goes_through_the_same_coercion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.parquet");

        let text = |v: Vec<Option<&str>>| -> ArrayRef { Arc::new(StringArray::from(v)) };
        let number = |v: Vec<Option<f64>>| -> ArrayRef { Arc::new(Float64Array::from(v)) };
        let schema = Arc::new(Schema::new(vec![
            Field::new("accessed_date", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("membership", DataType::Utf8, true),
            Field::new("pay_method", DataType::Utf8, true),
            Field::new("country", DataType::Utf8, true),
            Field::new("age", DataType::Float64, true),
            Field::new("sales", DataType::Float64, true),
            Field::new("duration_(secs)", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                text(vec![Some("2017-05-01 08:30:00"), Some("2017-05-02 08:30:00"), None]),
                text(vec![Some("Female"), None, Some("Male")]),
                text(vec![Some("Premium"), Some("Normal"), Some("Normal")]),
                text(vec![Some("Cash"), Some("Credit Card"), Some("Cash")]),
                text(vec![Some("Chile"), Some("Chile"), Some("Chile")]),
                number(vec![Some(31.0), None, Some(40.0)]),
                number(vec![Some(100.0), Some(7.25), Some(1.0)]),
                number(vec![Some(300.0), Some(45.0), Some(5.0)]),
            ],
        )
        .unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let log = load_file(&path).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.dropped, 1);
        assert_eq!(log.records[0].age, Some(31.0));
        assert_eq!(log.records[1].gender, Category::Missing);
        assert_eq!(log.records[1].sales, 7.25);
    }

    #[test]
    fn timestamps_accept_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2017, 3, 14)
            .unwrap()
            .and_hms_opt(17, 43, 57)
            .unwrap();
        assert_eq!(parse_timestamp("2017-03-14 17:43:57"), Some(expected));
        assert_eq!(parse_timestamp("2017-03-14T17:43:57"), Some(expected));
        assert_eq!(parse_timestamp("03/14/2017 17:43:57"), Some(expected));
        assert_eq!(parse_timestamp("2017-03-14T19:43:57+02:00"), Some(expected));
        assert!(parse_timestamp("2017-03-14 17:43:57.172").is_some());
        assert!(parse_timestamp("2017/03/14").is_some());
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn numbers_reject_non_finite_and_garbage() {
        assert_eq!(parse_number(" 42.5 "), Some(42.5));
        assert_eq!(parse_number("--"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }
}
