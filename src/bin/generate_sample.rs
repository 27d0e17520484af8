use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const CSV_PATH: &str = "E-commerce Website Logs.csv";
const PARQUET_PATH: &str = "E-commerce Website Logs.parquet";
const ROWS: usize = 5_000;
const DAYS: i64 = 90;

const GENDERS: [&str; 3] = ["Male", "Female", "Unknown"];
const MEMBERSHIPS: [&str; 3] = ["Normal", "Premium", "Not Logged In"];
const PAY_METHODS: [&str; 4] = ["Credit Card", "Debit Card", "Cash", "Others"];
const COUNTRIES: [&str; 14] = [
    "United States", "India", "Italy", "Japan", "Germany", "Brazil", "Canada", "Mexico",
    "Indonesia", "France", "Chile", "Spain", "Kenya", "Peru",
];
const PROTOCOLS: [&str; 3] = ["TCP", "UDP", "ICMP"];

/// One row of the raw log, in the column layout of the original export.
#[derive(Debug, Serialize)]
struct RawRow {
    accessed_date: String,
    #[serde(rename = "duration_(secs)")]
    duration_secs: String,
    network_protocol: String,
    age: String,
    gender: String,
    country: String,
    membership: String,
    sales: String,
    pay_method: String,
}

/// Pick from `items`, favouring the front of the list.
fn skewed<'a>(rng: &mut SmallRng, items: &[&'a str]) -> &'a str {
    let u: f64 = rng.random();
    items[((u * u) * items.len() as f64) as usize]
}

fn generate_row(rng: &mut SmallRng, start: NaiveDate) -> RawRow {
    let day = start + Duration::days(rng.random_range(0..DAYS));
    let accessed_at = day.and_hms_milli_opt(
        rng.random_range(0..24),
        rng.random_range(0..60),
        rng.random_range(0..60),
        rng.random_range(0..1000),
    );

    let duration: f64 = rng.random_range(5.0..1200.0);
    let membership = MEMBERSHIPS[rng.random_range(0..MEMBERSHIPS.len())];
    let pay_method = skewed(rng, &PAY_METHODS);
    // longer sessions and paying members spend more
    let tier_boost = match membership {
        "Premium" => 1.6,
        "Normal" => 1.0,
        _ => 0.6,
    };
    let sales = (20.0 + duration * 0.35 + rng.random_range(0.0..150.0)) * tier_boost;

    let mut row = RawRow {
        accessed_date: accessed_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
            .unwrap_or_default(),
        duration_secs: format!("{duration:.0}"),
        network_protocol: PROTOCOLS[rng.random_range(0..PROTOCOLS.len())].to_string(),
        age: if rng.random_bool(0.08) {
            "--".to_string()
        } else {
            rng.random_range(18..70).to_string()
        },
        gender: GENDERS[rng.random_range(0..GENDERS.len())].to_string(),
        country: skewed(rng, &COUNTRIES).to_string(),
        membership: membership.to_string(),
        sales: format!("{sales:.2}"),
        pay_method: pay_method.to_string(),
    };

    // A small share of rows the dashboard loader has to reject.
    match rng.random_range(0..100) {
        0 => row.sales = String::new(),
        1 => row.duration_secs = "n/a".to_string(),
        2 => row.accessed_date = "unknown".to_string(),
        _ => {}
    }
    row
}

fn write_csv(rows: &[RawRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(CSV_PATH).context("creating CSV output")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(rows: &[RawRow]) -> Result<()> {
    let column = |f: fn(&RawRow) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let names = [
        "accessed_date",
        "duration_(secs)",
        "network_protocol",
        "age",
        "gender",
        "country",
        "membership",
        "sales",
        "pay_method",
    ];
    let schema = Arc::new(Schema::new(
        names
            .iter()
            .map(|n| Field::new(*n, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            column(|r| r.accessed_date.as_str()),
            column(|r| r.duration_secs.as_str()),
            column(|r| r.network_protocol.as_str()),
            column(|r| r.age.as_str()),
            column(|r| r.gender.as_str()),
            column(|r| r.country.as_str()),
            column(|r| r.membership.as_str()),
            column(|r| r.sales.as_str()),
            column(|r| r.pay_method.as_str()),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(PARQUET_PATH).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(42);
    let start = NaiveDate::from_ymd_opt(2017, 1, 1).context("invalid start date")?;

    let rows: Vec<RawRow> = (0..ROWS).map(|_| generate_row(&mut rng, start)).collect();

    write_csv(&rows)?;
    write_parquet(&rows)?;

    println!("Wrote {ROWS} access log rows to {CSV_PATH} and {PARQUET_PATH}");
    Ok(())
}
