use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// Category – a single cell in a categorical column
// ---------------------------------------------------------------------------

/// Value of a categorical column (gender, membership, payment method,
/// country). Empty cells are kept as `Missing` so they can still be
/// selected in the filter panel and grouped like any other value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Missing,
    Value(String),
}

impl Category {
    /// Interpret a raw cell; only empty cells become `Missing`.
    pub fn from_cell(cell: Option<&str>) -> Self {
        match cell {
            Some(s) if !s.is_empty() => Category::Value(s.to_string()),
            _ => Category::Missing,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Value(s) => write!(f, "{s}"),
            Category::Missing => write!(f, "<kosong>"),
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category::from_cell(Some(s))
    }
}

// ---------------------------------------------------------------------------
// Dimension – the categorical columns the user can filter on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Gender,
    Membership,
    PayMethod,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::Gender,
        Dimension::Membership,
        Dimension::PayMethod,
    ];

    /// Label of the multi-select control.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Gender => "Pilih Gender",
            Dimension::Membership => "Pilih Membership",
            Dimension::PayMethod => "Pilih Metode Pembayaran",
        }
    }

    pub fn value_of(self, record: &AccessRecord) -> &Category {
        match self {
            Dimension::Gender => &record.gender,
            Dimension::Membership => &record.membership,
            Dimension::PayMethod => &record.pay_method,
        }
    }
}

// ---------------------------------------------------------------------------
// AccessRecord – one validated row of the log
// ---------------------------------------------------------------------------

/// A single validated access-log row. Timestamp, sales and duration are
/// guaranteed present; every other field tolerates missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessRecord {
    pub accessed_at: NaiveDateTime,
    pub gender: Category,
    pub membership: Category,
    pub pay_method: Category,
    pub country: Category,
    pub age: Option<f64>,
    pub sales: f64,
    pub duration_secs: f64,
}

// ---------------------------------------------------------------------------
// AccessLog – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The validated log with the per-dimension value index used by the
/// filter panel. Built once and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct AccessLog {
    pub records: Vec<AccessRecord>,
    /// Rows discarded at load for lacking timestamp, sales or duration.
    pub dropped: usize,
    pub source: Option<PathBuf>,
    /// For each filter dimension the sorted set of observed values.
    pub unique_values: BTreeMap<Dimension, BTreeSet<Category>>,
}

impl AccessLog {
    /// Build the value index from the validated records.
    pub fn from_records(records: Vec<AccessRecord>) -> Self {
        let mut unique_values: BTreeMap<Dimension, BTreeSet<Category>> =
            Dimension::ALL.iter().map(|d| (*d, BTreeSet::new())).collect();

        for rec in &records {
            for dim in Dimension::ALL {
                unique_values
                    .entry(dim)
                    .or_default()
                    .insert(dim.value_of(rec).clone());
            }
        }

        AccessLog {
            records,
            dropped: 0,
            source: None,
            unique_values,
        }
    }

    pub fn with_dropped(mut self, dropped: usize) -> Self {
        self.dropped = dropped;
        self
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
impl AccessRecord {
    /// Compact constructor for tests: date as `YYYY-MM-DD`.
    pub fn fixture(
        date: &str,
        gender: &str,
        membership: &str,
        pay_method: &str,
        country: &str,
        sales: f64,
        duration_secs: f64,
    ) -> Self {
        let day = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("fixture date");
        AccessRecord {
            accessed_at: day.and_hms_opt(12, 0, 0).expect("fixture time"),
            gender: gender.into(),
            membership: membership.into(),
            pay_method: pay_method.into(),
            country: country.into(),
            age: None,
            sales,
            duration_secs,
        }
    }
}
