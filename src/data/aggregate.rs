use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{AccessLog, AccessRecord, Category};
use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// Scalar summaries of the filtered subset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kpis {
    pub transactions: usize,
    pub total_sales: f64,
    /// `None` when the subset is empty.
    pub mean_duration: Option<f64>,
}

pub fn kpis(rows: &[&AccessRecord]) -> Kpis {
    let total_sales = rows.iter().map(|r| r.sales).sum();
    let mean_duration = if rows.is_empty() {
        None
    } else {
        Some(rows.iter().map(|r| r.duration_secs).sum::<f64>() / rows.len() as f64)
    };

    Kpis {
        transactions: rows.len(),
        total_sales,
        mean_duration,
    }
}

// ---------------------------------------------------------------------------
// Grouped sums and counts
// ---------------------------------------------------------------------------

/// Sum sales per category, in category order.
pub fn sum_sales_by<F>(rows: &[&AccessRecord], key: F) -> Vec<(Category, f64)>
where
    F: Fn(&AccessRecord) -> &Category,
{
    let mut groups: BTreeMap<&Category, f64> = BTreeMap::new();
    for &rec in rows {
        *groups.entry(key(rec)).or_default() += rec.sales;
    }
    groups.into_iter().map(|(k, v)| (k.clone(), v)).collect()
}

pub fn sales_by_pay_method(rows: &[&AccessRecord]) -> Vec<(Category, f64)> {
    sum_sales_by(rows, |r| &r.pay_method)
}

pub fn sales_by_membership(rows: &[&AccessRecord]) -> Vec<(Category, f64)> {
    sum_sales_by(rows, |r| &r.membership)
}

/// Sales per country, highest first. Not truncated.
pub fn sales_by_country(rows: &[&AccessRecord]) -> Vec<(Category, f64)> {
    rank_descending(sum_sales_by(rows, |r| &r.country))
}

/// Number of accesses per country, most frequent first. Not truncated.
pub fn access_by_country(rows: &[&AccessRecord]) -> Vec<(Category, usize)> {
    let mut counts: BTreeMap<&Category, usize> = BTreeMap::new();
    for &rec in rows {
        *counts.entry(&rec.country).or_default() += 1;
    }
    rank_descending(counts.into_iter().map(|(k, v)| (k.clone(), v)).collect())
}

/// Sort groups by value descending; ties keep category order.
pub fn rank_descending<V: PartialOrd>(mut groups: Vec<(Category, V)>) -> Vec<(Category, V)> {
    groups.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    groups
}

/// Share of each group in the positive total. Non-positive groups are
/// left out, so an all-zero input yields no slices.
pub fn proportions(groups: &[(Category, f64)]) -> Vec<(Category, f64)> {
    let total: f64 = groups.iter().map(|(_, v)| *v).filter(|v| *v > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    groups
        .iter()
        .filter(|(_, v)| *v > 0.0)
        .map(|(k, v)| (k.clone(), v / total))
        .collect()
}

// ---------------------------------------------------------------------------
// Daily trend
// ---------------------------------------------------------------------------

/// Sales summed per calendar day, oldest first.
pub fn daily_sales(rows: &[&AccessRecord]) -> Vec<(NaiveDate, f64)> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for &rec in rows {
        *days.entry(rec.accessed_at.date()).or_default() += rec.sales;
    }
    days.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Duration buckets
// ---------------------------------------------------------------------------

/// One right-closed interval `(lower, upper]` of session duration.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationBucket {
    pub lower: f64,
    pub upper: f64,
    pub observations: usize,
    /// Mean sales of the rows in the interval; `None` when it is empty.
    pub mean_sales: Option<f64>,
}

impl DurationBucket {
    pub fn label(&self) -> String {
        format!("({:.1}, {:.1}]", self.lower, self.upper)
    }
}

/// Interval edges over `[min, max]`: `bins` equal-width intervals, the
/// first edge nudged down by 0.1% of the range so the minimum falls in
/// the first right-closed interval. A zero-width range is widened by
/// 0.1% on both sides (or 0.001 around zero).
pub fn bucket_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let (lo, hi, degenerate) = if min == max {
        let adj = if min != 0.0 { 0.001 * min.abs() } else { 0.001 };
        (min - adj, max + adj, true)
    } else {
        (min, max, false)
    };

    let step = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|i| lo + step * i as f64).collect();
    edges[bins] = hi;
    if !degenerate {
        edges[0] -= (hi - lo) * 0.001;
    }
    edges
}

/// Mean sales per duration interval. Every interval is reported, empty
/// ones with `mean_sales == None`. An empty subset has no range and
/// yields no intervals.
pub fn sales_by_duration_bucket(rows: &[&AccessRecord], bins: usize) -> Vec<DurationBucket> {
    if rows.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
        (lo.min(r.duration_secs), hi.max(r.duration_secs))
    });
    let edges = bucket_edges(min, max, bins);

    let mut sums = vec![0.0; bins];
    let mut counts = vec![0usize; bins];
    for &rec in rows {
        // first edge >= value closes the interval containing it
        let upper = edges.partition_point(|e| *e < rec.duration_secs);
        let idx = upper.saturating_sub(1).min(bins - 1);
        sums[idx] += rec.sales;
        counts[idx] += 1;
    }

    edges
        .windows(2)
        .zip(sums.iter().zip(&counts))
        .map(|(w, (sum, &n))| DurationBucket {
            lower: w[0],
            upper: w[1],
            observations: n,
            mean_sales: (n > 0).then(|| sum / n as f64),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// DashboardView – every derived view of one filtered subset
// ---------------------------------------------------------------------------

/// All aggregates shown on the dashboard, recomputed on each filter change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub kpis: Kpis,
    pub sales_by_pay_method: Vec<(Category, f64)>,
    pub pay_method_shares: Vec<(Category, f64)>,
    pub daily_sales: Vec<(NaiveDate, f64)>,
    pub duration_buckets: Vec<DurationBucket>,
    pub sales_by_membership: Vec<(Category, f64)>,
    /// Top countries by access count.
    pub access_by_country: Vec<(Category, usize)>,
    /// Top countries by sales.
    pub sales_by_country: Vec<(Category, f64)>,
}

impl DashboardView {
    pub fn compute(log: &AccessLog, indices: &[usize], config: &DashboardConfig) -> Self {
        let rows: Vec<&AccessRecord> = indices.iter().map(|&i| &log.records[i]).collect();

        let sales_by_pay_method = sales_by_pay_method(&rows);
        let pay_method_shares = proportions(&sales_by_pay_method);

        let mut access = access_by_country(&rows);
        access.truncate(config.top_countries);
        let mut country_sales = sales_by_country(&rows);
        country_sales.truncate(config.top_countries);

        DashboardView {
            kpis: kpis(&rows),
            sales_by_pay_method,
            pay_method_shares,
            daily_sales: daily_sales(&rows),
            duration_buckets: sales_by_duration_bucket(&rows, config.duration_bins),
            sales_by_membership: sales_by_membership(&rows),
            access_by_country: access,
            sales_by_country: country_sales,
        }
    }
}
