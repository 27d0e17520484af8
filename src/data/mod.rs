/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + coerce + drop invalid rows → AccessLog
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ Arc<AccessLog>  │  immutable snapshot, loaded once
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  category selections → visible indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, grouped sums, duration buckets → DashboardView
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
