/// Rendering: filter panel, KPI cards, charts and the country table.
pub mod kpi;
pub mod panels;
pub mod plot;
pub mod table;
