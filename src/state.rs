use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::aggregate::DashboardView;
use crate::data::filter::{filtered_indices, init_filter_state, FilterState};
use crate::data::model::{AccessLog, Category, Dimension};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Immutable snapshot loaded at startup (or via File → Open).
    pub log: Arc<AccessLog>,

    /// Per-dimension filter selections.
    pub filters: FilterState,

    /// Indices of records passing the current filters.
    pub visible_indices: Vec<usize>,

    /// Aggregates of the visible records, rebuilt on every refilter.
    pub view: DashboardView,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(log: Arc<AccessLog>, config: DashboardConfig) -> Self {
        let mut state = Self {
            config,
            log: Arc::new(AccessLog::default()),
            filters: FilterState::new(),
            visible_indices: Vec::new(),
            view: DashboardView::default(),
            status_message: None,
        };
        state.set_log(log);
        state
    }

    /// Swap in a new snapshot and reset every filter to "all values".
    pub fn set_log(&mut self, log: Arc<AccessLog>) {
        self.filters = init_filter_state(&log);
        self.log = log;
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and the derived view after a filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.log, &self.filters);
        self.view = DashboardView::compute(&self.log, &self.visible_indices, &self.config);
        log::debug!(
            "Refiltered: {} of {} rows visible",
            self.visible_indices.len(),
            self.log.len()
        );
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &Category) {
        let selected = self.filters.entry(dim).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select every observed value of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        let all = self.log.unique_values.get(&dim).cloned().unwrap_or_default();
        self.filters.insert(dim, all);
        self.refilter();
    }

    /// Deselect every value of a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.filters.insert(dim, BTreeSet::new());
        self.refilter();
    }

    pub fn is_selected(&self, dim: Dimension, value: &Category) -> bool {
        self.filters
            .get(&dim)
            .is_some_and(|selected| selected.contains(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::AccessRecord;
    use crate::ui::kpi::{format_currency, format_count};

    fn state_with(records: Vec<AccessRecord>) -> AppState {
        AppState::new(
            Arc::new(AccessLog::from_records(records)),
            DashboardConfig::default(),
        )
    }

    fn hundred_rows() -> Vec<AccessRecord> {
        let genders = ["Male", "Female"];
        let tiers = ["Normal", "Premium", "Not Logged In"];
        let methods = ["Cash", "Credit Card", "Debit Card"];
        (0..100)
            .map(|i| {
                AccessRecord::fixture(
                    "2017-04-01",
                    genders[i % 2],
                    tiers[i % 3],
                    methods[i % 3],
                    "Italy",
                    50.0,
                    (i * 12) as f64,
                )
            })
            .collect()
    }

    #[test]
    fn default_filters_show_everything() {
        let state = state_with(hundred_rows());
        assert_eq!(state.visible_indices.len(), 100);
        assert_eq!(format_count(state.view.kpis.transactions), "100");
        assert_eq!(format_currency(state.view.kpis.total_sales), "$5,000.00");
    }

    #[test]
    fn select_none_empties_and_select_all_restores() {
        let mut state = state_with(hundred_rows());

        state.select_none(Dimension::Membership);
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.view.kpis.transactions, 0);
        assert_eq!(state.view.kpis.mean_duration, None);
        assert!(state.view.sales_by_membership.is_empty());

        state.select_all(Dimension::Membership);
        assert_eq!(state.visible_indices.len(), 100);
    }

    #[test]
    fn toggling_a_value_removes_then_restores_its_rows() {
        let mut state = state_with(hundred_rows());
        let cash = Category::from("Cash");

        state.toggle_filter_value(Dimension::PayMethod, &cash);
        assert!(!state.is_selected(Dimension::PayMethod, &cash));
        assert_eq!(state.visible_indices.len(), 66);
        assert!(state
            .view
            .sales_by_pay_method
            .iter()
            .all(|(method, _)| *method != cash));

        state.toggle_filter_value(Dimension::PayMethod, &cash);
        assert_eq!(state.visible_indices.len(), 100);
    }

    #[test]
    fn new_snapshot_resets_filters() {
        let mut state = state_with(hundred_rows());
        state.select_none(Dimension::Gender);

        let replacement = vec![AccessRecord::fixture(
            "2017-05-01", "Female", "Premium", "Cash", "Peru", 9.0, 10.0,
        )];
        state.set_log(Arc::new(AccessLog::from_records(replacement)));

        assert_eq!(state.visible_indices, vec![0]);
        assert!(state.is_selected(Dimension::Gender, &Category::from("Female")));
    }
}
