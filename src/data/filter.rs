use std::collections::{BTreeMap, BTreeSet};

use super::model::{AccessLog, Category, Dimension};

// ---------------------------------------------------------------------------
// Filter predicate: which categories are selected per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state: maps dimension → set of selected values.
/// A dimension absent from the map does not constrain rows; a present but
/// empty set rejects every row.
pub type FilterState = BTreeMap<Dimension, BTreeSet<Category>>;

/// Initialise a [`FilterState`] with every observed value selected.
pub fn init_filter_state(log: &AccessLog) -> FilterState {
    log.unique_values
        .iter()
        .map(|(dim, vals)| (*dim, vals.clone()))
        .collect()
}

/// Return indices of records that pass all active filters.
///
/// A record passes a dimension filter when:
/// * The dimension is not present in `filters` → passes (no constraint)
/// * The selected set for that dimension is empty → fails
/// * The record's value for that dimension is in the selected set → passes
pub fn filtered_indices(log: &AccessLog, filters: &FilterState) -> Vec<usize> {
    if filters.values().any(BTreeSet::is_empty) {
        return Vec::new();
    }

    // Dimensions with every observed value selected cannot reject a row.
    let active: Vec<(Dimension, &BTreeSet<Category>)> = filters
        .iter()
        .filter(|(dim, selected)| {
            log.unique_values
                .get(*dim)
                .map_or(true, |all| !all.is_subset(*selected))
        })
        .map(|(dim, selected)| (*dim, selected))
        .collect();

    log.records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            active
                .iter()
                .all(|(dim, selected)| selected.contains(dim.value_of(rec)))
        })
        .map(|(i, _)| i)
        .collect()
}
