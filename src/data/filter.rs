use std::collections::BTreeSet;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Membership filter on one categorical column.
/// An empty `selected` set means "no filter" (show all).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryFilter {
    pub column: String,
    pub selected: BTreeSet<CellValue>,
}

impl CategoryFilter {
    pub fn new(column: impl Into<String>) -> Self {
        CategoryFilter {
            column: column.into(),
            selected: BTreeSet::new(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Closed-interval filter `[lo, hi]` on one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFilter {
    pub column: String,
    pub lo: f64,
    pub hi: f64,
}

impl NumericFilter {
    /// Whether the interval covers `bounds` entirely (excludes nothing).
    pub fn covers(&self, bounds: Option<(f64, f64)>) -> bool {
        match bounds {
            Some((min, max)) => self.lo <= min && self.hi >= max,
            None => true,
        }
    }
}

/// The active filter predicates, combined by conjunction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSelection {
    pub category: Option<CategoryFilter>,
    pub numeric: Option<NumericFilter>,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Rows (ascending) that pass the categorical predicate alone.
pub fn category_indices(table: &Table, filter: Option<&CategoryFilter>) -> Vec<usize> {
    let all = table.all_rows();
    let Some(filter) = filter.filter(|f| !f.is_identity()) else {
        return all;
    };
    let Some(column) = table.column(&filter.column) else {
        return all;
    };
    all.into_iter()
        .filter(|&r| filter.selected.contains(&column.values[r]))
        .collect()
}

/// Observed `(min, max)` of a numeric column over `rows`, ignoring missing values.
pub fn numeric_bounds(table: &Table, column: &str, rows: &[usize]) -> Option<(f64, f64)> {
    let values = table.column(column)?.numeric_values(rows);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (!values.is_empty()).then_some((min, max))
}

/// Narrow `rows` to those inside the numeric interval.
///
/// When the interval covers the observed bounds of `rows` the predicate is
/// the identity and rows with a missing value are kept as well.
pub fn apply_numeric(table: &Table, filter: Option<&NumericFilter>, rows: Vec<usize>) -> Vec<usize> {
    let Some(filter) = filter else {
        return rows;
    };
    let Some(column) = table.column(&filter.column) else {
        return rows;
    };
    if filter.covers(numeric_bounds(table, &filter.column, &rows)) {
        return rows;
    }
    rows.into_iter()
        .filter(|&r| {
            column.values[r]
                .as_f64()
                .is_some_and(|v| v >= filter.lo && v <= filter.hi)
        })
        .collect()
}

/// Return indices of rows that pass all active filters.
pub fn filtered_indices(table: &Table, selection: &FilterSelection) -> Vec<usize> {
    let rows = category_indices(table, selection.category.as_ref());
    apply_numeric(table, selection.numeric.as_ref(), rows)
}
