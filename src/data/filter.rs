use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{CellValue, RecordSet};
use super::sales::{SalesColumns, SalesDataset};

// ---------------------------------------------------------------------------
// Filter predicate: date range plus selected category / region labels
// ---------------------------------------------------------------------------

/// Sidebar selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesFilter {
    /// Inclusive start of the date range.
    pub start: NaiveDate,
    /// Inclusive end of the date range.
    pub end: NaiveDate,
    pub categories: BTreeSet<String>,
    pub regions: BTreeSet<String>,
}

impl SalesFilter {
    /// Everything selected: the dataset's full date span and every label.
    pub fn all(dataset: &SalesDataset) -> Self {
        let (start, end) = dataset
            .date_bounds
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        SalesFilter {
            start,
            end,
            categories: dataset.categories.iter().cloned().collect(),
            regions: dataset.regions.iter().cloned().collect(),
        }
    }

    /// Whether one row passes all three predicates.
    ///
    /// A row passes when:
    /// * its date lies in `[start, end]` (a null date never does)
    /// * its category is among the selected categories
    /// * its region is among the selected regions
    ///
    /// An empty selection therefore rejects every row.
    pub fn matches(&self, cols: &SalesColumns, row: &[CellValue]) -> bool {
        let in_range = row
            .get(cols.date)
            .and_then(CellValue::as_date)
            .is_some_and(|d| self.start <= d && d <= self.end);
        in_range
            && label_selected(row.get(cols.category), &self.categories)
            && label_selected(row.get(cols.region), &self.regions)
    }
}

fn label_selected(cell: Option<&CellValue>, selected: &BTreeSet<String>) -> bool {
    match cell.and_then(CellValue::as_str) {
        Some(label) => selected.contains(label),
        None => false,
    }
}

/// Return indices of rows that pass the filter, in source order.
pub fn filtered_indices(dataset: &SalesDataset, filter: &SalesFilter) -> Vec<usize> {
    dataset
        .records
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| filter.matches(&dataset.columns, row))
        .map(|(i, _)| i)
        .collect()
}

/// The filtered view: matching rows with every source column.
pub fn filtered_view(dataset: &SalesDataset, filter: &SalesFilter) -> RecordSet {
    dataset
        .records
        .select_rows(&filtered_indices(dataset, filter))
}
