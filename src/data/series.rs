use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{CellValue, RecordSet};
use super::sales::{CATEGORY, DATE, REGION, REVENUE};

// ---------------------------------------------------------------------------
// Chart focus: click-driven cross filter shared by all charts
// ---------------------------------------------------------------------------

/// Category and/or region the charts are narrowed to. KPIs ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartFocus {
    pub category: Option<String>,
    pub region: Option<String>,
}

impl ChartFocus {
    pub fn is_active(&self) -> bool {
        self.category.is_some() || self.region.is_some()
    }

    /// Focus on `label` of `column`, or release it when it is already focused.
    pub fn toggle(&mut self, column: &str, label: &str) {
        let slot = match column {
            CATEGORY => &mut self.category,
            REGION => &mut self.region,
            _ => return,
        };
        if slot.as_deref() == Some(label) {
            *slot = None;
        } else {
            *slot = Some(label.to_string());
        }
    }

    pub fn clear(&mut self) {
        *self = ChartFocus::default();
    }

    /// Rows of `view` matching the focus.
    pub fn apply(&self, view: &RecordSet) -> RecordSet {
        if !self.is_active() {
            return view.clone();
        }
        let cat = view.column_index(CATEGORY);
        let reg = view.column_index(REGION);
        let indices: Vec<usize> = view
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                focus_matches(cat, self.category.as_deref(), row)
                    && focus_matches(reg, self.region.as_deref(), row)
            })
            .map(|(i, _)| i)
            .collect();
        view.select_rows(&indices)
    }
}

fn focus_matches(col: Option<usize>, want: Option<&str>, row: &[CellValue]) -> bool {
    match want {
        None => true,
        Some(w) => col.and_then(|c| view_label(row, c)) == Some(w),
    }
}

fn view_label(row: &[CellValue], col: usize) -> Option<&str> {
    row.get(col).and_then(|v| v.as_str())
}

// ---------------------------------------------------------------------------
// Series builders
// ---------------------------------------------------------------------------

/// Per category, revenue summed by date, dates ascending.
pub fn revenue_over_time(view: &RecordSet) -> BTreeMap<String, Vec<(NaiveDate, f64)>> {
    let (Some(date), Some(cat), Some(rev)) = (
        view.column_index(DATE),
        view.column_index(CATEGORY),
        view.column_index(REVENUE),
    ) else {
        return BTreeMap::new();
    };

    let mut sums: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    for row in &view.rows {
        let (Some(d), Some(c)) = (
            row.get(date).and_then(|v| v.as_date()),
            view_label(row, cat),
        ) else {
            continue;
        };
        let r = row.get(rev).and_then(|v| v.as_f64()).unwrap_or(0.0);
        *sums.entry(c.to_string()).or_default().entry(d).or_default() += r;
    }
    sums.into_iter()
        .map(|(c, by_date)| (c, by_date.into_iter().collect()))
        .collect()
}

/// Revenue summed per label of `column`, largest first (ties by label).
pub fn revenue_by(view: &RecordSet, column: &str) -> Vec<(String, f64)> {
    let (Some(col), Some(rev)) = (view.column_index(column), view.column_index(REVENUE)) else {
        return Vec::new();
    };
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for row in &view.rows {
        if let Some(label) = view_label(row, col) {
            *sums.entry(label).or_default() += row.get(rev).and_then(|v| v.as_f64()).unwrap_or(0.0);
        }
    }
    let mut out: Vec<(String, f64)> = sums.into_iter().map(|(l, v)| (l.to_string(), v)).collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}
