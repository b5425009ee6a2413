use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::aggregate::Kpis;
use crate::data::cache::DatasetCache;
use crate::data::export::to_csv_bytes;
use crate::data::filter::{SalesFilter, filtered_view};
use crate::data::model::RecordSet;
use crate::data::sales::{CATEGORY, REGION, SalesDataset};
use crate::data::series::ChartFocus;

/// Which label list a sidebar action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Category,
    Region,
}

impl LabelKind {
    pub fn column(&self) -> &'static str {
        match self {
            LabelKind::Category => CATEGORY,
            LabelKind::Region => REGION,
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
pub struct DashboardState {
    cache: DatasetCache,

    /// Source of the current dataset.
    pub source: Option<PathBuf>,

    /// Loaded dataset (None until a file loads).
    pub dataset: Option<Arc<SalesDataset>>,

    /// Sidebar selections; `None` until a dataset is loaded.
    pub filter: Option<SalesFilter>,

    /// Rows passing the current filter (cached).
    pub view: RecordSet,

    /// KPIs of `view` (cached).
    pub kpis: Kpis,

    /// Chart-only cross filter.
    pub focus: ChartFocus,

    pub category_colors: Option<ColorMap>,
    pub region_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::with_cache(DatasetCache::default())
    }
}

impl DashboardState {
    pub fn with_cache(cache: DatasetCache) -> Self {
        Self {
            cache,
            source: None,
            dataset: None,
            filter: None,
            view: RecordSet::default(),
            kpis: Kpis::default(),
            focus: ChartFocus::default(),
            category_colors: None,
            region_colors: None,
            status_message: None,
        }
    }

    /// Load (or reuse) the dataset at `path`. On failure the previous
    /// dataset stays and the error is shown.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        match self.cache.get_or_load(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} sales rows from {} ({} categories, {} regions)",
                    dataset.len(),
                    path.display(),
                    dataset.categories.len(),
                    dataset.regions.len()
                );
                self.source = Some(path.to_path_buf());
                self.set_dataset(dataset);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
                Err(e)
            }
        }
    }

    /// Drop the cached copy of the current source and read it again.
    pub fn reload(&mut self) -> Result<()> {
        let Some(path) = self.source.clone() else {
            return Ok(());
        };
        self.cache.invalidate(&path);
        self.load(&path)
    }

    /// Ingest a dataset, select everything and rebuild colours.
    pub fn set_dataset(&mut self, dataset: Arc<SalesDataset>) {
        self.filter = Some(SalesFilter::all(&dataset));
        self.category_colors = Some(ColorMap::new(&dataset.categories));
        self.region_colors = Some(ColorMap::new(&dataset.regions));
        self.focus.clear();
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the view and KPIs after a filter change.
    pub fn refilter(&mut self) {
        self.view = match (&self.dataset, &self.filter) {
            (Some(ds), Some(f)) => filtered_view(ds, f),
            _ => RecordSet::default(),
        };
        self.kpis = Kpis::compute(&self.view);
        log::debug!("filtered view has {} rows", self.view.len());
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        if let Some(f) = &mut self.filter {
            f.start = start;
            f.end = end;
        }
        self.refilter();
    }

    fn labels(&self, kind: LabelKind) -> &[String] {
        match (&self.dataset, kind) {
            (Some(ds), LabelKind::Category) => ds.categories.as_slice(),
            (Some(ds), LabelKind::Region) => ds.regions.as_slice(),
            (None, _) => &[],
        }
    }

    /// Toggle one label. Labels outside the dataset's set are ignored.
    pub fn toggle_label(&mut self, kind: LabelKind, label: &str) {
        if !self.labels(kind).iter().any(|l| l == label) {
            return;
        }
        if let Some(f) = &mut self.filter {
            let selected = match kind {
                LabelKind::Category => &mut f.categories,
                LabelKind::Region => &mut f.regions,
            };
            if !selected.remove(label) {
                selected.insert(label.to_string());
            }
        }
        self.refilter();
    }

    /// Select all labels of a kind.
    pub fn select_all(&mut self, kind: LabelKind) {
        let all: BTreeSet<String> = self.labels(kind).iter().cloned().collect();
        if let Some(f) = &mut self.filter {
            match kind {
                LabelKind::Category => f.categories = all,
                LabelKind::Region => f.regions = all,
            }
        }
        self.refilter();
    }

    /// Deselect all labels of a kind.
    pub fn select_none(&mut self, kind: LabelKind) {
        if let Some(f) = &mut self.filter {
            match kind {
                LabelKind::Category => f.categories.clear(),
                LabelKind::Region => f.regions.clear(),
            }
        }
        self.refilter();
    }

    /// The rows the charts draw: the view narrowed by the chart focus.
    pub fn chart_rows(&self) -> RecordSet {
        self.focus.apply(&self.view)
    }

    /// CSV bytes of the current view for download.
    pub fn download_bytes(&self) -> Result<Vec<u8>> {
        to_csv_bytes(&self.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use crate::data::sales::REQUIRED_COLUMNS;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state() -> DashboardState {
        let cache = DatasetCache::with_loader(|_| {
            let row = |d, c: &str, r: &str, rev: f64, units: f64, price: f64| {
                vec![
                    CellValue::Date(d),
                    CellValue::String(c.into()),
                    CellValue::String(r.into()),
                    CellValue::Float(rev),
                    CellValue::Float(units),
                    CellValue::Float(price),
                ]
            };
            SalesDataset::from_records(RecordSet::new(
                REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
                vec![
                    row(ymd(2020, 1, 1), "A", "X", 10.0, 1.0, 10.0),
                    row(ymd(2020, 2, 1), "B", "Y", 20.0, 2.0, 10.0),
                ],
            ))
        });
        let mut state = DashboardState::with_cache(cache);
        state.load(Path::new("sales.csv")).unwrap();
        state
    }

    #[test]
    fn loading_selects_everything() {
        let s = state();
        assert_eq!(s.view.len(), 2);
        assert_eq!(s.kpis.total_revenue, 30.0);
    }

    #[test]
    fn narrowing_to_first_row_matches_reference_scenario() {
        let mut s = state();
        s.set_date_range(ymd(2020, 1, 1), ymd(2020, 1, 31));
        s.toggle_label(LabelKind::Category, "B");
        s.toggle_label(LabelKind::Region, "Y");
        assert_eq!(s.view.len(), 1);
        assert_eq!(s.kpis.total_revenue, 10.0);
        assert_eq!(s.kpis.total_units, 1.0);
        assert_eq!(s.kpis.average_price, Some(10.0));
    }

    #[test]
    fn select_none_empties_the_view_and_kpis_stay_defined() {
        let mut s = state();
        s.select_none(LabelKind::Region);
        assert!(s.view.is_empty());
        assert_eq!(s.kpis.price_label(), "N/A");
        s.select_all(LabelKind::Region);
        assert_eq!(s.view.len(), 2);
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let mut s = state();
        s.toggle_label(LabelKind::Category, "Z");
        assert!(!s.filter.as_ref().unwrap().categories.contains("Z"));
    }

    #[test]
    fn focus_narrows_charts_only() {
        let mut s = state();
        s.focus.toggle(CATEGORY, "A");
        assert_eq!(s.chart_rows().len(), 1);
        assert_eq!(s.view.len(), 2);
    }

    #[test]
    fn download_is_the_filtered_view() {
        let mut s = state();
        s.toggle_label(LabelKind::Category, "A");
        let text = String::from_utf8(s.download_bytes().unwrap()).unwrap();
        assert_eq!(
            text,
            "date,category,region,revenue,units,price\n2020-02-01,B,Y,20.0,2.0,10.0\n"
        );
    }
}
