/// Data layer: core types, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///   sales.csv
///       │
///       ▼
///   ┌──────────┐
///   │  cache   │  path → Arc<SalesDataset>, loads via `loader`
///   └──────────┘
///       │
///       ▼
///   ┌──────────────┐
///   │ SalesDataset │  RecordSet + sorted category/region labels
///   └──────────────┘
///       │
///       ▼
///   ┌──────────┐
///   │  filter  │  date range ∧ categories ∧ regions → filtered view
///   └──────────┘
///       │
///       ├──► aggregate  (KPIs)
///       ├──► series     (chart data, chart focus)
///       └──► export     (CSV bytes for download)
/// ```

pub mod aggregate;
pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod sales;
pub mod series;
