use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::model::{CellValue, RecordSet};

/// Columns every sales CSV must carry.
pub const DATE: &str = "date";
pub const CATEGORY: &str = "category";
pub const REGION: &str = "region";
pub const REVENUE: &str = "revenue";
pub const UNITS: &str = "units";
pub const PRICE: &str = "price";

pub const REQUIRED_COLUMNS: [&str; 6] = [DATE, CATEGORY, REGION, REVENUE, UNITS, PRICE];

/// Positions of the sales columns inside the record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesColumns {
    pub date: usize,
    pub category: usize,
    pub region: usize,
    pub revenue: usize,
    pub units: usize,
    pub price: usize,
}

impl SalesColumns {
    /// Resolve the sales columns by name.
    pub fn resolve(records: &RecordSet) -> Result<Self> {
        let find = |name: &str| {
            records
                .column_index(name)
                .with_context(|| format!("missing '{name}' column"))
        };
        Ok(SalesColumns {
            date: find(DATE)?,
            category: find(CATEGORY)?,
            region: find(REGION)?,
            revenue: find(REVENUE)?,
            units: find(UNITS)?,
            price: find(PRICE)?,
        })
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – loaded sales records plus their label sets
// ---------------------------------------------------------------------------

/// The loaded sales table with label sets fixed at load time.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    pub records: RecordSet,
    pub columns: SalesColumns,
    /// Distinct categories, sorted.
    pub categories: Vec<String>,
    /// Distinct regions, sorted.
    pub regions: Vec<String>,
    /// Earliest and latest date present, `None` when no row has a date.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl SalesDataset {
    pub fn from_records(records: RecordSet) -> Result<Self> {
        let columns = SalesColumns::resolve(&records)?;
        let labels = |col: usize| -> Vec<String> {
            records
                .unique_values(col)
                .into_iter()
                .map(|v| v.to_string())
                .collect()
        };
        let categories = labels(columns.category);
        let regions = labels(columns.region);

        let mut dates = records
            .rows
            .iter()
            .filter_map(|r| r.get(columns.date).and_then(CellValue::as_date));
        let date_bounds = dates.next().map(|first| {
            dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)))
        });

        Ok(SalesDataset {
            records,
            columns,
            categories,
            regions,
            date_bounds,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::String(s.into())
    }

    #[test]
    fn labels_and_bounds_come_from_the_data() {
        let d1 = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let records = RecordSet::new(
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            vec![
                vec![CellValue::Date(d1), text("Toys"), text("West"), CellValue::Float(1.0), CellValue::Float(1.0), CellValue::Float(1.0)],
                vec![CellValue::Date(d2), text("Books"), text("East"), CellValue::Float(1.0), CellValue::Float(1.0), CellValue::Float(1.0)],
                vec![CellValue::Null, text("Toys"), CellValue::Null, CellValue::Null, CellValue::Null, CellValue::Null],
            ],
        );
        let ds = SalesDataset::from_records(records).unwrap();
        assert_eq!(ds.categories, vec!["Books", "Toys"]);
        assert_eq!(ds.regions, vec!["East", "West"]);
        assert_eq!(ds.date_bounds, Some((d2, d1)));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let records = RecordSet::new(vec!["date".into(), "category".into()], Vec::new());
        let err = SalesDataset::from_records(records).unwrap_err();
        assert!(err.to_string().contains("'region'"), "{err}");
    }
}
