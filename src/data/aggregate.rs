use super::model::RecordSet;
use super::sales::{PRICE, REVENUE, UNITS};

// ---------------------------------------------------------------------------
// Headline metrics of a filtered view
// ---------------------------------------------------------------------------

/// The three KPI tiles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_units: f64,
    /// Mean price; `None` when no row carries a price.
    pub average_price: Option<f64>,
}

impl Kpis {
    /// Compute totals and mean over `view`, skipping nulls.
    pub fn compute(view: &RecordSet) -> Self {
        Kpis {
            total_revenue: column_values(view, REVENUE).sum(),
            total_units: column_values(view, UNITS).sum(),
            average_price: mean(column_values(view, PRICE)),
        }
    }

    pub fn revenue_label(&self) -> String {
        format!("${}", format_thousands(self.total_revenue))
    }

    pub fn units_label(&self) -> String {
        format_thousands(self.total_units)
    }

    pub fn price_label(&self) -> String {
        match self.average_price {
            Some(p) if p.is_finite() => format!("${p:.2}"),
            _ => "N/A".to_string(),
        }
    }
}

fn column_values<'a>(view: &'a RecordSet, name: &str) -> impl Iterator<Item = f64> + 'a {
    let col = view.column_index(name);
    view.rows
        .iter()
        .filter_map(move |r| col.and_then(|c| r.get(c)).and_then(|v| v.as_f64()))
        .filter(|v| !v.is_nan())
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Round to a whole number and group digits in threes: `1234567.6` → `1,234,568`.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && rounded != "0" {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn view(rows: &[(f64, f64, Option<f64>)]) -> RecordSet {
        RecordSet::new(
            vec!["revenue".into(), "units".into(), "price".into()],
            rows.iter()
                .map(|&(r, u, p)| {
                    vec![
                        CellValue::Float(r),
                        CellValue::Float(u),
                        p.map_or(CellValue::Null, CellValue::Float),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn empty_view_sums_to_zero_and_has_no_mean() {
        let k = Kpis::compute(&view(&[]));
        assert_eq!(k.total_revenue, 0.0);
        assert_eq!(k.total_units, 0.0);
        assert_eq!(k.average_price, None);
        assert_eq!(k.price_label(), "N/A");
        assert_eq!(k.revenue_label(), "$0");
    }

    #[test]
    fn mean_skips_null_prices() {
        let k = Kpis::compute(&view(&[(10.0, 1.0, Some(10.0)), (20.0, 2.0, None), (5.0, 3.0, Some(20.0))]));
        assert_eq!(k.total_revenue, 35.0);
        assert_eq!(k.total_units, 6.0);
        assert_eq!(k.average_price, Some(15.0));
        assert_eq!(k.price_label(), "$15.00");
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1234567.6), "1,234,568");
        assert_eq!(format_thousands(-4321.0), "-4,321");
        assert_eq!(format_thousands(f64::NAN), "N/A");
    }
}
