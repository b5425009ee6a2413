use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{CellValue, RecordSet, parse_date};
use super::sales::{self, SalesColumns, SalesDataset};

// ---------------------------------------------------------------------------
// Sales CSV loader
// ---------------------------------------------------------------------------

/// Load a sales CSV.
///
/// CSV layout: header row with column names, at least
/// `date, category, region, revenue, units, price` in any order.
/// * `date` must be `YYYY-MM-DD` (a trailing time component is dropped)
/// * `category` / `region` are kept as text labels
/// * `revenue` / `units` / `price` are parsed as floats
///
/// Empty cells become nulls. Other columns are carried through with their
/// type guessed.
pub fn load_sales_csv(path: &Path) -> Result<SalesDataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let records = read_sales_records(file)?;
    SalesDataset::from_records(records)
        .with_context(|| format!("reading sales data from {}", path.display()))
}

fn read_sales_records<R: Read>(input: R) -> Result<RecordSet> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = read_headers(&mut reader)?;
    let header_only = RecordSet::new(headers.clone(), Vec::new());
    let cols = SalesColumns::resolve(&header_only).context("CSV is not a sales table")?;

    let records = read_rows(reader, headers, |col_idx, raw, row_no| {
        sales_cell(&cols, col_idx, raw, row_no)
    })?;
    log::debug!(
        "read {} sales rows with columns {:?}",
        records.len(),
        records.columns
    );
    Ok(records)
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>) -> Result<Vec<String>> {
    Ok(reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect())
}

fn read_rows<R: Read>(
    mut reader: csv::Reader<R>,
    headers: Vec<String>,
    mut cell: impl FnMut(usize, &str, usize) -> Result<CellValue>,
) -> Result<RecordSet> {
    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut row = Vec::with_capacity(headers.len());
        for col_idx in 0..headers.len() {
            row.push(cell(col_idx, record.get(col_idx).unwrap_or(""), row_no)?);
        }
        rows.push(row);
    }
    Ok(RecordSet::new(headers, rows))
}

fn sales_cell(cols: &SalesColumns, col_idx: usize, raw: &str, row_no: usize) -> Result<CellValue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(CellValue::Null);
    }
    if col_idx == cols.date {
        let date = parse_date(raw)
            .with_context(|| format!("CSV row {row_no}: '{raw}' is not a date"))?;
        return Ok(CellValue::Date(date));
    }
    if col_idx == cols.category || col_idx == cols.region {
        return Ok(CellValue::String(raw.to_string()));
    }
    if [cols.revenue, cols.units, cols.price].contains(&col_idx) {
        let name = match col_idx {
            c if c == cols.revenue => sales::REVENUE,
            c if c == cols.units => sales::UNITS,
            _ => sales::PRICE,
        };
        let v = raw
            .parse::<f64>()
            .with_context(|| format!("CSV row {row_no}, {name}: '{raw}' is not a number"))?;
        return Ok(CellValue::Float(v));
    }
    Ok(CellValue::guess(raw))
}

// ---------------------------------------------------------------------------
// Generic CSV reader
// ---------------------------------------------------------------------------

/// Parse CSV bytes (header row + records) into a record set.
///
/// A sales header gets the same typing as [`load_sales_csv`], so a
/// downloaded view reads back equal to the view. Any other table has the
/// type of every cell guessed.
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<RecordSet> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = read_headers(&mut reader)?;
    let header_only = RecordSet::new(headers.clone(), Vec::new());

    match SalesColumns::resolve(&header_only) {
        Ok(cols) => read_rows(reader, headers, |col_idx, raw, row_no| {
            sales_cell(&cols, col_idx, raw, row_no)
        }),
        Err(_) => read_rows(reader, headers, |_, raw, _| Ok(CellValue::guess(raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
date,category,region,revenue,units,price,channel
2020-01-01,A,X,10,1,10,web
2020-02-01 00:00:00,B,Y,20,2,10,
";

    #[test]
    fn sales_columns_are_typed() {
        let rs = read_sales_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rs.len(), 2);
        assert_eq!(
            rs.rows[1][0],
            CellValue::Date(NaiveDate::from_ymd_opt(2020, 2, 1).unwrap())
        );
        assert_eq!(rs.rows[0][1], CellValue::String("A".into()));
        assert_eq!(rs.rows[0][3], CellValue::Float(10.0));
        assert_eq!(rs.rows[0][6], CellValue::String("web".into()));
        assert_eq!(rs.rows[1][6], CellValue::Null);
    }

    #[test]
    fn numeric_looking_labels_stay_text() {
        let csv = "date,category,region,revenue,units,price\n2020-01-01,1,2,1,1,1\n";
        let rs = read_sales_records(csv.as_bytes()).unwrap();
        assert_eq!(rs.rows[0][1], CellValue::String("1".into()));
    }

    #[test]
    fn bad_date_names_the_row() {
        let csv = "date,category,region,revenue,units,price\nsoon,A,X,1,1,1\n";
        let err = read_sales_records(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("'soon' is not a date"), "{err:#}");
    }

    #[test]
    fn bad_number_names_the_column() {
        let csv = "date,category,region,revenue,units,price\n2020-01-01,A,X,lots,1,1\n";
        let err = read_sales_records(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("revenue"), "{err:#}");
    }

    #[test]
    fn sales_bytes_keep_label_and_number_types() {
        let csv = "date,category,region,revenue,units,price\n2020-01-01,2023,true,10.0,1.0,10.0\n";
        let rs = parse_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(
            rs.rows[0][1..],
            [
                CellValue::String("2023".into()),
                CellValue::String("true".into()),
                CellValue::Float(10.0),
                CellValue::Float(1.0),
                CellValue::Float(10.0),
            ]
        );
    }

    #[test]
    fn other_bytes_are_guessed() {
        let rs = parse_csv_bytes(b"id,flag\n2023,true\n").unwrap();
        assert_eq!(rs.rows[0], vec![CellValue::Integer(2023), CellValue::Bool(true)]);
    }

    #[test]
    fn missing_required_column_fails() {
        let csv = "date,category,revenue\n2020-01-01,A,1\n";
        assert!(read_sales_records(csv.as_bytes()).is_err());
    }
}
