use anyhow::{Context, Result};

use super::model::{CellValue, RecordSet};

/// File name offered for the filtered-data download.
pub const FILTERED_FILE_NAME: &str = "filtered_data.csv";

/// Encode a record set as UTF-8 CSV: header row, dates as `YYYY-MM-DD`,
/// floats always with a fractional part (`10.0`), nulls as empty fields.
pub fn to_csv_bytes(records: &RecordSet) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&records.columns)
        .context("writing CSV header")?;
    for (row_no, row) in records.rows.iter().enumerate() {
        let fields = (0..records.columns.len()).map(|c| {
            row.get(c).map(csv_field).unwrap_or_default()
        });
        writer
            .write_record(fields)
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    writer.into_inner().context("flushing CSV buffer")
}

fn csv_field(cell: &CellValue) -> String {
    match cell {
        // `Debug` keeps `.0` on whole values so they read back as floats.
        CellValue::Float(v) => format!("{v:?}"),
        other => other.to_string(),
    }
}
