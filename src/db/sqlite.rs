use std::path::Path;

use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, OpenFlags, params_from_iter};

use super::sql::{create_table, insert_row, quote_ident};
use super::{BackendError, DbError, TableStore};
use crate::data::model::{CellValue, ColumnKind, RecordSet, parse_date, DATE_FORMAT};

// ---------------------------------------------------------------------------
// SQLite backend
// ---------------------------------------------------------------------------

/// A table store over one SQLite database file.
///
/// Dates are stored as `YYYY-MM-DD` text in `DATE` columns and booleans as
/// 0/1 in `BOOLEAN` columns; the declared column type restores them on read.
pub struct SqliteStore {
    conn: Connection,
    label: String,
}

impl SqliteStore {
    /// Open an existing database file. A missing file is a connection error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| DbError::Connect {
            target: path.display().to_string(),
            source: BackendError::from(e),
        })?;
        Ok(Self::from_connection(conn, path.display().to_string()))
    }

    pub fn from_connection(conn: Connection, label: impl Into<String>) -> Self {
        SqliteStore {
            conn,
            label: label.into(),
        }
    }
}

impl TableStore for SqliteStore {
    fn describe(&self) -> String {
        format!("sqlite://{}", self.label)
    }

    fn read_table(&mut self, table: &str) -> Result<RecordSet, DbError> {
        let err = |e: rusqlite::Error| DbError::read(table, e);

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(table)))
            .map_err(err)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let declared: Vec<Option<String>> = stmt
            .columns()
            .iter()
            .map(|c| c.decl_type().map(str::to_ascii_uppercase))
            .collect();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([]).map_err(err)?;
        while let Some(row) = cursor.next().map_err(err)? {
            let mut cells = Vec::with_capacity(columns.len());
            for (i, decl) in declared.iter().enumerate() {
                let value = row.get_ref(i).map_err(err)?;
                cells.push(cell_from_sqlite(value, decl.as_deref()));
            }
            rows.push(cells);
        }

        log::debug!("read {} rows from {table}", rows.len());
        Ok(RecordSet::new(columns, rows))
    }

    fn replace_table(&mut self, table: &str, records: &RecordSet) -> Result<(), DbError> {
        let err = |e: rusqlite::Error| DbError::write(table, e);

        // Dropping the transaction without commit rolls everything back.
        let tx = self.conn.transaction().map_err(err)?;
        tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)), [])
            .map_err(err)?;
        tx.execute(&create_table(table, records, sqlite_type), [])
            .map_err(err)?;
        {
            let mut insert = tx
                .prepare(&insert_row(table, &records.columns, |n| format!("?{n}")))
                .map_err(err)?;
            for row in &records.rows {
                let values = (0..records.columns.len())
                    .map(|c| sqlite_value(row.get(c).unwrap_or(&CellValue::Null)));
                insert.execute(params_from_iter(values)).map_err(err)?;
            }
        }
        tx.commit().map_err(err)?;

        log::debug!("replaced {table} with {} rows", records.len());
        Ok(())
    }
}

fn sqlite_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Integer => "INTEGER",
        ColumnKind::Float => "REAL",
        ColumnKind::Bool => "BOOLEAN",
        ColumnKind::Date => "DATE",
        ColumnKind::Bytes => "BLOB",
        ColumnKind::Text => "TEXT",
    }
}

fn sqlite_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::String(s) => Value::Text(s.clone()),
        CellValue::Integer(i) => Value::Integer(*i),
        CellValue::Float(f) => Value::Real(*f),
        CellValue::Bool(b) => Value::Integer(i64::from(*b)),
        CellValue::Date(d) => Value::Text(d.format(DATE_FORMAT).to_string()),
        CellValue::Bytes(b) => Value::Blob(b.clone()),
        CellValue::Null => Value::Null,
    }
}

fn cell_from_sqlite(value: ValueRef<'_>, declared: Option<&str>) -> CellValue {
    match (value, declared) {
        (ValueRef::Null, _) => CellValue::Null,
        (ValueRef::Integer(i), Some("BOOLEAN" | "BOOL")) => CellValue::Bool(i != 0),
        (ValueRef::Integer(i), _) => CellValue::Integer(i),
        (ValueRef::Real(f), _) => CellValue::Float(f),
        (ValueRef::Text(t), decl) => {
            let text = String::from_utf8_lossy(t);
            match decl {
                Some("DATE") => parse_date(&text)
                    .map(CellValue::Date)
                    .unwrap_or_else(|| CellValue::String(text.into_owned())),
                _ => CellValue::String(text.into_owned()),
            }
        }
        (ValueRef::Blob(b), _) => CellValue::Bytes(b.to_vec()),
    }
}
