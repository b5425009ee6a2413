use crate::data::model::{CellValue, ColumnKind, RecordSet};
use crate::db::{DbError, TableStore};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Success(String),
    Error(String),
}

impl StatusMessage {
    pub fn text(&self) -> &str {
        match self {
            StatusMessage::Success(s) | StatusMessage::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatusMessage::Error(_))
    }
}

// ---------------------------------------------------------------------------
// Editor session: one table, loaded once, saved wholesale
// ---------------------------------------------------------------------------

/// Edit state of one database table.
///
/// `loaded` mirrors what the store held at the last successful read or save;
/// `edited` is the working copy shown in the grid.
pub struct EditorSession {
    store: Option<Box<dyn TableStore>>,
    table: String,
    loaded: RecordSet,
    edited: RecordSet,
    status: Option<StatusMessage>,
    halted: bool,
}

impl EditorSession {
    /// Read `table` from `store`. A failed read yields a halted session that
    /// only carries the error.
    pub fn open(mut store: Box<dyn TableStore>, table: &str) -> Self {
        match store.read_table(table) {
            Ok(records) => {
                log::info!("loaded {} rows from '{table}'", records.len());
                let status = StatusMessage::Success(format!(
                    "Loaded {} rows from '{table}' ({}).",
                    records.len(),
                    store.describe()
                ));
                EditorSession {
                    store: Some(store),
                    table: table.to_string(),
                    loaded: records.clone(),
                    edited: records,
                    status: Some(status),
                    halted: false,
                }
            }
            Err(e) => Self::failed(table, &e),
        }
    }

    /// A halted session for a connection that could not be made.
    pub fn failed(table: &str, error: &DbError) -> Self {
        log::error!("cannot open '{table}': {error}");
        EditorSession {
            store: None,
            table: table.to_string(),
            loaded: RecordSet::default(),
            edited: RecordSet::default(),
            status: Some(StatusMessage::Error(format!(
                "Error connecting to or reading the table: {error}"
            ))),
            halted: true,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn records(&self) -> &RecordSet {
        &self.edited
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Whether the initial read failed; nothing else is possible then.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_dirty(&self) -> bool {
        self.edited != self.loaded
    }

    /// Replace one cell from grid text, parsed by the column's kind.
    pub fn set_cell(&mut self, row: usize, col: usize, text: &str) {
        if col >= self.edited.columns.len() {
            return;
        }
        let kind = self.loaded_kind(col);
        let width = self.edited.columns.len();
        if let Some(r) = self.edited.rows.get_mut(row) {
            r.resize(width, CellValue::Null);
            r[col] = CellValue::parse_as(text, kind);
        }
    }

    /// Append an all-null row.
    pub fn add_row(&mut self) {
        let width = self.edited.columns.len();
        self.edited.rows.push(vec![CellValue::Null; width]);
    }

    pub fn delete_row(&mut self, row: usize) {
        if row < self.edited.rows.len() {
            self.edited.rows.remove(row);
        }
    }

    /// Discard edits.
    pub fn reset(&mut self) {
        self.edited = self.loaded.clone();
    }

    /// Overwrite the table with the edited rows.
    ///
    /// On failure the edits stay in place and the error becomes the status.
    /// A halted session has nothing to save.
    pub fn save(&mut self) -> Result<(), DbError> {
        let Some(store) = self.store.as_mut() else {
            return Ok(());
        };
        match store.replace_table(&self.table, &self.edited) {
            Ok(()) => {
                log::info!("saved {} rows to '{}'", self.edited.len(), self.table);
                self.loaded = self.edited.clone();
                self.status = Some(StatusMessage::Success("Changes saved.".to_string()));
                Ok(())
            }
            Err(e) => {
                log::error!("saving '{}' failed: {e}", self.table);
                self.status = Some(StatusMessage::Error(format!("Error saving changes: {e}")));
                Err(e)
            }
        }
    }

    /// Column kind as loaded, so edits keep the column's type. Columns whose
    /// loaded cells are all null take the kind of the edited cells.
    fn loaded_kind(&self, col: usize) -> ColumnKind {
        if self.loaded.rows.iter().any(|r| r.get(col).is_some_and(|v| !v.is_null())) {
            self.loaded.column_kind(col)
        } else {
            self.edited.column_kind(col)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::db::BackendError;

    /// Tables kept in a shared map; writes fail while `reject_writes` is set.
    #[derive(Clone, Default)]
    struct MemoryStore {
        tables: Rc<RefCell<HashMap<String, RecordSet>>>,
        reject_writes: Rc<RefCell<bool>>,
    }

    fn rejected(table: &str) -> DbError {
        DbError::Write {
            table: table.to_string(),
            source: BackendError::from(rusqlite::Error::InvalidQuery),
        }
    }

    impl TableStore for MemoryStore {
        fn describe(&self) -> String {
            "memory".to_string()
        }

        fn read_table(&mut self, table: &str) -> Result<RecordSet, DbError> {
            self.tables.borrow().get(table).cloned().ok_or_else(|| DbError::Read {
                table: table.to_string(),
                source: BackendError::from(rusqlite::Error::InvalidQuery),
            })
        }

        fn replace_table(&mut self, table: &str, records: &RecordSet) -> Result<(), DbError> {
            if *self.reject_writes.borrow() {
                return Err(rejected(table));
            }
            self.tables.borrow_mut().insert(table.to_string(), records.clone());
            Ok(())
        }
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::default();
        store.tables.borrow_mut().insert(
            "temps".to_string(),
            RecordSet::new(
                vec!["country".into(), "avg".into()],
                vec![
                    vec![CellValue::String("Chile".into()), CellValue::Float(9.5)],
                    vec![CellValue::String("Peru".into()), CellValue::Float(19.0)],
                ],
            ),
        );
        store
    }

    #[test]
    fn read_failure_halts_the_session() {
        let session = EditorSession::open(Box::new(MemoryStore::default()), "temps");
        assert!(session.is_halted());
        assert!(session.status().is_some_and(StatusMessage::is_error));
        assert!(session.records().is_empty());
    }

    #[test]
    fn edits_are_typed_by_column() {
        let mut session = EditorSession::open(Box::new(seeded()), "temps");
        assert!(!session.is_halted());
        session.set_cell(0, 1, "10.25");
        session.set_cell(1, 1, "");
        assert_eq!(session.records().rows[0][1], CellValue::Float(10.25));
        assert_eq!(session.records().rows[1][1], CellValue::Null);
        assert!(session.is_dirty());
        session.reset();
        assert!(!session.is_dirty());
    }

    #[test]
    fn deleted_row_is_absent_after_save() {
        let store = seeded();
        let mut session = EditorSession::open(Box::new(store.clone()), "temps");
        session.delete_row(0);
        session.add_row();
        session.set_cell(1, 0, "Bolivia");
        session.save().unwrap();
        assert!(!session.is_dirty());

        let reread = store.clone().read_table("temps").unwrap();
        assert_eq!(reread.len(), 2);
        assert_eq!(reread.rows[0][0], CellValue::String("Peru".into()));
        assert_eq!(reread.rows[1], vec![CellValue::String("Bolivia".into()), CellValue::Null]);
    }

    #[test]
    fn failed_save_keeps_edits_and_reports() {
        let store = seeded();
        let mut session = EditorSession::open(Box::new(store.clone()), "temps");
        session.delete_row(1);
        *store.reject_writes.borrow_mut() = true;

        assert!(session.save().is_err());
        assert_eq!(session.records().len(), 1);
        assert!(session.is_dirty());
        assert!(session.status().is_some_and(|s| s.text().starts_with("Error saving changes")));
        assert_eq!(store.tables.borrow()["temps"].len(), 2);
    }
}
