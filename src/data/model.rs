use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a record set
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value covering what CSV files and SQL tables hold.
/// Labels end up in `BTreeSet`s downstream, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    /// Binary column contents (SQLite BLOB, PostgreSQL BYTEA).
    Bytes(Vec<u8>),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
                Bytes(_) => 6,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Bytes(a), Bytes(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            CellValue::Bytes(b) => write!(f, "{BYTES_PREFIX}{}", hex::encode(b)),
            CellValue::Null => Ok(()),
        }
    }
}

/// Calendar date format used for parsing and for every serialized date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text form of binary cells is `\x` followed by lowercase hex, as in
/// PostgreSQL's `bytea` output.
pub const BYTES_PREFIX: &str = "\\x";

impl CellValue {
    /// Interpret the value as an `f64` for aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// The kind of this value, `None` for null.
    pub fn kind(&self) -> Option<ColumnKind> {
        match self {
            CellValue::String(_) => Some(ColumnKind::Text),
            CellValue::Integer(_) => Some(ColumnKind::Integer),
            CellValue::Float(_) => Some(ColumnKind::Float),
            CellValue::Bool(_) => Some(ColumnKind::Bool),
            CellValue::Date(_) => Some(ColumnKind::Date),
            CellValue::Bytes(_) => Some(ColumnKind::Bytes),
            CellValue::Null => None,
        }
    }

    /// Guess the type of a raw text field (CSV cell or edited grid cell).
    pub fn guess(s: &str) -> CellValue {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        if let Some(d) = parse_date(s) {
            return CellValue::Date(d);
        }
        CellValue::String(s.to_string())
    }

    /// Parse text as a value of `kind`. Empty text is null; text that does not
    /// parse as `kind` is kept as a string cell.
    pub fn parse_as(s: &str, kind: ColumnKind) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        let parsed = match kind {
            ColumnKind::Integer => s.parse::<i64>().ok().map(CellValue::Integer),
            ColumnKind::Float => s.parse::<f64>().ok().map(CellValue::Float),
            ColumnKind::Bool => match s.to_ascii_lowercase().as_str() {
                "true" => Some(CellValue::Bool(true)),
                "false" => Some(CellValue::Bool(false)),
                _ => None,
            },
            ColumnKind::Date => parse_date(s).map(CellValue::Date),
            ColumnKind::Bytes => s
                .strip_prefix(BYTES_PREFIX)
                .and_then(|h| hex::decode(h).ok())
                .map(CellValue::Bytes),
            ColumnKind::Text => None,
        };
        parsed.unwrap_or_else(|| CellValue::String(s.to_string()))
    }
}

/// Parse `YYYY-MM-DD`, tolerating a trailing time component (`T...` or ` ...`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let day = s.get(..10)?;
    let rest = &s[10..];
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return None;
    }
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

// ---------------------------------------------------------------------------
// ColumnKind – inferred type of a column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Date,
    Bytes,
    Text,
}

impl ColumnKind {
    /// Common kind of two kinds: integers widen to floats, anything else is text.
    fn unify(self, other: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Text,
        }
    }
}

// ---------------------------------------------------------------------------
// RecordSet – an ordered table of rows
// ---------------------------------------------------------------------------

static NULL: CellValue = CellValue::Null;

/// One row; cells are aligned with [`RecordSet::columns`].
pub type Row = Vec<CellValue>;

/// An in-memory table: ordered column names plus ordered rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        RecordSet { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the record set has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row`, `col`; missing cells of short rows read as null.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&NULL)
    }

    /// Kind of a column from its non-null cells. All-null columns are text.
    pub fn column_kind(&self, col: usize) -> ColumnKind {
        self.rows
            .iter()
            .filter_map(|r| r.get(col).and_then(CellValue::kind))
            .reduce(ColumnKind::unify)
            .unwrap_or(ColumnKind::Text)
    }

    pub fn column_kinds(&self) -> Vec<ColumnKind> {
        (0..self.columns.len()).map(|c| self.column_kind(c)).collect()
    }

    /// Sorted distinct non-null values of a column.
    pub fn unique_values(&self, col: usize) -> BTreeSet<CellValue> {
        self.rows
            .iter()
            .filter_map(|r| r.get(col))
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }

    /// Copy of the rows at `indices`, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> RecordSet {
        RecordSet {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn guess_recognises_each_kind() {
        assert_eq!(CellValue::guess(""), CellValue::Null);
        assert_eq!(CellValue::guess("42"), CellValue::Integer(42));
        assert_eq!(CellValue::guess("2.5"), CellValue::Float(2.5));
        assert_eq!(CellValue::guess("true"), CellValue::Bool(true));
        assert_eq!(CellValue::guess("2020-01-31"), CellValue::Date(ymd(2020, 1, 31)));
        assert_eq!(
            CellValue::guess("Electronics"),
            CellValue::String("Electronics".into())
        );
    }

    #[test]
    fn parse_date_drops_time_component() {
        assert_eq!(parse_date("2021-03-04 00:00:00"), Some(ymd(2021, 3, 4)));
        assert_eq!(parse_date("2021-03-04T12:30:00"), Some(ymd(2021, 3, 4)));
        assert_eq!(parse_date("2021-03-04x"), None);
        assert_eq!(parse_date("04/03/2021"), None);
    }

    #[test]
    fn parse_as_falls_back_to_text() {
        assert_eq!(CellValue::parse_as(" 7 ", ColumnKind::Integer), CellValue::Integer(7));
        assert_eq!(CellValue::parse_as("7", ColumnKind::Float), CellValue::Float(7.0));
        assert_eq!(CellValue::parse_as("TRUE", ColumnKind::Bool), CellValue::Bool(true));
        assert_eq!(
            CellValue::parse_as("seven", ColumnKind::Integer),
            CellValue::String("seven".into())
        );
        assert_eq!(CellValue::parse_as("", ColumnKind::Date), CellValue::Null);
    }

    #[test]
    fn bytes_display_as_hex_and_parse_back() {
        let blob = CellValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(blob.to_string(), "\\xdeadbeef");
        assert_eq!(CellValue::parse_as("\\xdeadbeef", ColumnKind::Bytes), blob);
        assert_eq!(
            CellValue::parse_as("deadbeef", ColumnKind::Bytes),
            CellValue::String("deadbeef".into())
        );
    }

    #[test]
    fn column_kind_widens_and_ignores_nulls() {
        let rs = RecordSet::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![
                vec![
                    CellValue::Integer(1),
                    CellValue::Integer(1),
                    CellValue::Null,
                    CellValue::Date(ymd(2020, 1, 1)),
                ],
                vec![
                    CellValue::Float(1.5),
                    CellValue::String("x".into()),
                    CellValue::Null,
                    CellValue::Null,
                ],
            ],
        );
        assert_eq!(
            rs.column_kinds(),
            vec![
                ColumnKind::Float,
                ColumnKind::Text,
                ColumnKind::Text,
                ColumnKind::Date
            ]
        );
    }

    #[test]
    fn unique_values_are_sorted_and_skip_nulls() {
        let rs = RecordSet::new(
            vec!["cat".into()],
            vec![
                vec![CellValue::String("b".into())],
                vec![CellValue::Null],
                vec![CellValue::String("a".into())],
                vec![CellValue::String("b".into())],
            ],
        );
        let labels: Vec<String> = rs.unique_values(0).iter().map(|v| v.to_string()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }
}
