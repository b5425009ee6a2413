//! SQL text shared by the backends.

use crate::data::model::{ColumnKind, RecordSet};

/// Double-quote an identifier, doubling embedded quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `CREATE TABLE` for `records`, column types named by `type_name`.
pub(crate) fn create_table(
    table: &str,
    records: &RecordSet,
    type_name: fn(ColumnKind) -> &'static str,
) -> String {
    let columns: Vec<String> = records
        .columns
        .iter()
        .zip(records.column_kinds())
        .map(|(name, kind)| format!("{} {}", quote_ident(name), type_name(kind)))
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(table), columns.join(", "))
}

/// `INSERT` with one placeholder per column, rendered by `placeholder(n)`
/// for the 1-based position `n`.
pub(crate) fn insert_row(table: &str, columns: &[String], placeholder: fn(usize) -> String) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let params: Vec<String> = (1..=columns.len()).map(placeholder).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names.join(", "),
        params.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("temps"), "\"temps\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn create_uses_inferred_kinds() {
        let rs = RecordSet::new(
            vec!["dt".into(), "avg".into()],
            vec![vec![CellValue::String("x".into()), CellValue::Float(1.5)]],
        );
        let sql = create_table("t", &rs, |k| match k {
            ColumnKind::Float => "REAL",
            _ => "TEXT",
        });
        assert_eq!(sql, "CREATE TABLE \"t\" (\"dt\" TEXT, \"avg\" REAL)");
    }

    #[test]
    fn insert_numbers_placeholders() {
        let sql = insert_row("t", &["a".to_string(), "b".to_string()], |n| format!("${n}"));
        assert_eq!(sql, "INSERT INTO \"t\" (\"a\", \"b\") VALUES ($1, $2)");
    }
}
