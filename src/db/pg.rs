use chrono::NaiveDate;
use postgres::types::{ToSql, Type};
use postgres::{Client, NoTls, Row};

use super::config::{ConnectionConfig, Driver};
use super::sql::{create_table, insert_row, quote_ident};
use super::{BackendError, DbError, TableStore};
use crate::data::model::{CellValue, ColumnKind, RecordSet};

// ---------------------------------------------------------------------------
// PostgreSQL backend
// ---------------------------------------------------------------------------

/// A table store over one PostgreSQL database.
pub struct PostgresStore {
    client: Client,
    target: String,
}

impl PostgresStore {
    pub fn connect(config: &ConnectionConfig) -> Result<Self, DbError> {
        let mut pg = postgres::Config::new();
        pg.host(config.host.as_deref().unwrap_or("localhost"))
            .port(config.port.unwrap_or(Driver::POSTGRES_DEFAULT_PORT))
            .dbname(&config.database);
        if let Some(user) = &config.user {
            pg.user(user);
        }
        if let Some(password) = &config.password {
            pg.password(password);
        }

        let target = config.to_string();
        let client = pg.connect(NoTls).map_err(|e| DbError::Connect {
            target: target.clone(),
            source: BackendError::from(e),
        })?;
        Ok(PostgresStore { client, target })
    }
}

impl TableStore for PostgresStore {
    fn describe(&self) -> String {
        self.target.clone()
    }

    fn read_table(&mut self, table: &str) -> Result<RecordSet, DbError> {
        let err = |e: postgres::Error| DbError::read(table, e);
        let quoted = quote_ident(table);

        // Types without a native mapping are read as text.
        let shape = self
            .client
            .prepare(&format!("SELECT * FROM {quoted}"))
            .map_err(err)?;
        let columns: Vec<String> = shape.columns().iter().map(|c| c.name().to_string()).collect();
        if columns.is_empty() {
            return Ok(RecordSet::default());
        }
        let projection: Vec<String> = shape
            .columns()
            .iter()
            .map(|c| {
                let name = quote_ident(c.name());
                if is_native(c.type_()) {
                    name
                } else {
                    format!("{name}::text AS {name}")
                }
            })
            .collect();

        let rows = self
            .client
            .query(&format!("SELECT {} FROM {quoted}", projection.join(", ")), &[])
            .map_err(err)?;
        let rows = rows
            .iter()
            .map(|row| {
                (0..columns.len())
                    .map(|i| cell_from_pg(row, i))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, postgres::Error>>()
            .map_err(err)?;

        log::debug!("read {} rows from {table}", rows.len());
        Ok(RecordSet::new(columns, rows))
    }

    fn replace_table(&mut self, table: &str, records: &RecordSet) -> Result<(), DbError> {
        let err = |e: postgres::Error| DbError::write(table, e);
        let kinds = records.column_kinds();

        // Dropping the transaction without commit rolls everything back.
        let mut tx = self.client.transaction().map_err(err)?;
        tx.batch_execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
            .map_err(err)?;
        tx.batch_execute(&create_table(table, records, pg_type))
            .map_err(err)?;
        let insert = tx
            .prepare(&insert_row(table, &records.columns, |n| format!("${n}")))
            .map_err(err)?;
        for row in &records.rows {
            let params: Vec<PgParam> = kinds
                .iter()
                .enumerate()
                .map(|(c, kind)| pg_param(row.get(c).unwrap_or(&CellValue::Null), *kind))
                .collect();
            let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(PgParam::as_sql).collect();
            tx.execute(&insert, &refs).map_err(err)?;
        }
        tx.commit().map_err(err)?;

        log::debug!("replaced {table} with {} rows", records.len());
        Ok(())
    }
}

fn pg_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Integer => "BIGINT",
        ColumnKind::Float => "DOUBLE PRECISION",
        ColumnKind::Bool => "BOOLEAN",
        ColumnKind::Date => "DATE",
        ColumnKind::Bytes => "BYTEA",
        ColumnKind::Text => "TEXT",
    }
}

fn is_native(ty: &Type) -> bool {
    [
        Type::BOOL,
        Type::INT2,
        Type::INT4,
        Type::INT8,
        Type::FLOAT4,
        Type::FLOAT8,
        Type::DATE,
        Type::BYTEA,
        Type::TEXT,
        Type::VARCHAR,
        Type::BPCHAR,
        Type::NAME,
    ]
    .contains(ty)
}

/// A bound insert parameter, typed after its target column.
#[derive(Debug, Clone, PartialEq)]
enum PgParam {
    Integer(Option<i64>),
    Float(Option<f64>),
    Bool(Option<bool>),
    Date(Option<NaiveDate>),
    Bytes(Option<Vec<u8>>),
    Text(Option<String>),
}

impl PgParam {
    fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            PgParam::Integer(v) => v,
            PgParam::Float(v) => v,
            PgParam::Bool(v) => v,
            PgParam::Date(v) => v,
            PgParam::Bytes(v) => v,
            PgParam::Text(v) => v,
        }
    }
}

/// Parameter for a cell going into a column of `kind`; cells of another kind
/// are bound as null, except in text columns where they are rendered.
fn pg_param(cell: &CellValue, kind: ColumnKind) -> PgParam {
    match kind {
        ColumnKind::Integer => PgParam::Integer(match cell {
            CellValue::Integer(i) => Some(*i),
            _ => None,
        }),
        ColumnKind::Float => PgParam::Float(cell.as_f64()),
        ColumnKind::Bool => PgParam::Bool(match cell {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }),
        ColumnKind::Date => PgParam::Date(cell.as_date()),
        ColumnKind::Bytes => PgParam::Bytes(match cell {
            CellValue::Bytes(b) => Some(b.clone()),
            _ => None,
        }),
        ColumnKind::Text => PgParam::Text((!cell.is_null()).then(|| cell.to_string())),
    }
}

fn cell_from_pg(row: &Row, i: usize) -> Result<CellValue, postgres::Error> {
    let ty = row.columns()[i].type_().clone();
    let cell = if ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(i)?.map(CellValue::Bool)
    } else if ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(i)?.map(|v| CellValue::Integer(v.into()))
    } else if ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(i)?.map(|v| CellValue::Integer(v.into()))
    } else if ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(i)?.map(CellValue::Integer)
    } else if ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(i)?.map(|v| CellValue::Float(v.into()))
    } else if ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(i)?.map(CellValue::Float)
    } else if ty == Type::DATE {
        row.try_get::<_, Option<NaiveDate>>(i)?.map(CellValue::Date)
    } else if ty == Type::BYTEA {
        row.try_get::<_, Option<Vec<u8>>>(i)?.map(CellValue::Bytes)
    } else {
        row.try_get::<_, Option<String>>(i)?.map(CellValue::String)
    };
    Ok(cell.unwrap_or(CellValue::Null))
}
