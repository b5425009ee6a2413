//! Relational table access for the table editor.
//!
//! A [`TableStore`] reads one table fully into a [`RecordSet`] and replaces a
//! table wholesale. Backends: SQLite and PostgreSQL.

mod config;
mod pg;
mod sql;
mod sqlite;

use thiserror::Error;

use crate::data::model::RecordSet;

pub use self::config::{ConnectionConfig, Driver};
pub use self::pg::PostgresStore;
pub use self::sqlite::SqliteStore;

/// Driver-level failure underneath a [`DbError`].
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Postgres(#[from] postgres::Error),
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid connection string '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("no database given: set a connection URL or a database name")]
    MissingDatabase,
    #[error("unsupported database driver '{0}'")]
    UnsupportedDriver(String),
    #[error("could not connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: BackendError,
    },
    #[error("could not read table '{table}': {source}")]
    Read {
        table: String,
        #[source]
        source: BackendError,
    },
    #[error("could not write table '{table}': {source}")]
    Write {
        table: String,
        #[source]
        source: BackendError,
    },
}

impl DbError {
    fn read(table: &str, source: impl Into<BackendError>) -> Self {
        DbError::Read {
            table: table.to_string(),
            source: source.into(),
        }
    }

    fn write(table: &str, source: impl Into<BackendError>) -> Self {
        DbError::Write {
            table: table.to_string(),
            source: source.into(),
        }
    }
}

/// A relational store holding named tables.
pub trait TableStore {
    /// Human-readable target, safe to log (no password).
    fn describe(&self) -> String;

    /// Read every row of `table`.
    fn read_table(&mut self, table: &str) -> Result<RecordSet, DbError>;

    /// Drop `table` and recreate it from `records`, in one transaction.
    /// On error nothing is changed.
    fn replace_table(&mut self, table: &str, records: &RecordSet) -> Result<(), DbError>;
}

/// Connect to the store addressed by `config`.
pub fn open_store(config: &ConnectionConfig) -> Result<Box<dyn TableStore>, DbError> {
    log::debug!("connecting to {config}");
    let store: Box<dyn TableStore> = match config.driver {
        Driver::Sqlite => Box::new(SqliteStore::open(&config.database)?),
        Driver::Postgres => Box::new(PostgresStore::connect(config)?),
    };
    log::info!("connected to {}", store.describe());
    Ok(store)
}
