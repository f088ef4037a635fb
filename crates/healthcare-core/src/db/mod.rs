//! Database layer for the records store.

mod catalog;
mod mappings;
mod records;
mod schema;
mod store;

pub use schema::*;
pub use store::*;

use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use thiserror::Error;

use crate::config::CoreConfig;
use crate::validation::ValidationErrors;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Sort a failed write into uniqueness, other constraint, or plain SQLite errors.
    pub(crate) fn from_write(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            if failure.code == ErrorCode::ConstraintViolation {
                let detail = message.clone().unwrap_or_else(|| failure.to_string());
                let unique = failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY;
                return if unique {
                    DbError::Duplicate(detail)
                } else {
                    DbError::Constraint(detail)
                };
            }
        }
        DbError::Sqlite(err)
    }
}

/// Database connection wrapper.
///
/// The single connection is opened once at startup and closed on drop.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Self::open_with_config(&CoreConfig::new(path.as_ref()))
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open_with_config(&CoreConfig::in_memory())
    }

    /// Open the database described by `config`.
    pub fn open_with_config(config: &CoreConfig) -> DbResult<Self> {
        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(config.database_path())?
        };
        conn.busy_timeout(config.busy_timeout())?;

        let db = Self { conn };
        db.initialize()?;
        tracing::info!(
            path = %config.database_path().display(),
            busy_timeout_ms = config.busy_timeout().as_millis() as u64,
            "records database opened"
        );
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
