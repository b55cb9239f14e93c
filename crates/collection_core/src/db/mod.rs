//! Access to the SQLite file holding `record_collections`.
//!
//! # Invariants
//! - A connection handed out by `open_db*` carries `SCHEMA_VERSION`.
//! - Store failures reach callers as `DbError` without retries.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{schema_version, SCHEMA_VERSION};

pub type DbResult<T> = Result<T, DbError>;

/// The collection store could not serve a request.
#[derive(Debug)]
pub enum DbError {
    /// Any failure reported by SQLite: I/O, locking, missing table, bad SQL.
    Sqlite(rusqlite::Error),
    /// The file was stamped by a newer build than this one.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "collection store unavailable: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "collection store has schema {found}; this build reads up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Self::Sqlite(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
