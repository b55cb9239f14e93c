//! The `record_collections` table definition and its version stamp.
//!
//! Rows are written by other systems; this crate only creates the table when
//! a store is empty so reads and tests have something to run against.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Version stamped into `PRAGMA user_version` once the table exists.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Reads the version stamp of an open store.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Creates the table on an unstamped store and leaves a current one alone.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    match schema_version(conn)? {
        SCHEMA_VERSION => Ok(()),
        0 => {
            let tx = conn.transaction()?;
            tx.execute_batch(SCHEMA_SQL)?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            tx.commit()?;
            Ok(())
        }
        found => Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        }),
    }
}
