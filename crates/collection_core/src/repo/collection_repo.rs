//! Collection repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide read and soft-delete APIs over `record_collections`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Read paths reject corrupt persisted state instead of masking it.
//! - Find-many results are either complete or an error; never partial.
//! - `delete_by_id` never hard-deletes and never checks visibility.

use crate::clock::{Clock, SystemClock};
use crate::db::{schema_version, DbError, SCHEMA_VERSION};
use crate::model::collection::{CollectionId, CollectionRecord, RecordCollection};
use crate::policy::visibility::{filters_for, VisibilityContext};
use crate::repo::reconstruct::ReconstructionRegistry;
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const COLLECTIONS_TABLE: &str = "record_collections";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "type",
    "owning_table",
    "deleted",
    "modified_at",
    "created_at",
    "hidden",
    "visible_from",
    "visible_until",
    "title",
    "description",
    "language_id",
    "item_count",
];

const COLLECTION_SELECT_SQL: &str = "SELECT
    id,
    type,
    owning_table,
    deleted,
    modified_at,
    created_at,
    hidden,
    visible_from,
    visible_until,
    title,
    description,
    language_id,
    item_count
FROM record_collections";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for collection queries and reconstruction.
#[derive(Debug)]
pub enum RepoError {
    /// Store failure, propagated as-is.
    Db(DbError),
    /// Row carries a type tag with no registered constructor.
    UnknownCollectionType {
        id: CollectionId,
        type_tag: String,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownCollectionType { id, type_tag } => write!(
                f,
                "unknown record collection type `{type_tag}` on collection {id}"
            ),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted collection data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read and soft-delete operations over record collections.
///
/// Every find takes the caller's `VisibilityContext` explicitly.
pub trait CollectionRepository {
    fn find_by_id(
        &self,
        context: VisibilityContext,
        id: CollectionId,
    ) -> RepoResult<Option<Box<dyn RecordCollection>>>;
    fn find_all(&self, context: VisibilityContext) -> RepoResult<Vec<Box<dyn RecordCollection>>>;
    fn find_by_owning_table(
        &self,
        context: VisibilityContext,
        table_name: &str,
    ) -> RepoResult<Vec<Box<dyn RecordCollection>>>;
    fn find_by_type(
        &self,
        context: VisibilityContext,
        type_tag: &str,
    ) -> RepoResult<Vec<Box<dyn RecordCollection>>>;
    fn find_by_type_and_owning_table(
        &self,
        context: VisibilityContext,
        type_tag: &str,
        table_name: &str,
    ) -> RepoResult<Vec<Box<dyn RecordCollection>>>;
    fn delete_by_id(&self, id: CollectionId) -> RepoResult<()>;
}

/// SQLite-backed collection repository.
pub struct SqliteCollectionRepository<'conn, C = SystemClock> {
    conn: &'conn Connection,
    registry: ReconstructionRegistry,
    clock: C,
}

impl<'conn> SqliteCollectionRepository<'conn, SystemClock> {
    /// Wraps a connection without checking its schema.
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            registry: ReconstructionRegistry::default(),
            clock: SystemClock,
        }
    }

    /// Wraps a connection after checking its schema stamp and that the
    /// collection table has every column reads depend on.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        check_schema(conn)?;
        Ok(Self::new(conn))
    }
}

impl<'conn, C: Clock> SqliteCollectionRepository<'conn, C> {
    /// Replaces the time source used for visibility windows and delete
    /// timestamps.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> SqliteCollectionRepository<'conn, C2> {
        SqliteCollectionRepository {
            conn: self.conn,
            registry: self.registry,
            clock,
        }
    }

    pub fn with_registry(mut self, registry: ReconstructionRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn query_records(
        &self,
        context: VisibilityContext,
        conditions: &[(&'static str, Value)],
    ) -> RepoResult<Vec<CollectionRecord>> {
        let filter = filters_for(context, self.clock.now_epoch_secs());
        let mut sql = format!("{COLLECTION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        filter.append_sql(&mut sql, &mut bind_values);
        for (column, value) in conditions {
            sql.push_str(" AND ");
            sql.push_str(column);
            sql.push_str(" = ?");
            bind_values.push(value.clone());
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_collection_row(row)?);
        }

        Ok(records)
    }

    fn find_many(
        &self,
        operation: &'static str,
        context: VisibilityContext,
        conditions: &[(&'static str, Value)],
    ) -> RepoResult<Vec<Box<dyn RecordCollection>>> {
        let records = self.query_records(context, conditions)?;
        let collections = self.reconstruct_logged(operation, &records)?;
        debug!(
            "event=collection_find module=repo status=ok op={} context={} rows={}",
            operation,
            context.as_str(),
            collections.len()
        );
        Ok(collections)
    }

    fn reconstruct_logged(
        &self,
        operation: &'static str,
        records: &[CollectionRecord],
    ) -> RepoResult<Vec<Box<dyn RecordCollection>>> {
        self.registry.reconstruct_all(records).map_err(|err| {
            warn!(
                "event=collection_find module=repo status=error op={} error_code=reconstruction_failed error={}",
                operation, err
            );
            err
        })
    }
}

impl<C: Clock> CollectionRepository for SqliteCollectionRepository<'_, C> {
    fn find_by_id(
        &self,
        context: VisibilityContext,
        id: CollectionId,
    ) -> RepoResult<Option<Box<dyn RecordCollection>>> {
        let records = self.query_records(context, &[("id", Value::Integer(id))])?;
        let found = self.reconstruct_logged("find_by_id", &records)?.pop();
        debug!(
            "event=collection_find module=repo status=ok op=find_by_id context={} found={}",
            context.as_str(),
            found.is_some()
        );
        Ok(found)
    }

    fn find_all(&self, context: VisibilityContext) -> RepoResult<Vec<Box<dyn RecordCollection>>> {
        self.find_many("find_all", context, &[])
    }

    fn find_by_owning_table(
        &self,
        context: VisibilityContext,
        table_name: &str,
    ) -> RepoResult<Vec<Box<dyn RecordCollection>>> {
        self.find_many(
            "find_by_owning_table",
            context,
            &[("owning_table", Value::Text(table_name.to_string()))],
        )
    }

    fn find_by_type(
        &self,
        context: VisibilityContext,
        type_tag: &str,
    ) -> RepoResult<Vec<Box<dyn RecordCollection>>> {
        self.find_many(
            "find_by_type",
            context,
            &[("type", Value::Text(type_tag.to_string()))],
        )
    }

    fn find_by_type_and_owning_table(
        &self,
        context: VisibilityContext,
        type_tag: &str,
        table_name: &str,
    ) -> RepoResult<Vec<Box<dyn RecordCollection>>> {
        self.find_many(
            "find_by_type_and_owning_table",
            context,
            &[
                ("type", Value::Text(type_tag.to_string())),
                ("owning_table", Value::Text(table_name.to_string())),
            ],
        )
    }

    fn delete_by_id(&self, id: CollectionId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE record_collections
             SET
                deleted = 1,
                modified_at = ?1
             WHERE id = ?2;",
            params![self.clock.now_epoch_secs(), id],
        )?;

        debug!(
            "event=collection_delete module=repo status=ok id={} changed={}",
            id, changed
        );
        Ok(())
    }
}

fn check_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = SCHEMA_VERSION;
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([COLLECTIONS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(COLLECTIONS_TABLE));
    }

    for column in REQUIRED_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: COLLECTIONS_TABLE,
                column: *column,
            });
        }
    }

    Ok(())
}

fn parse_collection_row(row: &Row<'_>) -> RepoResult<CollectionRecord> {
    Ok(CollectionRecord {
        id: row.get("id")?,
        type_tag: row.get("type")?,
        owning_table: row.get("owning_table")?,
        deleted: parse_flag(row, "deleted")?,
        modified_at: row.get("modified_at")?,
        created_at: row.get("created_at")?,
        hidden: parse_flag(row, "hidden")?,
        visible_from: row.get("visible_from")?,
        visible_until: row.get("visible_until")?,
        title: row.get("title")?,
        description: row.get("description")?,
        language_id: row.get("language_id")?,
        item_count: row.get("item_count")?,
    })
}

fn parse_flag(row: &Row<'_>, column: &'static str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid {column} value `{other}` in {COLLECTIONS_TABLE}.{column}"
        ))),
    }
}
