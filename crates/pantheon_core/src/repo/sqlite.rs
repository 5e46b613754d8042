//! SQLite-backed repository handle shared by all record collections.
//!
//! # Responsibility
//! - Verify that a connection is migrated before any repository use.
//! - Host row parsing and version-bump helpers reused by collection impls.
//!
//! # Invariants
//! - `try_new` rejects connections whose schema version differs from the
//!   latest migration known by this binary.
//! - Read-check-write paths take the write lock at `BEGIN`, so contention
//!   waits on the busy timeout instead of failing on lock upgrade.

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use uuid::Uuid;

const REQUIRED_TABLES: &[&str] = &[
    "gods",
    "abodes",
    "emblems",
    "god_domains",
    "god_emblems",
    "god_relations",
];

/// SQLite repository over gods, relations, abodes and emblems.
///
/// Holds a borrowed connection, so it is cheap to copy into several services
/// that share one storage handle.
#[derive(Debug, Clone, Copy)]
pub struct SqlitePantheonRepository<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqlitePantheonRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Underlying connection, for callers that need raw inspection.
    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Starts an `IMMEDIATE` transaction on a shared connection.
pub(crate) fn begin_write(conn: &Connection) -> RepoResult<Transaction<'_>> {
    Ok(Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?)
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn record_exists(conn: &Connection, entity: EntityKind, id: Uuid) -> RepoResult<bool> {
    let sql = match entity {
        EntityKind::God => "SELECT 1 FROM gods WHERE uuid = ?1;",
        EntityKind::Abode => "SELECT 1 FROM abodes WHERE uuid = ?1;",
        EntityKind::Emblem => "SELECT 1 FROM emblems WHERE uuid = ?1;",
    };
    let found = conn
        .query_row(sql, [id.to_string()], |row| row.get::<_, i64>(0))
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn require_record(conn: &Connection, entity: EntityKind, id: Uuid) -> RepoResult<()> {
    if record_exists(conn, entity, id)? {
        Ok(())
    } else {
        Err(RepoError::not_found(entity, id))
    }
}

/// Increments the document version of one god.
pub(crate) fn bump_god_version(conn: &Connection, id: Uuid) -> RepoResult<()> {
    conn.execute(
        "UPDATE gods
         SET
            version = version + 1,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE uuid = ?1;",
        [id.to_string()],
    )?;
    Ok(())
}

pub(crate) fn collect_uuids(
    conn: &Connection,
    sql: &str,
    id: Uuid,
    column: &str,
) -> RepoResult<Vec<Uuid>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        ids.push(parse_uuid(&text, column)?);
    }
    Ok(ids)
}
