//! SQLite document store bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the pantheon store.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_with_options};

pub type DbResult<T> = Result<T, DbError>;

/// Default time a statement waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
/// SQLite takes the busy timeout as an `i32` millisecond count.
pub const MAX_BUSY_TIMEOUT_MS: u64 = i32::MAX as u64;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    InvalidBusyTimeout(Duration),
}

impl DbError {
    /// Whether the store gave up waiting on a lock held by another writer.
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Sqlite(err) => is_busy_error(err),
            Self::UnsupportedSchemaVersion { .. } | Self::InvalidBusyTimeout(_) => false,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidBusyTimeout(timeout) => write!(
                f,
                "busy timeout of {} ms exceeds the maximum of {MAX_BUSY_TIMEOUT_MS} ms",
                timeout.as_millis()
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::InvalidBusyTimeout(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Connection options applied during bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbOptions {
    /// Upper bound for waiting on another connection's write lock.
    pub busy_timeout: Duration,
}

impl DbOptions {
    /// Rejects values SQLite cannot represent.
    pub fn validate(&self) -> DbResult<()> {
        if self.busy_timeout.as_millis() > u128::from(MAX_BUSY_TIMEOUT_MS) {
            return Err(DbError::InvalidBusyTimeout(self.busy_timeout));
        }
        Ok(())
    }
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

pub(crate) fn is_busy_error(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}
