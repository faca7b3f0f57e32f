//! `SQLite`-backed timeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};

use super::schema::{
    DELETE_BEYOND_CAPACITY, INSERT_SHARED_EVENT, SELECT_NEWEST_CREATED_AT, SELECT_NEWEST_FIRST,
};
use super::{migrations, next_created_at, server_now, validate_capacity};
use super::{Nickname, SharedEvent, TimelineStore};
use crate::error::{Error, Result};
use crate::site::{Area, Side, SiteKey};

/// How long a writer waits for another process holding the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable timeline stored in a `SQLite` table.
///
/// The connection sits behind a mutex and every `add` runs its insert and
/// trim inside one `IMMEDIATE` transaction, which also serializes writers
/// from other processes sharing the file.
#[derive(Debug)]
pub struct SqliteTimeline {
    path: PathBuf,
    capacity: usize,
    conn: Mutex<Connection>,
}

impl SqliteTimeline {
    /// Open or create a timeline database at the given path.
    ///
    /// Creates parent directories as needed, initializes the schema, and
    /// trims the table to `capacity` in case it was opened with a smaller
    /// capacity than before.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero, or the database cannot be
    /// opened or initialized.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        validate_capacity(capacity)?;
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening timeline database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Within this process the mutex serializes every call; WAL only lets
        // other processes read the file while a write is in progress
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Self::initialize(path, conn, capacity)
    }

    /// Create an in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero or the database cannot be
    /// created.
    pub fn open_in_memory(capacity: usize) -> Result<Self> {
        validate_capacity(capacity)?;
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::initialize(PathBuf::from(":memory:"), conn, capacity)
    }

    fn initialize(path: PathBuf, conn: Connection, capacity: usize) -> Result<Self> {
        migrations::initialize_schema(&conn)?;

        let pruned = conn.execute(DELETE_BEYOND_CAPACITY, [capacity_param(capacity)])?;
        if pruned > 0 {
            info!("Pruned {} timeline entries to fit capacity {}", pruned, capacity);
        }

        info!("Timeline database ready at {}", path.display());
        Ok(Self {
            path,
            capacity,
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert with an explicit server time.
    fn insert_at(
        &self,
        nickname: &Nickname,
        site_key: SiteKey,
        now: DateTime<Utc>,
    ) -> Result<SharedEvent> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(Error::store_unavailable)?;

        let newest = tx
            .query_row(SELECT_NEWEST_CREATED_AT, [], |row| {
                parse_timestamp(0, &row.get::<_, String>(0)?)
            })
            .optional()
            .map_err(Error::store_unavailable)?;
        let created_at = next_created_at(now, newest);

        tx.execute(
            INSERT_SHARED_EVENT,
            params![
                nickname.as_str(),
                site_key.side.as_str(),
                site_key.area.as_str(),
                format_timestamp(created_at),
            ],
        )
        .map_err(Error::store_unavailable)?;
        let id = tx.last_insert_rowid();

        let evicted = tx
            .execute(DELETE_BEYOND_CAPACITY, [capacity_param(self.capacity)])
            .map_err(Error::store_unavailable)?;

        tx.commit().map_err(Error::store_unavailable)?;

        debug!(
            "Added shared event {} ({}), evicted {}",
            id, site_key, evicted
        );
        Ok(SharedEvent {
            id,
            nickname: nickname.as_str().to_string(),
            site_key,
            created_at,
        })
    }

    fn row_to_shared_event(row: &rusqlite::Row) -> rusqlite::Result<SharedEvent> {
        let id: i64 = row.get(0)?;
        let nickname: String = row.get(1)?;
        let side: String = row.get(2)?;
        let area: String = row.get(3)?;
        let created_at: String = row.get(4)?;

        let side: Side = side.parse().map_err(|e: Error| conversion_error(2, e.to_string()))?;
        let area: Area = area.parse().map_err(|e: Error| conversion_error(3, e.to_string()))?;

        Ok(SharedEvent {
            id,
            nickname,
            site_key: SiteKey::new(side, area),
            created_at: parse_timestamp(4, &created_at)?,
        })
    }
}

impl TimelineStore for SqliteTimeline {
    fn add(&self, nickname: &Nickname, site_key: SiteKey) -> Result<SharedEvent> {
        self.insert_at(nickname, site_key, server_now())
    }

    fn list(&self) -> Result<Vec<SharedEvent>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(SELECT_NEWEST_FIRST)
            .map_err(Error::store_unavailable)?;
        let events = stmt
            .query_map([capacity_param(self.capacity)], Self::row_to_shared_event)
            .map_err(Error::store_unavailable)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::store_unavailable)?;
        Ok(events)
    }

    fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM shared_events", [], |row| row.get(0))
            .map_err(Error::store_unavailable)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

fn capacity_param(capacity: usize) -> i64 {
    i64::try_from(capacity).unwrap_or(i64::MAX)
}

/// Fixed-width UTC form, so text order matches time order.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

fn conversion_error(
    column: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, err.into())
}
