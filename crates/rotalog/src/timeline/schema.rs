//! `SQLite` schema definitions for the shared timeline.

/// SQL statement to create the shared events table.
pub const CREATE_SHARED_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS shared_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nickname TEXT NOT NULL,
    side TEXT NOT NULL,
    area TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the recency index used by listing and eviction.
pub const CREATE_RECENCY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_shared_events_recency
ON shared_events(created_at DESC, id DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Schema steps; step `n` (1-based) brings the database to version `n`.
pub const MIGRATIONS: &[&[&str]] = &[
    // v1: the bounded feed and the index that listing and eviction walk
    &[CREATE_SHARED_EVENTS_TABLE, CREATE_RECENCY_INDEX],
];

/// Newest live row's creation time.
pub const SELECT_NEWEST_CREATED_AT: &str = r"
SELECT created_at FROM shared_events ORDER BY created_at DESC, id DESC LIMIT 1
";

/// Insert a row; `?1` nickname, `?2` side, `?3` area, `?4` created_at.
pub const INSERT_SHARED_EVENT: &str = r"
INSERT INTO shared_events (nickname, side, area, created_at) VALUES (?1, ?2, ?3, ?4)
";

/// Delete every row outside the newest `?1`.
pub const DELETE_BEYOND_CAPACITY: &str = r"
DELETE FROM shared_events WHERE id NOT IN (
    SELECT id FROM shared_events ORDER BY created_at DESC, id DESC LIMIT ?1
)
";

/// Live rows, newest first.
pub const SELECT_NEWEST_FIRST: &str = r"
SELECT id, nickname, side, area, created_at
FROM shared_events ORDER BY created_at DESC, id DESC LIMIT ?1
";
