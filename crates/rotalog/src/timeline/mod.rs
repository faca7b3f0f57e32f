//! The bounded shared timeline.
//!
//! A small community feed that never holds more than a fixed number of
//! entries. Adding an entry inserts it and evicts the oldest rows beyond
//! capacity in one atomic step, so readers never see the feed over capacity
//! or missing the entry that was just added.
//!
//! Two backends implement [`TimelineStore`]:
//! - [`SqliteTimeline`]: durable, one `SQLite` transaction per add
//! - [`MemoryTimeline`]: a mutex-guarded ring for tests and ephemeral servers

mod memory;
pub mod migrations;
pub mod schema;
mod sqlite;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::error::{Error, Result};
use crate::site::SiteKey;

pub use memory::MemoryTimeline;
pub use sqlite::SqliteTimeline;

/// Default number of entries the timeline keeps.
pub const TIMELINE_CAPACITY: usize = 30;

/// An anonymized entry in the community feed.
///
/// Serializes as `{id, nickname, side, area, createdAt}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedEvent {
    /// Server-assigned, strictly increasing identifier.
    pub id: i64,
    /// Display name chosen by the sharer.
    pub nickname: String,
    /// Site that was used.
    #[serde(flatten)]
    pub site_key: SiteKey,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
}

/// A validated display name for the shared feed.
///
/// Surrounding whitespace is removed; what remains must be 1 to 50
/// characters long.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nickname(String);

impl Nickname {
    /// Maximum length in characters.
    pub const MAX_CHARS: usize = 50;

    /// Validate and normalize a raw nickname.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the trimmed nickname is empty or longer
    /// than [`Nickname::MAX_CHARS`].
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("nickname", "must not be empty"));
        }
        let chars = trimmed.chars().count();
        if chars > Self::MAX_CHARS {
            return Err(Error::validation(
                "nickname",
                format!("{chars} characters exceeds the limit of {}", Self::MAX_CHARS),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The normalized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for the bounded timeline.
///
/// Implementations must make `add` atomic with respect to `list`: after
/// `add` returns, at most [`capacity`](TimelineStore::capacity) rows are
/// live and the new row is among them.
pub trait TimelineStore: Send + Sync + fmt::Debug {
    /// Insert an entry and evict everything beyond capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the backing store fails.
    fn add(&self, nickname: &Nickname, site_key: SiteKey) -> Result<SharedEvent>;

    /// All live entries, newest first (by `created_at`, then `id`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the backing store fails.
    fn list(&self) -> Result<Vec<SharedEvent>>;

    /// Number of live entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the backing store fails.
    fn len(&self) -> Result<usize>;

    /// Maximum number of live entries.
    fn capacity(&self) -> usize;
}

/// Open the timeline backend selected by the configuration.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or initialized.
pub fn open_from_config(config: &Config) -> Result<Arc<dyn TimelineStore>> {
    let capacity = config.timeline.capacity;
    let store: Arc<dyn TimelineStore> = match config.storage.backend {
        StorageBackend::Sqlite => {
            Arc::new(SqliteTimeline::open(config.database_path(), capacity)?)
        }
        StorageBackend::Memory => {
            info!("Using in-memory timeline; entries are lost on restart");
            Arc::new(MemoryTimeline::new(capacity)?)
        }
    };
    Ok(store)
}

/// Current server time at the precision the stores keep.
fn server_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Creation time for a new row: never earlier than the newest live row, so
/// a backwards clock step can't make the new row the first one evicted.
fn next_created_at(now: DateTime<Utc>, newest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    newest.map_or(now, |newest| now.max(newest))
}

fn validate_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(Error::ConfigValidation {
            message: "timeline capacity must be at least 1".to_string(),
        });
    }
    Ok(())
}
