//! In-memory timeline.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use super::{next_created_at, server_now, validate_capacity};
use super::{Nickname, SharedEvent, TimelineStore};
use crate::error::Result;
use crate::site::SiteKey;

/// Timeline kept in process memory behind a single mutex.
///
/// Rows are held oldest first; `add` pushes and trims under the same lock.
#[derive(Debug)]
pub struct MemoryTimeline {
    capacity: usize,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    rows: VecDeque<SharedEvent>,
    next_id: i64,
}

impl MemoryTimeline {
    /// Create an empty timeline.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        validate_capacity(capacity)?;
        Ok(Self {
            capacity,
            state: Mutex::new(State {
                rows: VecDeque::with_capacity(capacity + 1),
                next_id: 1,
            }),
        })
    }

    fn insert_at(&self, nickname: &Nickname, site_key: SiteKey, now: DateTime<Utc>) -> SharedEvent {
        let mut state = self.state.lock();

        let created_at = next_created_at(now, state.rows.back().map(|row| row.created_at));
        let id = state.next_id;
        state.next_id += 1;

        let event = SharedEvent {
            id,
            nickname: nickname.as_str().to_string(),
            site_key,
            created_at,
        };
        state.rows.push_back(event.clone());

        let mut evicted = 0;
        while state.rows.len() > self.capacity {
            state.rows.pop_front();
            evicted += 1;
        }

        debug!("Added shared event {} ({}), evicted {}", id, site_key, evicted);
        event
    }
}

impl TimelineStore for MemoryTimeline {
    fn add(&self, nickname: &Nickname, site_key: SiteKey) -> Result<SharedEvent> {
        Ok(self.insert_at(nickname, site_key, server_now()))
    }

    fn list(&self) -> Result<Vec<SharedEvent>> {
        Ok(self.state.lock().rows.iter().rev().cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.state.lock().rows.len())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
