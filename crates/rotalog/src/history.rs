//! The personal event history.
//!
//! [`EventHistory`] owns the user's [`InjectionEvent`]s. It reads the
//! `{siteKey, occurredAt, painLevel?, notes?}` records a supplier hands over
//! and can write them back to a JSON file with [`EventHistory::save`].

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::site::{InjectionEvent, PainLevel, SiteKey};

/// In-memory collection of recorded injections.
///
/// Every event carries a distinct id, so [`EventHistory::delete`] removes
/// exactly one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventHistory {
    events: Vec<InjectionEvent>,
    next_id: u64,
}

impl EventHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from supplied events.
    ///
    /// Events without an id, and later events repeating an id already seen,
    /// get fresh ids above every supplied one.
    ///
    /// # Errors
    ///
    /// Returns a validation error if an event carries id `u64::MAX`, which
    /// leaves no room for new ids.
    pub fn from_events(events: impl IntoIterator<Item = InjectionEvent>) -> Result<Self> {
        let events: Vec<InjectionEvent> = events.into_iter().collect();
        let max_id = events.iter().filter_map(|e| e.id).max().unwrap_or(0);
        let next_id = max_id
            .checked_add(1)
            .ok_or_else(|| Error::validation("id", format!("{max_id} leaves no room for new ids")))?;

        let mut history = Self {
            events: Vec::with_capacity(events.len()),
            next_id,
        };
        let mut seen = HashSet::with_capacity(events.len());
        for mut event in events {
            match event.id {
                Some(id) if seen.insert(id) => {}
                Some(id) => {
                    let fresh = history.allocate_id()?;
                    warn!("Duplicate event id {} renumbered to {}", id, fresh);
                    event.id = Some(fresh);
                    seen.insert(fresh);
                }
                None => {
                    let fresh = history.allocate_id()?;
                    event.id = Some(fresh);
                    seen.insert(fresh);
                }
            }
            history.events.push(event);
        }
        Ok(history)
    }

    /// Read a JSON array of events.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid event list (including
    /// unknown sites or out-of-range pain levels), or an id is `u64::MAX`.
    pub fn from_json_reader(reader: impl Read) -> Result<Self> {
        let events: Vec<InjectionEvent> = serde_json::from_reader(reader)?;
        debug!("Loaded {} events from history supplier", events.len());
        Self::from_events(events)
    }

    /// Write the history as a JSON array, replacing `path` atomically.
    ///
    /// The data goes to a temporary file in the same directory, is synced,
    /// and is then renamed over `path`; a crash leaves either the old file or
    /// the new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or renamed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, &self.events)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| Error::Io(e.error))?;
        debug!("Saved {} events to {}", self.events.len(), path.display());
        Ok(())
    }

    /// Record a new injection and return it.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the id space is exhausted.
    pub fn record(
        &mut self,
        site_key: SiteKey,
        occurred_at: DateTime<Utc>,
        pain_level: Option<PainLevel>,
        notes: Option<String>,
    ) -> Result<InjectionEvent> {
        let event = InjectionEvent {
            id: Some(self.allocate_id()?),
            site_key,
            occurred_at,
            pain_level,
            notes,
        };
        self.events.push(event.clone());
        Ok(event)
    }

    /// Remove an event permanently.
    ///
    /// Returns `true` if an event was removed, `false` if not found.
    pub fn delete(&mut self, id: u64) -> bool {
        match self.events.iter().position(|e| e.id == Some(id)) {
            Some(index) => {
                self.events.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// All events in recording order.
    #[must_use]
    pub fn events(&self) -> &[InjectionEvent] {
        &self.events
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether there are no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn allocate_id(&mut self) -> Result<u64> {
        let id = self.next_id.max(1);
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| Error::validation("id", "no ids left to assign"))?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{Area, Side};

    fn key() -> SiteKey {
        SiteKey::new(Side::Left, Area::Thigh)
    }

    #[test]
    fn test_record_assigns_increasing_ids() {
        let mut history = EventHistory::new();
        let a = history.record(key(), Utc::now(), None, None).unwrap();
        let b = history.record(key(), Utc::now(), None, Some("ok".to_string())).unwrap();

        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(history.len(), 2);
        assert_eq!(history.events()[1].notes.as_deref(), Some("ok"));
    }

    #[test]
    fn test_delete() {
        let mut history = EventHistory::new();
        let a = history.record(key(), Utc::now(), None, None).unwrap();
        history.record(key(), Utc::now(), None, None).unwrap();

        assert!(history.delete(a.id.unwrap()));
        assert!(!history.delete(a.id.unwrap()));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_deleted_ids_are_not_reused() {
        let mut history = EventHistory::new();
        let a = history.record(key(), Utc::now(), None, None).unwrap();
        history.delete(a.id.unwrap());
        let b = history.record(key(), Utc::now(), None, None).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_clear() {
        let mut history = EventHistory::new();
        history.record(key(), Utc::now(), None, None).unwrap();
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_from_json_reader() {
        let json = r#"[
            {"siteKey": {"side": "left", "area": "arm"}, "occurredAt": "2025-01-01T10:00:00Z"},
            {"id": 7, "siteKey": {"side": "right", "area": "thigh"},
             "occurredAt": "2025-01-03T10:00:00Z", "painLevel": 4, "notes": "bruise"}
        ]"#;
        let history = EventHistory::from_json_reader(json.as_bytes()).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.events()[0].id, Some(8));
        assert_eq!(history.events()[1].id, Some(7));
        assert_eq!(history.events()[1].pain_level.map(PainLevel::get), Some(4));
    }

    #[test]
    fn test_from_json_reader_rejects_unknown_site() {
        let json = r#"[{"siteKey": {"side": "up", "area": "arm"}, "occurredAt": "2025-01-01T10:00:00Z"}]"#;
        assert!(EventHistory::from_json_reader(json.as_bytes()).is_err());
    }

    #[test]
    fn test_max_supplied_id_is_rejected() {
        let json = r#"[{"id": 18446744073709551615, "siteKey": {"side": "left", "area": "arm"},
                        "occurredAt": "2025-01-01T10:00:00Z"}]"#;
        let err = EventHistory::from_json_reader(json.as_bytes()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_last_id_can_be_used_but_not_exceeded() {
        let event = InjectionEvent {
            id: Some(u64::MAX - 1),
            ..InjectionEvent::new(key(), Utc::now())
        };
        let mut history = EventHistory::from_events([event]).unwrap();

        let err = history.record(key(), Utc::now(), None, None).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_are_renumbered() {
        let json = r#"[
            {"id": 3, "siteKey": {"side": "left", "area": "arm"}, "occurredAt": "2025-01-01T10:00:00Z"},
            {"id": 3, "siteKey": {"side": "right", "area": "arm"}, "occurredAt": "2025-01-02T10:00:00Z"},
            {"siteKey": {"side": "left", "area": "thigh"}, "occurredAt": "2025-01-03T10:00:00Z"}
        ]"#;
        let mut history = EventHistory::from_json_reader(json.as_bytes()).unwrap();

        let ids: Vec<Option<u64>> = history.events().iter().map(|e| e.id).collect();
        assert_eq!(ids, [Some(3), Some(4), Some(5)]);

        assert!(history.delete(3));
        assert_eq!(history.len(), 2);
        assert_eq!(history.events()[0].site_key, SiteKey::new(Side::Right, Area::Arm));
    }

    #[test]
    fn test_save_round_trips_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, "stale").unwrap();

        let mut history = EventHistory::new();
        history.record(key(), Utc::now(), None, Some("ok".to_string())).unwrap();
        history.save(&path).unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let loaded = EventHistory::from_json_reader(file).unwrap();
        assert_eq!(loaded.events(), history.events());

        // Only the target file is left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
