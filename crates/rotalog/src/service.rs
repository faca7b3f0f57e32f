//! The validating front of the shared timeline.
//!
//! [`TimelineService`] takes raw caller input, turns it into validated
//! types, and only then touches the store. Transports (HTTP, tests, the CLI)
//! all go through it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::site::SiteKey;
use crate::timeline::{Nickname, SharedEvent, TimelineStore};

/// Validating wrapper around a [`TimelineStore`].
#[derive(Debug, Clone)]
pub struct TimelineService {
    store: Arc<dyn TimelineStore>,
}

impl TimelineService {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<dyn TimelineStore>) -> Self {
        Self { store }
    }

    /// Validate and add a shared entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) for a bad
    /// nickname, side, or area (the store is not touched), or
    /// [`Error::StoreUnavailable`](crate::Error::StoreUnavailable) if the
    /// store fails.
    pub fn add(&self, nickname: &str, side: &str, area: &str) -> Result<SharedEvent> {
        let (nickname, site_key) = match Self::validate(nickname, side, area) {
            Ok(valid) => valid,
            Err(err) => {
                debug!("Rejected shared event: {}", err);
                return Err(err);
            }
        };

        match self.store.add(&nickname, site_key) {
            Ok(event) => {
                info!("Shared event {} added for {}", event.id, event.site_key);
                Ok(event)
            }
            Err(err) => {
                warn!("Failed to add shared event: {}", err);
                Err(err)
            }
        }
    }

    /// Live entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// if the store fails.
    pub fn list(&self) -> Result<Vec<SharedEvent>> {
        self.store.list().inspect_err(|err| {
            warn!("Failed to list shared events: {}", err);
        })
    }

    /// The wrapped store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TimelineStore> {
        &self.store
    }

    fn validate(nickname: &str, side: &str, area: &str) -> Result<(Nickname, SiteKey)> {
        let nickname = Nickname::parse(nickname)?;
        let site_key = SiteKey::parse_parts(side, area)?;
        Ok((nickname, site_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{Area, Side};
    use crate::timeline::{MemoryTimeline, SqliteTimeline};

    fn service() -> TimelineService {
        TimelineService::new(Arc::new(MemoryTimeline::new(30).unwrap()))
    }

    #[test]
    fn test_add_then_list() {
        let service = service();
        service.add("Yuki", "left", "abdomen").unwrap();
        service.add("Kai", "right", "thigh").unwrap();

        let list = service.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].nickname, "Kai");
        assert_eq!(list[0].site_key, SiteKey::new(Side::Right, Area::Thigh));
        assert_eq!(list[1].nickname, "Yuki");
        assert_eq!(list[1].site_key, SiteKey::new(Side::Left, Area::Abdomen));
    }

    #[test]
    fn test_invalid_input_never_reaches_store() {
        let service = service();

        assert!(service.add("", "left", "arm").unwrap_err().is_validation());
        assert!(service.add(&"x".repeat(51), "left", "arm").unwrap_err().is_validation());
        assert!(service.add("Yuki", "center", "arm").unwrap_err().is_validation());
        assert!(service.add("Yuki", "left", "neck").unwrap_err().is_validation());
        assert!(service.add("Yuki", "LEFT", "arm").unwrap_err().is_validation());

        assert_eq!(service.store().len().unwrap(), 0);
    }

    #[test]
    fn test_works_over_sqlite() {
        let service = TimelineService::new(Arc::new(SqliteTimeline::open_in_memory(30).unwrap()));
        let event = service.add("Anonymous", "left", "arm").unwrap();
        assert_eq!(service.list().unwrap(), vec![event]);
    }
}
