//! Site rotation recommendations.
//!
//! A site is "due" once enough time has passed since it was last used.
//! Everything here is a pure function of the event history and a caller
//! supplied `now`, so it can run on any thread without locking.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::site::{InjectionEvent, SiteKey};

/// Hours that must elapse before a site is recommended again.
pub const RECOMMENDED_INTERVAL_HOURS: f64 = 48.0;

/// Derived usage status of one site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStatus {
    /// The site described.
    pub site_key: SiteKey,
    /// Most recent use, if any.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Hours between `last_used_at` and `now`.
    pub hours_since_last_use: Option<f64>,
    /// Whether the site is due for use.
    pub recommended: bool,
}

/// Compute the status of every site using the default 48 hour threshold.
#[must_use]
pub fn status_of(events: &[InjectionEvent], now: DateTime<Utc>) -> BTreeMap<SiteKey, SiteStatus> {
    status_of_with_threshold(events, now, RECOMMENDED_INTERVAL_HOURS)
}

/// Compute the status of every site with a custom threshold in hours.
///
/// The result always has an entry for each of the six sites. A never-used
/// site is always recommended. A `now` earlier than the latest use yields a
/// negative `hours_since_last_use`; that is not checked here.
#[must_use]
pub fn status_of_with_threshold(
    events: &[InjectionEvent],
    now: DateTime<Utc>,
    threshold_hours: f64,
) -> BTreeMap<SiteKey, SiteStatus> {
    let mut last_used: BTreeMap<SiteKey, DateTime<Utc>> = BTreeMap::new();
    for event in events {
        last_used
            .entry(event.site_key)
            .and_modify(|latest| {
                if event.occurred_at > *latest {
                    *latest = event.occurred_at;
                }
            })
            .or_insert(event.occurred_at);
    }

    SiteKey::ALL
        .iter()
        .map(|&site_key| {
            let last_used_at = last_used.get(&site_key).copied();
            let hours_since_last_use = last_used_at.map(|at| hours_between(at, now));
            let recommended = hours_since_last_use.map_or(true, |hours| hours >= threshold_hours);
            (
                site_key,
                SiteStatus {
                    site_key,
                    last_used_at,
                    hours_since_last_use,
                    recommended,
                },
            )
        })
        .collect()
}

/// Sites that are currently due, in enumeration order.
#[must_use]
pub fn recommended_sites(statuses: &BTreeMap<SiteKey, SiteStatus>) -> Vec<SiteKey> {
    statuses
        .values()
        .filter(|status| status.recommended)
        .map(|status| status.site_key)
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}
