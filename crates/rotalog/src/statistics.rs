//! Usage statistics over a trailing window.
//!
//! Pure functions over the event history, like [`crate::rotation`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::site::{Area, InjectionEvent, Side, SiteKey};

/// Window used when the caller doesn't pick one.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Usage of one site within a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatistic {
    /// The site described.
    pub site_key: SiteKey,
    /// Events at this site inside the window.
    pub count: usize,
    /// Share of all in-window events, 0..=100.
    pub percentage_of_window: f64,
    /// Fixed chart color for this site.
    pub display_color: &'static str,
}

/// Chart color of a site.
#[must_use]
pub fn display_color(site_key: SiteKey) -> &'static str {
    match (site_key.side, site_key.area) {
        (Side::Left, Area::Arm) => "#FF6B6B",
        (Side::Right, Area::Arm) => "#4ECDC4",
        (Side::Left, Area::Abdomen) => "#FFE66D",
        (Side::Right, Area::Abdomen) => "#95E1D3",
        (Side::Left, Area::Thigh) => "#C7CEEA",
        (Side::Right, Area::Thigh) => "#FF8B94",
    }
}

/// Summarize site usage over the last `window_days` days.
///
/// Only sites used at least once in the window appear. The result is sorted
/// by count, highest first; equal counts keep [`SiteKey::ALL`] order. An
/// empty window yields an empty vector, which means "no data".
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(
    events: &[InjectionEvent],
    window_days: i64,
    now: DateTime<Utc>,
) -> Vec<UsageStatistic> {
    // A window too large to represent covers the whole history
    let cutoff = Duration::try_days(window_days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut counts = [0usize; SiteKey::ALL.len()];
    let mut total = 0usize;
    for event in events.iter().filter(|e| e.occurred_at >= cutoff) {
        counts[event.site_key.index()] += 1;
        total += 1;
    }

    if total == 0 {
        return Vec::new();
    }

    let mut statistics: Vec<UsageStatistic> = SiteKey::ALL
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(&site_key, count)| UsageStatistic {
            site_key,
            count,
            percentage_of_window: 100.0 * count as f64 / total as f64,
            display_color: display_color(site_key),
        })
        .collect();

    // Stable sort keeps enumeration order among ties
    statistics.sort_by(|a, b| b.count.cmp(&a.count));
    statistics
}

/// The most and least used sites of a sorted summary.
///
/// Both are `None` for an empty summary and the same entry for a
/// single-element summary.
#[must_use]
pub fn most_and_least_used(
    statistics: &[UsageStatistic],
) -> (Option<&UsageStatistic>, Option<&UsageStatistic>) {
    (statistics.first(), statistics.last())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn event(key: SiteKey, days_ago: i64) -> InjectionEvent {
        InjectionEvent::new(key, now() - Duration::days(days_ago))
    }

    const LEFT_ARM: SiteKey = SiteKey::new(Side::Left, Area::Arm);
    const RIGHT_THIGH: SiteKey = SiteKey::new(Side::Right, Area::Thigh);
    const LEFT_ABDOMEN: SiteKey = SiteKey::new(Side::Left, Area::Abdomen);

    #[test]
    fn test_empty_history() {
        assert!(summarize(&[], DEFAULT_WINDOW_DAYS, now()).is_empty());
        assert_eq!(most_and_least_used(&[]), (None, None));
    }

    #[test]
    fn test_events_outside_window_are_ignored() {
        let events = [event(LEFT_ARM, 31), event(RIGHT_THIGH, 45)];
        assert!(summarize(&events, 30, now()).is_empty());
    }

    #[test]
    fn test_window_start_is_inclusive() {
        let events = [event(LEFT_ARM, 30)];
        let stats = summarize(&events, 30, now());
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 1);
        assert!((stats[0].percentage_of_window - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_counts_sorted_descending() {
        let events = [
            event(LEFT_ARM, 1),
            event(RIGHT_THIGH, 2),
            event(RIGHT_THIGH, 3),
            event(RIGHT_THIGH, 4),
            event(LEFT_ABDOMEN, 5),
            event(LEFT_ABDOMEN, 6),
            event(LEFT_ARM, 40),
        ];
        let stats = summarize(&events, 30, now());

        let keys: Vec<SiteKey> = stats.iter().map(|s| s.site_key).collect();
        assert_eq!(keys, vec![RIGHT_THIGH, LEFT_ABDOMEN, LEFT_ARM]);
        assert_eq!(stats.iter().map(|s| s.count).sum::<usize>(), 6);

        let total: f64 = stats.iter().map(|s| s.percentage_of_window).sum();
        assert!((total - 100.0).abs() < 1e-6 * 6.0);

        assert_eq!(stats[0].display_color, "#FF8B94");
    }

    #[test]
    fn test_ties_follow_enumeration_order() {
        let events = [
            event(RIGHT_THIGH, 1),
            event(LEFT_ABDOMEN, 2),
            event(LEFT_ARM, 3),
        ];
        let stats = summarize(&events, 30, now());
        let keys: Vec<SiteKey> = stats.iter().map(|s| s.site_key).collect();
        assert_eq!(keys, vec![LEFT_ARM, LEFT_ABDOMEN, RIGHT_THIGH]);
    }

    #[test]
    fn test_most_and_least_used() {
        let events = [event(LEFT_ARM, 1), event(LEFT_ARM, 2), event(RIGHT_THIGH, 3)];
        let stats = summarize(&events, 30, now());
        let (most, least) = most_and_least_used(&stats);
        assert_eq!(most.unwrap().site_key, LEFT_ARM);
        assert_eq!(least.unwrap().site_key, RIGHT_THIGH);
    }

    #[test]
    fn test_single_entry_is_both_most_and_least() {
        let stats = summarize(&[event(LEFT_ABDOMEN, 0)], 30, now());
        let (most, least) = most_and_least_used(&stats);
        assert_eq!(most, least);
        assert!(most.is_some());
    }

    #[test]
    fn test_palette_is_distinct() {
        let mut colors: Vec<&str> = SiteKey::ALL.iter().map(|&k| display_color(k)).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), 6);
    }
}
