//! Record an injection locally, then offer it to the shared feed.
//!
//! The personal record always lands first. Sharing is best effort: a failure
//! is logged and reported, never rolled back into the history.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::client::TimelineClient;
use crate::error::{Error, Result};
use crate::history::EventHistory;
use crate::site::{InjectionEvent, PainLevel, SiteKey};

/// Name shown in the feed when the sharer gives none.
pub const DEFAULT_NICKNAME: &str = "Anonymous";

/// Result of the sharing half of [`share_best_effort`].
#[derive(Debug)]
pub enum ShareOutcome {
    /// The feed accepted the entry.
    Shared,
    /// The feed could not be reached or rejected the entry.
    Failed(Error),
}

impl ShareOutcome {
    /// Whether the entry reached the feed.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared)
    }
}

/// A new injection to record and share.
#[derive(Debug, Clone)]
pub struct ShareRequest<'a> {
    /// Site used.
    pub site_key: SiteKey,
    /// When the injection happened.
    pub occurred_at: DateTime<Utc>,
    /// Optional pain rating; kept local.
    pub pain_level: Option<PainLevel>,
    /// Optional notes; kept local.
    pub notes: Option<String>,
    /// Feed display name; blank or missing means [`DEFAULT_NICKNAME`].
    pub nickname: Option<&'a str>,
}

/// Record the injection in `history`, hand the updated history to `save`,
/// then share `{nickname, site}` through `client`.
///
/// Only the nickname and site leave the device; pain and notes stay in the
/// personal record. `save` runs before any network traffic, so an
/// interrupted or slow share never costs the local record.
///
/// # Errors
///
/// Returns an error if recording or `save` fails; nothing is shared then.
/// A failed share is not an error; it is reported as
/// [`ShareOutcome::Failed`].
pub async fn share_best_effort<S>(
    history: &mut EventHistory,
    client: &TimelineClient,
    request: ShareRequest<'_>,
    save: S,
) -> Result<(InjectionEvent, ShareOutcome)>
where
    S: FnOnce(&EventHistory) -> Result<()>,
{
    let event = history.record(
        request.site_key,
        request.occurred_at,
        request.pain_level,
        request.notes,
    )?;
    save(history)?;

    let outcome = share_site(client, request.site_key, request.nickname).await;
    Ok((event, outcome))
}

/// Share a site without touching any history.
pub async fn share_site(
    client: &TimelineClient,
    site_key: SiteKey,
    nickname: Option<&str>,
) -> ShareOutcome {
    let nickname = effective_nickname(nickname);
    match client.add(nickname, site_key).await {
        Ok(()) => {
            info!("Shared {} as {}", site_key, nickname);
            ShareOutcome::Shared
        }
        Err(err) => {
            warn!("Sharing failed: {}", err);
            ShareOutcome::Failed(err)
        }
    }
}

fn effective_nickname(nickname: Option<&str>) -> &str {
    match nickname.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_NICKNAME,
    }
}
