//! HTTP client for a remote timeline service.
//!
//! Feed consumers poll [`TimelineClient::list`] on an interval; a failed
//! fetch is reported as [`FeedState::Unavailable`] and polling carries on.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::{AddSharedRequest, AddSharedResponse, ApiError};
use crate::error::{Error, Result};
use crate::site::SiteKey;
use crate::timeline::SharedEvent;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// What a feed consumer should render after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    /// The fetch succeeded; entries are newest first.
    Available(Vec<SharedEvent>),
    /// The feed is temporarily unavailable.
    Unavailable,
}

/// Client for `GET`/`POST /api/shared`.
#[derive(Debug, Clone)]
pub struct TimelineClient {
    http: reqwest::Client,
    base_url: String,
}

impl TimelineClient {
    /// Create a client for the service at `base_url` (e.g. `http://127.0.0.1:8787`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// The service base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the live feed, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] on transport failure or
    /// [`Error::RemoteStatus`] if the service rejects the request.
    pub async fn list(&self) -> Result<Vec<SharedEvent>> {
        let response = self.http.get(self.shared_url()).send().await?;
        Self::decode(response).await
    }

    /// Share an entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] on transport failure or
    /// [`Error::RemoteStatus`] if the service rejects the entry.
    pub async fn add(&self, nickname: &str, site_key: SiteKey) -> Result<()> {
        let request = AddSharedRequest {
            nickname: nickname.to_string(),
            side: site_key.side.as_str().to_string(),
            area: site_key.area.as_str().to_string(),
        };
        let response = self
            .http
            .post(self.shared_url())
            .json(&request)
            .send()
            .await?;
        let reply: AddSharedResponse = Self::decode(response).await?;
        if !reply.success {
            return Err(Error::RemoteStatus {
                status: 200,
                message: "service did not accept the entry".to_string(),
            });
        }
        Ok(())
    }

    /// Fetch the feed every `interval` until `shutdown` resolves, handing
    /// each result to `on_update`.
    ///
    /// The first fetch happens immediately.
    pub async fn poll<F>(
        &self,
        interval: Duration,
        shutdown: impl Future<Output = ()>,
        mut on_update: F,
    ) where
        F: FnMut(FeedState),
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            // The fetch sits inside the select so shutdown never waits on it
            tokio::select! {
                () = &mut shutdown => {
                    debug!("Feed polling stopped");
                    return;
                }
                state = async {
                    ticker.tick().await;
                    self.fetch_state().await
                } => on_update(state),
            }
        }
    }

    async fn fetch_state(&self) -> FeedState {
        match self.list().await {
            Ok(events) => FeedState::Available(events),
            Err(err) => {
                warn!("Feed temporarily unavailable: {}", err);
                FeedState::Unavailable
            }
        }
    }

    fn shared_url(&self) -> String {
        format!("{}/api/shared", self.base_url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|err| err.error)
            .unwrap_or(body);
        Err(Error::RemoteStatus {
            status: status.as_u16(),
            message,
        })
    }
}
