//! HTTP transport for the shared timeline.
//!
//! - `GET  /api/shared` - live entries, newest first
//! - `POST /api/shared` - add an entry from `{nickname, side, area}`
//! - `GET  /health` - liveness check

pub mod http;
pub mod shared;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::Error;

/// Body of `POST /api/shared`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSharedRequest {
    /// Display name.
    pub nickname: String,
    /// `left` or `right`.
    pub side: String,
    /// `arm`, `abdomen` or `thigh`.
    pub area: String,
}

/// Reply to a successful `POST /api/shared`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSharedResponse {
    /// Always `true`; failures use [`ApiError`].
    pub success: bool,
}

/// API error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status to reply with.
    #[serde(skip)]
    pub status: u16,
    /// Human-readable message.
    pub error: String,
    /// Stable machine-readable code.
    pub code: String,
}

impl ApiError {
    /// Reject malformed input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "VALIDATION_ERROR")
    }

    /// Backing store could not be reached.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message, "STORE_UNAVAILABLE")
    }

    /// Anything else.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    fn new(status: StatusCode, message: impl Into<String>, code: &str) -> Self {
        Self {
            status: status.as_u16(),
            error: message.into(),
            code: code.to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation { .. } => Self::bad_request(err.to_string()),
            Error::StoreUnavailable { .. } => {
                error!("Timeline store unavailable: {}", err);
                Self::unavailable("timeline temporarily unavailable")
            }
            other => {
                error!("Timeline request failed: {}", other);
                Self::internal("internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
