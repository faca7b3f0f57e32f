//! Shared timeline endpoints

use axum::{extract::State, Json};

use super::{AddSharedRequest, AddSharedResponse, ApiError};
use crate::error::{Error, Result};
use crate::service::TimelineService;
use crate::timeline::SharedEvent;

/// GET /api/shared - Live entries, newest first
pub async fn list_shared(
    State(service): State<TimelineService>,
) -> std::result::Result<Json<Vec<SharedEvent>>, ApiError> {
    let events = run_blocking(move || service.list()).await?;
    Ok(Json(events))
}

/// POST /api/shared - Add an entry
pub async fn add_shared(
    State(service): State<TimelineService>,
    Json(request): Json<AddSharedRequest>,
) -> std::result::Result<Json<AddSharedResponse>, ApiError> {
    run_blocking(move || service.add(&request.nickname, &request.side, &request.area)).await?;
    Ok(Json(AddSharedResponse { success: true }))
}

/// Store calls may block on disk, so keep them off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("timeline task failed: {e}")))?
}
