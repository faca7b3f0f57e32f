//! HTTP server setup with Axum

use std::future::Future;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use super::shared;
use crate::error::Result;
use crate::service::TimelineService;

/// Create the Axum router with all endpoints
pub fn create_router(service: TimelineService) -> Router {
    // The feed is public and read by browser clients on other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/shared",
            get(shared::list_shared).post(shared::add_shared),
        )
        .layer(cors)
        .with_state(service)
}

/// Serve the timeline on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener fails.
pub async fn serve(
    listener: TcpListener,
    service: TimelineService,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    info!("Timeline service listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(service))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Timeline service stopped");
    Ok(())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
