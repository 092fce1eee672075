use axum::{extract::State, routing::post, Json, Router};
use skylane_core::Capability;
use tracing::info;

use crate::{
    error::AppError,
    middleware::Caller,
    state::AppState,
    worker::{refresh_once, RefreshOutcome},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/feed/refresh", post(refresh_feed))
}

/// POST /v1/admin/feed/refresh
/// Pull a fresh snapshot from the backend without waiting for the worker.
async fn refresh_feed(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<RefreshOutcome>, AppError> {
    let session = caller.require(Capability::RefreshFeed)?;
    info!("Manual feed refresh requested by {}", session.user_id);

    let outcome = refresh_once(state.source.as_ref(), &state.feed)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    Ok(Json(outcome))
}
