use axum::{extract::State, routing::get, Json, Router};
use chrono::Duration;
use serde::Serialize;
use skylane_core::overview::{status_summary, upcoming_departures, StatusSummary};
use skylane_core::{Capability, FlightRecord};
use skylane_store::FeedStatus;

use crate::{error::AppError, middleware::Caller, state::AppState};

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub feed: FeedStatus,
    pub last_error: Option<String>,
    pub summary: StatusSummary,
    pub upcoming: Vec<FlightRecord>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/staff/overview", get(overview))
}

/// GET /v1/staff/overview
/// Status counts and the departures coming up within the configured horizon.
async fn overview(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<OverviewResponse>, AppError> {
    caller.require(Capability::ViewOperations)?;

    let view = state.feed.view().await;
    let horizon = Duration::days(state.search.upcoming_horizon_days.max(0));
    let (summary, upcoming) = match &view.snapshot {
        Some(snapshot) => (
            status_summary(&snapshot.flights),
            upcoming_departures(&snapshot.flights, state.now(), horizon),
        ),
        None => (StatusSummary::default(), Vec::new()),
    };

    Ok(Json(OverviewResponse {
        feed: view.status,
        last_error: view.last_error,
        summary,
        upcoming,
    }))
}
