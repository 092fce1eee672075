use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skylane_core::{filter_and_rank, paginate, Capability, FlightRecord, SearchCriteria, SearchOutcome};
use skylane_store::FeedStatus;
use tracing::info;
use uuid::Uuid;

use crate::{error::AppError, middleware::Caller, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<String>,
    pub passengers: Option<i64>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl SearchParams {
    pub fn criteria(&self) -> Result<SearchCriteria, AppError> {
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::ValidationError(format!("Invalid travel date {:?}, expected YYYY-MM-DD", raw))
            })?),
        };

        Ok(SearchCriteria {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            date,
            passengers: self.passengers.unwrap_or(1),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub search_id: Uuid,
    /// Lets clients tell "no matches" apart from "still loading".
    pub feed: FeedStatus,
    pub count: usize,
    pub skipped: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub visible_pages: Vec<usize>,
    pub flights: Vec<FlightRecord>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/flights/search", get(search_flights))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/flights/search
/// Filter and rank the latest flight snapshot for the given criteria.
async fn search_flights(
    State(state): State<AppState>,
    caller: Caller,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let session = caller.require(Capability::SearchFlights)?;
    let Query(params) = params.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let criteria = params.criteria()?;
    let search_id = Uuid::new_v4();

    // Runs on the newest completed fetch, even if a refresh is in flight.
    let view = state.feed.view().await;
    let outcome = match &view.snapshot {
        Some(snapshot) => filter_and_rank(&snapshot.flights, &criteria, &snapshot.directory, state.now()),
        None => SearchOutcome::default(),
    };

    let per_page = params
        .per_page
        .unwrap_or(state.search.default_per_page)
        .clamp(1, state.search.max_per_page.max(1));
    let page = paginate(&outcome.flights, params.page.unwrap_or(1), per_page);

    info!(
        "Search {} by {}: {} match(es), {} skipped, feed {:?}",
        search_id,
        session.user_id,
        outcome.count(),
        outcome.skipped,
        view.status
    );

    Ok(Json(SearchResponse {
        search_id,
        feed: view.status,
        count: outcome.count(),
        skipped: outcome.skipped,
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages,
        visible_pages: page.visible_pages,
        flights: page.items,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_to_criteria() {
        let params = SearchParams {
            origin: Some("UIO".to_string()),
            date: Some("2025-11-01".to_string()),
            passengers: Some(2),
            ..Default::default()
        };
        let criteria = params.criteria().unwrap();
        assert_eq!(criteria.date, NaiveDate::from_ymd_opt(2025, 11, 1));
        assert_eq!(criteria.seats_required(), 2);

        let blank_date = SearchParams { date: Some(" ".to_string()), ..Default::default() };
        assert_eq!(blank_date.criteria().unwrap().date, None);
        assert_eq!(blank_date.criteria().unwrap().passengers, 1);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let params = SearchParams { date: Some("01/11/2025".to_string()), ..Default::default() };
        assert!(matches!(params.criteria(), Err(AppError::ValidationError(_))));
    }
}
