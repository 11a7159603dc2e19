//! Reverse geocoding proxy.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use civic_core::geo::validate_coordinate;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

const GEOCODE_ADVISOR: &str = "geocoding";

#[derive(Debug, Deserialize)]
pub struct ReverseParams {
    pub lat: f64,
    pub lon: f64,
}

/// GET /api/v1/geocode/reverse?lat&lon
///
/// Passes the provider's answer through unchanged.
pub async fn reverse(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ReverseParams>,
) -> AppResult<impl IntoResponse> {
    validate_coordinate(params.lat, params.lon)?;

    let geocoder = state
        .geocoder
        .as_ref()
        .ok_or(AppError::AdvisorNotConfigured(GEOCODE_ADVISOR))?;
    let place = geocoder
        .reverse(params.lat, params.lon)
        .await
        .map_err(AppError::advisor(GEOCODE_ADVISOR))?;

    Ok(Json(DataResponse { data: place }))
}
