//! Area and dashboard analytics.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use civic_core::analytics::{area_breakdown, overview, CategoryStats, Interval, IssueSample};
use civic_core::error::CoreError;
use civic_core::geo::{radius_to_meters, Coordinate, DEFAULT_AREA_RADIUS_KM};
use civic_db::models::issue::IssueSampleRow;
use civic_db::repositories::{IssueRepo, RadiusFilter};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /analytics/area`.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AreaRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AreaReport {
    pub center: Coordinate,
    pub radius_km: f64,
    pub total: i64,
    pub categories: BTreeMap<&'static str, CategoryStats>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OverviewParams {
    pub interval: Option<String>,
}

/// POST /api/v1/analytics/area
///
/// Issues within the radius (default 5 km) grouped by type, with counts and
/// mean resolution hours.
pub async fn area(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<AreaRequest>,
) -> AppResult<impl IntoResponse> {
    let center = Coordinate::new(input.lat, input.lng)?;
    let radius_m = radius_to_meters(input.radius_km, DEFAULT_AREA_RADIUS_KM)?;

    let rows = IssueRepo::samples(&state.pool, Some(RadiusFilter { center, radius_m })).await?;
    let samples = to_samples(rows)?;

    Ok(Json(DataResponse {
        data: AreaReport {
            center,
            radius_km: radius_m / 1000.0,
            total: samples.len() as i64,
            categories: area_breakdown(&samples),
        },
    }))
}

/// GET /api/v1/analytics/overview?interval=day|week|month|year
pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<OverviewParams>,
) -> AppResult<impl IntoResponse> {
    let interval = match params.interval.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw.parse::<Interval>()?,
        _ => Interval::default(),
    };

    let rows = IssueRepo::samples(&state.pool, None).await?;
    let samples = to_samples(rows)?;

    Ok(Json(DataResponse {
        data: overview(&samples, interval),
    }))
}

fn to_samples(rows: Vec<IssueSampleRow>) -> AppResult<Vec<IssueSample>> {
    rows.into_iter()
        .map(IssueSample::try_from)
        .collect::<Result<Vec<_>, CoreError>>()
        .map_err(|e| AppError::InternalError(format!("Unreadable issue sample: {e}")))
}
