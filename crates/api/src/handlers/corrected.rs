//! Handlers for the classifier correction log.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use civic_core::classification::{is_correction, normalize_label};
use civic_core::error::CoreError;
use civic_core::search::{clamp_limit, clamp_offset};
use civic_db::models::corrected::{CorrectedListParams, CreateCorrectedLabel};
use civic_db::repositories::CorrectedRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/corrected
///
/// Record that the user overrode the classifier. Labels that agree after
/// normalization are rejected.
pub async fn record_correction(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateCorrectedLabel>,
) -> AppResult<impl IntoResponse> {
    if !is_correction(&input.predicted, &input.actual) {
        return Err(AppError::Core(CoreError::Validation(
            "Predicted and actual labels must differ".into(),
        )));
    }

    let record = CorrectedRepo::create(
        &state.pool,
        &input.image,
        &normalize_label(&input.predicted),
        &normalize_label(&input.actual),
    )
    .await?;

    tracing::info!(
        correction_id = record.id,
        predicted = %record.predicted,
        actual = %record.actual,
        reporter = %user.email,
        "Classifier correction recorded"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /api/v1/corrected
///
/// Newest first. Admin only.
pub async fn list_corrections(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<CorrectedListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let records = CorrectedRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: records }))
}
