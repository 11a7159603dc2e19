//! Handlers for the advisory services used by the submission form.
//!
//! Both endpoints are suggestions only. A failing or unconfigured service
//! answers 502 `ADVISOR_UNAVAILABLE` so the client can prompt a retry while
//! the rest of the form keeps working.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use civic_advisors::decode_image;
use civic_core::classification::{match_issue_type, normalize_label};
use civic_core::issue::{Criticality, IssueType, Priority};
use civic_core::priority::{build_prompt, normalize_priority, PriorityAdvice};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

const PRIORITY_ADVISOR: &str = "priority";
const CLASSIFICATION_ADVISOR: &str = "classification";

/// Body of `POST /advisors/priority`.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PriorityRequest {
    #[validate(length(min = 1, max = 100))]
    pub issue_type: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 300))]
    pub location: Option<String>,
    #[serde(default)]
    pub has_image: bool,
}

#[derive(Debug, Serialize)]
pub struct PriorityResponse {
    pub advice: PriorityAdvice,
    pub priority: Priority,
    pub criticality: Criticality,
}

/// Body of `POST /advisors/classify`.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ClassifyRequest {
    /// Base64 image, optionally as a `data:` URL.
    #[validate(length(min = 1, message = "Image must not be empty"))]
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    /// The classifier's label as returned.
    pub label: String,
    pub normalized_label: String,
    pub confidence: f64,
    /// Matching issue type, or `null` to keep the user's manual choice.
    pub suggestion: Option<IssueType>,
}

/// POST /api/v1/advisors/priority
pub async fn suggest_priority(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<PriorityRequest>,
) -> AppResult<impl IntoResponse> {
    let advisor = state
        .priority
        .as_ref()
        .ok_or(AppError::AdvisorNotConfigured(PRIORITY_ADVISOR))?;

    let prompt = build_prompt(
        input.issue_type.trim(),
        input.description.as_deref(),
        input.location.as_deref(),
        input.has_image,
    );
    let raw = advisor
        .suggest_priority(&prompt)
        .await
        .map_err(AppError::advisor(PRIORITY_ADVISOR))?;
    let advice = normalize_priority(&raw);

    tracing::debug!(user = %user.email, raw = %raw.trim(), advice = advice.as_str(), "Priority advice");

    Ok(Json(DataResponse {
        data: PriorityResponse {
            advice,
            priority: advice.priority(),
            criticality: advice.criticality(),
        },
    }))
}

/// POST /api/v1/advisors/classify
pub async fn classify_image(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ClassifyRequest>,
) -> AppResult<impl IntoResponse> {
    let advisor = state
        .classifier
        .as_ref()
        .ok_or(AppError::AdvisorNotConfigured(CLASSIFICATION_ADVISOR))?;

    let bytes = decode_image(&input.image).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let classification = advisor
        .classify(bytes)
        .await
        .map_err(AppError::advisor(CLASSIFICATION_ADVISOR))?;

    let suggestion = match_issue_type(&classification.label);
    tracing::debug!(
        user = %user.email,
        label = %classification.label,
        confidence = classification.confidence,
        suggestion = ?suggestion,
        "Image classified"
    );

    Ok(Json(DataResponse {
        data: ClassifyResponse {
            normalized_label: normalize_label(&classification.label),
            label: classification.label,
            confidence: classification.confidence,
            suggestion,
        },
    }))
}
