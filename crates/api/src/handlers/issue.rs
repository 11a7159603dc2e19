//! Handlers for the `/issues` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use civic_core::error::CoreError;
use civic_core::geo::{
    radius_to_meters, Coordinate, DEFAULT_AREA_RADIUS_KM, DEFAULT_DUPLICATE_RADIUS_KM,
};
use civic_core::issue::{validate_comment, Department, IssueStatus, IssueType, Priority};
use civic_core::search::{clamp_limit, clamp_offset};
use civic_core::types::DbId;
use civic_db::models::issue::{
    CreateIssue, DuplicateParams, Issue, IssueDetail, IssueInteraction, IssueListParams,
    UpdateIssue, UpdateIssueStatus,
};
use civic_db::repositories::{IssueFilter, IssueRepo, RadiusFilter};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::lifecycle::{submit_issue, transition_issue};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::query::{PaginationParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::response::DataResponse;
use crate::state::AppState;

/// Most candidates returned by the duplicate finder.
const MAX_DUPLICATES: i64 = 20;

/// Issue detail after a like toggle or comment.
#[derive(Debug, Serialize)]
pub struct InteractionResult {
    #[serde(flatten)]
    pub detail: IssueDetail,
    /// Whether the caller now likes the issue; `None` when a comment was added.
    pub liked: Option<bool>,
}

// ---------------------------------------------------------------------------
// Submission and reads
// ---------------------------------------------------------------------------

/// POST /api/v1/issues
pub async fn create_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateIssue>,
) -> AppResult<impl IntoResponse> {
    let submitted = submit_issue(&state, &input, &auth).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: submitted })))
}

/// GET /api/v1/issues
///
/// Filters: `status`, `issue_type`, `priority`, `submitter`, `department`,
/// and a `lat`/`lng`/`radius_km` circle. Newest first.
pub async fn list_issues(
    State(state): State<AppState>,
    Query(params): Query<IssueListParams>,
) -> AppResult<impl IntoResponse> {
    let status = parse_opt::<IssueStatus>(params.status.as_deref())?;
    let issue_type = parse_opt::<IssueType>(params.issue_type.as_deref())?;
    let priority = parse_opt::<Priority>(params.priority.as_deref())?;
    let department = parse_opt::<Department>(params.department.as_deref())?;

    let within = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => Some(RadiusFilter {
            center: Coordinate::new(lat, lng)?,
            radius_m: radius_to_meters(params.radius_km, DEFAULT_AREA_RADIUS_KM)?,
        }),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "lat and lng must be given together".into(),
            ))
        }
    };

    let submitter = params.submitter.as_deref().map(|s| s.trim().to_lowercase());

    let filter = IssueFilter {
        status: status.map(IssueStatus::as_str),
        issue_type: issue_type.map(IssueType::as_str),
        priority: priority.map(Priority::as_str),
        submitter: submitter.as_deref(),
        department: department.map(Department::as_str),
        within,
    };
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let issues = IssueRepo::list_filtered(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: issues }))
}

/// GET /api/v1/issues/mine
pub async fn my_issues(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let filter = IssueFilter {
        submitter: Some(&auth.email),
        ..IssueFilter::default()
    };
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let issues = IssueRepo::list_filtered(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: issues }))
}

/// GET /api/v1/issues/duplicates?issue_type&lat&lng&radius_km
///
/// Same-type issues within the radius (default 0.5 km), nearest first. An
/// empty list is a normal answer.
pub async fn find_duplicates(
    State(state): State<AppState>,
    Query(params): Query<DuplicateParams>,
) -> AppResult<impl IntoResponse> {
    let issue_type: IssueType = params.issue_type.trim().parse()?;
    let within = RadiusFilter {
        center: Coordinate::new(params.lat, params.lng)?,
        radius_m: radius_to_meters(params.radius_km, DEFAULT_DUPLICATE_RADIUS_KM)?,
    };

    let nearby =
        IssueRepo::find_nearby(&state.pool, issue_type.as_str(), within, MAX_DUPLICATES).await?;

    tracing::debug!(
        issue_type = %issue_type,
        radius_m = within.radius_m,
        found = nearby.len(),
        "Duplicate search"
    );

    Ok(Json(DataResponse { data: nearby }))
}

/// GET /api/v1/issues/{id}
pub async fn get_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = IssueRepo::find_detail(&state.pool, issue_id)
        .await?
        .ok_or(issue_not_found(issue_id))?;

    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// Likes and comments
// ---------------------------------------------------------------------------

/// PATCH /api/v1/issues
///
/// Body `{ id, liker?, comment? }`. A non-blank comment is appended and the
/// like toggle is skipped; otherwise the caller's like is toggled.
pub async fn interact(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<IssueInteraction>,
) -> AppResult<impl IntoResponse> {
    if let Some(liker) = input.liker.as_deref() {
        if !auth.is(liker) {
            return Err(AppError::Core(CoreError::Forbidden(
                "liker must be the authenticated user".into(),
            )));
        }
    }

    let comment = input.comment.as_deref().filter(|c| !c.trim().is_empty());

    let result = match comment {
        Some(text) => {
            validate_comment(text)?;
            let comment = IssueRepo::add_comment(&state.pool, input.id, &auth.email, text.trim())
                .await?
                .ok_or(issue_not_found(input.id))?;
            tracing::info!(
                issue_id = input.id,
                comment_id = comment.id,
                author = %auth.email,
                "Comment added"
            );

            let detail = IssueRepo::find_detail(&state.pool, input.id)
                .await?
                .ok_or(issue_not_found(input.id))?;
            InteractionResult {
                detail,
                liked: None,
            }
        }
        None => {
            let toggle = IssueRepo::toggle_like(&state.pool, input.id, &auth.email)
                .await?
                .ok_or(issue_not_found(input.id))?;
            tracing::info!(
                issue_id = input.id,
                liker = %auth.email,
                liked = toggle.liked,
                likes_count = toggle.issue.likes_count,
                "Like toggled"
            );

            InteractionResult {
                detail: IssueRepo::with_detail(&state.pool, toggle.issue).await?,
                liked: Some(toggle.liked),
            }
        }
    };

    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// Owner edits
// ---------------------------------------------------------------------------

/// PATCH /api/v1/issues/{id}
///
/// Edit description and/or landmark. Submitter or admin only.
pub async fn update_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateIssue>,
) -> AppResult<impl IntoResponse> {
    let existing = find_owned(&state, issue_id, &auth).await?;
    let issue = IssueRepo::update(&state.pool, existing.id, &input)
        .await?
        .ok_or(issue_not_found(issue_id))?;

    tracing::info!(issue_id, editor = %auth.email, "Issue updated");
    Ok(Json(DataResponse { data: issue }))
}

/// DELETE /api/v1/issues/{id}
///
/// Submitter or admin only. Likes and comments go with it; notifications
/// keep their text and lose the link.
pub async fn delete_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_owned(&state, issue_id, &auth).await?;
    if !IssueRepo::delete(&state.pool, issue_id).await? {
        return Err(issue_not_found(issue_id));
    }

    tracing::info!(issue_id, deleted_by = %auth.email, "Issue deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// PATCH /api/v1/issues/{id}/status
///
/// Staff only; department staff are limited to their own department.
pub async fn update_status(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateIssueStatus>,
) -> AppResult<impl IntoResponse> {
    let outcome = transition_issue(&state, issue_id, input.status, &staff).await?;
    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn issue_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Issue", id })
}

/// Load an issue the caller may edit: their own, or any for admins.
async fn find_owned(state: &AppState, issue_id: DbId, auth: &AuthUser) -> AppResult<Issue> {
    let issue = IssueRepo::find_by_id(&state.pool, issue_id)
        .await?
        .ok_or(issue_not_found(issue_id))?;

    if !auth.is_admin() && !auth.is(&issue.submitter) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the submitter or an admin may change this issue".into(),
        )));
    }
    Ok(issue)
}

/// Parse an optional vocabulary filter, rejecting unknown values with 400.
pub(crate) fn parse_opt<T>(value: Option<&str>) -> AppResult<Option<T>>
where
    T: std::str::FromStr<Err = CoreError>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::parse)
        .transpose()
        .map_err(AppError::Core)
}
