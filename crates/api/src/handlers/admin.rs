//! Staff work queue.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use civic_core::access::Role;
use civic_core::error::CoreError;
use civic_core::issue::{Department, IssueStatus};
use civic_core::search::{clamp_limit, clamp_offset};
use civic_db::repositories::{IssueFilter, IssueRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::issue::parse_opt;
use crate::middleware::rbac::RequireStaff;
use crate::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /admin/issues`.
#[derive(Debug, Default, Deserialize)]
pub struct QueueParams {
    pub status: Option<String>,
    /// Admins only; department staff always see their own department.
    pub department: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/admin/issues
///
/// Department staff get their department's issues. Admins get every issue,
/// optionally narrowed to one department.
pub async fn issue_queue(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Query(params): Query<QueueParams>,
) -> AppResult<impl IntoResponse> {
    let status = parse_opt::<IssueStatus>(params.status.as_deref())?;
    let requested = parse_opt::<Department>(params.department.as_deref())?;

    let department = match staff.role() {
        Role::Admin => requested,
        _ => {
            let own = staff.assignment.department.ok_or_else(|| {
                AppError::Core(CoreError::Forbidden("No department assigned".into()))
            })?;
            if requested.is_some_and(|d| d != own) {
                return Err(AppError::Core(CoreError::Forbidden(format!(
                    "Department staff may only view {own}"
                ))));
            }
            Some(own)
        }
    };

    let filter = IssueFilter {
        status: status.map(IssueStatus::as_str),
        department: department.map(Department::as_str),
        ..IssueFilter::default()
    };
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let issues = IssueRepo::list_filtered(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: issues }))
}
