//! Issue submission and status transitions.
//!
//! Both operations run in a single transaction so an issue never exists
//! without its points award, and a status change never commits without its
//! notifications.

use std::str::FromStr;

use civic_core::classification::{is_correction, normalize_label};
use civic_core::error::CoreError;
use civic_core::fanout::{plan_status_fan_out, IssueContext};
use civic_core::issue::{
    plan_transition, Criticality, Department, IssueStatus, IssueType, Priority, Transition,
};
use civic_core::points::POINTS_PER_ISSUE;
use civic_core::types::DbId;
use civic_db::models::corrected::CorrectedLabel;
use civic_db::models::issue::{CreateIssue, Issue};
use civic_db::models::notification::Notification;
use civic_db::models::user::UpsertUser;
use civic_db::repositories::{CorrectedRepo, IssueRepo, NewIssue, UserRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::store_fan_out;
use crate::state::AppState;

/// Result of a submission.
#[derive(Debug, Serialize)]
pub struct SubmittedIssue {
    #[serde(flatten)]
    pub issue: Issue,
    pub points_awarded: i64,
    /// The submitter's point total after the award.
    pub total_points: i64,
    /// Written when the final type overrides the classifier's prediction.
    pub correction: Option<CorrectedLabel>,
}

/// Result of a status change request.
#[derive(Debug, Serialize)]
pub struct TransitionOutcome {
    #[serde(flatten)]
    pub issue: Issue,
    /// `false` when the issue already had the requested status.
    pub changed: bool,
    pub notifications: Vec<Notification>,
}

/// Identity fields for the caller's user row.
pub fn upsert_input(user: &AuthUser) -> UpsertUser<'_> {
    UpsertUser {
        id: &user.sub,
        name: user.name.as_deref().unwrap_or(""),
        email: &user.email,
        role: user.assignment.role.as_str(),
        department: user.assignment.department.map(Department::as_str),
    }
}

/// Create an issue owned by `submitter`.
///
/// The issue starts `open` in the department its type maps to. The submitter
/// earns [`POINTS_PER_ISSUE`], creating their user row if needed. If the form
/// carried a classifier prediction that the final type overrides, one
/// correction record is written.
pub async fn submit_issue(
    state: &AppState,
    input: &CreateIssue,
    submitter: &AuthUser,
) -> AppResult<SubmittedIssue> {
    let department = input.issue_type.department();
    let priority = input.priority.unwrap_or(Priority::Low);
    let criticality = input.criticality.unwrap_or(Criticality::Normal);

    let mut tx = state.pool.begin().await?;

    let issue = IssueRepo::create(
        &mut *tx,
        &NewIssue {
            input,
            department: department.as_str(),
            priority: priority.as_str(),
            criticality: criticality.as_str(),
            submitter: &submitter.email,
        },
    )
    .await?;

    let user = UserRepo::award_points(&mut *tx, &upsert_input(submitter), POINTS_PER_ISSUE).await?;

    let actual = input.issue_type.as_str();
    let correction = match input
        .predicted_type
        .as_deref()
        .filter(|predicted| is_correction(predicted, actual))
    {
        Some(predicted) => Some(
            CorrectedRepo::create(&mut *tx, &input.image, &normalize_label(predicted), actual)
                .await?,
        ),
        None => None,
    };

    tx.commit().await?;

    tracing::info!(
        issue_id = issue.id,
        issue_type = %issue.issue_type,
        department = %issue.department,
        submitter = %issue.submitter,
        correction = correction.is_some(),
        "Issue submitted"
    );

    Ok(SubmittedIssue {
        issue,
        points_awarded: POINTS_PER_ISSUE,
        total_points: user.points,
        correction,
    })
}

/// Move an issue to `target` on behalf of a staff member.
///
/// The row is locked for the whole transaction. A request for the current
/// status is a no-op that writes nothing. A real change is persisted with a
/// compare-and-swap on the previous status, then the submitter and likers
/// are notified in the same transaction.
pub async fn transition_issue(
    state: &AppState,
    issue_id: DbId,
    target: IssueStatus,
    actor: &AuthUser,
) -> AppResult<TransitionOutcome> {
    let mut tx = state.pool.begin().await?;

    let issue = IssueRepo::find_for_update(&mut *tx, issue_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Issue",
            id: issue_id,
        }))?;

    let department: Department = stored(&issue.department)?;
    if !actor.assignment.can_triage(department) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Issue {issue_id} belongs to {department}"
        ))));
    }

    let current: IssueStatus = stored(&issue.status)?;
    let (from, to) = match plan_transition(current, target)? {
        Transition::NoOp => {
            tracing::debug!(issue_id, status = %current, "Status unchanged");
            return Ok(TransitionOutcome {
                issue,
                changed: false,
                notifications: Vec::new(),
            });
        }
        Transition::Change { from, to } => (from, to),
    };

    let updated = IssueRepo::transition_status(&mut *tx, issue_id, from, to)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Issue {issue_id} changed status concurrently; reload and retry"
            )))
        })?;

    let likers = IssueRepo::likers(&mut *tx, issue_id).await?;
    let issue_type: IssueType = stored(&updated.issue_type)?;
    let planned = plan_status_fan_out(
        IssueContext {
            issue_type,
            landmark: updated.landmark.as_deref(),
            submitter: &updated.submitter,
        },
        from,
        to,
        likers.iter().map(String::as_str),
    );

    let notifications = store_fan_out(&mut *tx, issue_id, &planned, state.email_enabled).await?;

    tx.commit().await?;

    tracing::info!(
        issue_id,
        from = %from,
        to = %to,
        actor = %actor.email,
        notified = notifications.len(),
        "Issue status changed"
    );

    Ok(TransitionOutcome {
        issue: updated,
        changed: true,
        notifications,
    })
}

/// Parse a vocabulary value read back from the database.
fn stored<T: FromStr<Err = CoreError>>(value: &str) -> AppResult<T> {
    value
        .parse()
        .map_err(|e: CoreError| AppError::InternalError(format!("Unreadable stored value: {e}")))
}
