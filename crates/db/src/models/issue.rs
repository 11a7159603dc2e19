//! Issue entity model and DTOs.

use civic_core::analytics::IssueSample;
use civic_core::error::CoreError;
use civic_core::issue::{Criticality, IssueStatus, IssueType, Priority};
use civic_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `issues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Issue {
    pub id: DbId,
    pub issue_type: String,
    pub department: String,
    pub image: String,
    pub latitude: f64,
    pub longitude: f64,
    pub landmark: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub criticality: String,
    pub submitter: String,
    pub likes_count: i32,
    pub in_progress_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
    pub record_version: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `issue_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IssueComment {
    pub id: DbId,
    pub issue_id: DbId,
    pub author: String,
    pub body: String,
    pub created_at: Timestamp,
}

/// An issue together with its liker set (insertion order) and comments.
#[derive(Debug, Clone, Serialize)]
pub struct IssueDetail {
    #[serde(flatten)]
    pub issue: Issue,
    pub likers: Vec<String>,
    pub comments: Vec<IssueComment>,
}

/// An issue returned by a radius query, with its distance from the centre.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NearbyIssue {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub issue: Issue,
    pub distance_m: f64,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Serialize)]
pub struct LikeToggle {
    pub issue: Issue,
    /// `true` when the identity is now in the liker set.
    pub liked: bool,
}

/// DTO for submitting a new issue.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateIssue {
    pub issue_type: IssueType,
    #[validate(length(min = 1, message = "Image must not be empty"))]
    pub image: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,
    #[validate(length(max = 300))]
    pub landmark: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub criticality: Option<Criticality>,
    /// Label the classification advisor suggested, if the form used it.
    pub predicted_type: Option<String>,
}

/// DTO for an owner's edit. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateIssue {
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 300))]
    pub landmark: Option<String>,
}

/// DTO for the like/comment endpoint.
///
/// A non-blank `comment` appends a comment; otherwise the caller's like is
/// toggled. `liker`, when sent, must name the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct IssueInteraction {
    pub id: DbId,
    pub liker: Option<String>,
    pub comment: Option<String>,
}

/// DTO for a status change.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateIssueStatus {
    pub status: IssueStatus,
}

/// Query parameters for listing issues.
#[derive(Debug, Default, Deserialize)]
pub struct IssueListParams {
    pub status: Option<String>,
    pub issue_type: Option<String>,
    pub priority: Option<String>,
    pub submitter: Option<String>,
    pub department: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for the duplicate finder.
#[derive(Debug, Deserialize)]
pub struct DuplicateParams {
    pub issue_type: String,
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
}

/// The projection of an issue used by analytics.
#[derive(Debug, Clone, FromRow)]
pub struct IssueSampleRow {
    pub issue_type: String,
    pub status: String,
    pub created_at: Timestamp,
    pub closed_at: Option<Timestamp>,
}

impl TryFrom<IssueSampleRow> for IssueSample {
    type Error = CoreError;

    fn try_from(row: IssueSampleRow) -> Result<Self, Self::Error> {
        Ok(IssueSample {
            issue_type: row.issue_type.parse()?,
            status: row.status.parse()?,
            created_at: row.created_at,
            closed_at: row.closed_at,
        })
    }
}
