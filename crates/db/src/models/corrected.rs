//! Classification correction log.

use civic_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `corrected_labels` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CorrectedLabel {
    pub id: DbId,
    pub image: String,
    pub predicted: String,
    pub actual: String,
    pub created_at: Timestamp,
}

/// DTO for logging a correction.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateCorrectedLabel {
    #[validate(length(min = 1, message = "Image must not be empty"))]
    pub image: String,
    #[validate(length(min = 1, message = "Predicted label must not be empty"))]
    pub predicted: String,
    #[validate(length(min = 1, message = "Actual label must not be empty"))]
    pub actual: String,
}

/// Query parameters for listing corrections.
#[derive(Debug, Default, Deserialize)]
pub struct CorrectedListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
