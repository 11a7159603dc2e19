//! Notification entity model and DTOs.

use civic_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient: String,
    pub message: String,
    pub issue_id: Option<DbId>,
    pub kind: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Values for a new notification row.
#[derive(Debug, Clone)]
pub struct NewNotification<'a> {
    pub recipient: &'a str,
    pub message: &'a str,
    pub issue_id: DbId,
    pub kind: &'a str,
}

/// Query parameters for listing notifications.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationListParams {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
