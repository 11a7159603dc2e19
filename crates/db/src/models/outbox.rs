//! Durable outbound email queue.

use civic_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

pub const OUTBOX_PENDING: &str = "pending";
pub const OUTBOX_SENT: &str = "sent";
pub const OUTBOX_FAILED: &str = "failed";

/// A row from the `email_outbox` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutboxEmail {
    pub id: DbId,
    pub notification_id: Option<DbId>,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub idempotency_key: String,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub next_attempt_at: Timestamp,
    pub sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Values for a new outbox row tied to a notification.
#[derive(Debug, Clone)]
pub struct NewOutboxEmail<'a> {
    pub notification_id: DbId,
    pub recipient: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
}

/// Idempotency key for the email belonging to a notification.
pub fn notification_idempotency_key(notification_id: DbId) -> String {
    format!("notification:{notification_id}")
}
