//! Persistence of a planned status fan-out.
//!
//! Writes one `notifications` row per recipient and, when email is enabled,
//! the matching `email_outbox` row in the same transaction. Delivery happens
//! later in the outbox dispatcher, so a mail failure can never undo a
//! notification.

use civic_core::fanout::{PlannedNotification, KIND_STATUS_UPDATE};
use civic_core::types::DbId;
use civic_db::models::notification::{NewNotification, Notification};
use civic_db::models::outbox::NewOutboxEmail;
use civic_db::repositories::{NotificationRepo, OutboxRepo};
use sqlx::PgConnection;

/// Store the planned notifications for `issue_id`, in plan order.
pub async fn store_fan_out(
    conn: &mut PgConnection,
    issue_id: DbId,
    planned: &[PlannedNotification],
    email_enabled: bool,
) -> Result<Vec<Notification>, sqlx::Error> {
    let mut stored = Vec::with_capacity(planned.len());

    for plan in planned {
        let notification = NotificationRepo::create(
            &mut *conn,
            &NewNotification {
                recipient: &plan.recipient,
                message: &plan.message,
                issue_id,
                kind: KIND_STATUS_UPDATE,
            },
        )
        .await?;

        if email_enabled {
            OutboxRepo::enqueue(
                &mut *conn,
                &NewOutboxEmail {
                    notification_id: notification.id,
                    recipient: &plan.recipient,
                    subject: &plan.email_subject,
                    body: &plan.message,
                },
            )
            .await?;
        }

        tracing::debug!(
            notification_id = notification.id,
            issue_id,
            recipient = %plan.recipient,
            role = ?plan.role,
            "Status notification stored"
        );
        stored.push(notification);
    }

    Ok(stored)
}
