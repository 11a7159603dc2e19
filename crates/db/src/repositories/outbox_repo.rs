//! Repository for the `email_outbox` table.

use civic_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::outbox::{
    notification_idempotency_key, NewOutboxEmail, OutboxEmail, OUTBOX_FAILED, OUTBOX_PENDING,
    OUTBOX_SENT,
};

const COLUMNS: &str = "\
    id, notification_id, recipient, subject, body, idempotency_key, status, \
    attempts, last_error, next_attempt_at, sent_at, created_at";

/// Claimed rows are hidden from other dispatchers for this long. A dispatcher
/// that dies mid-send leaves the row to be picked up again afterwards.
const CLAIM_LEASE_SECS: i64 = 300;

/// Queue operations for outbound email.
pub struct OutboxRepo;

impl OutboxRepo {
    /// Queue the email for a notification. A second enqueue for the same
    /// notification is ignored; returns `None` in that case.
    pub async fn enqueue<'e, E: PgExecutor<'e>>(
        executor: E,
        new: &NewOutboxEmail<'_>,
    ) -> Result<Option<OutboxEmail>, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_outbox \
                (notification_id, recipient, subject, body, idempotency_key) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (idempotency_key) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OutboxEmail>(&query)
            .bind(new.notification_id)
            .bind(new.recipient)
            .bind(new.subject)
            .bind(new.body)
            .bind(notification_idempotency_key(new.notification_id))
            .fetch_optional(executor)
            .await
    }

    /// Claim up to `limit` pending rows that are due.
    ///
    /// Concurrent dispatchers skip each other's locked rows; claimed rows
    /// have `next_attempt_at` pushed out by the claim lease.
    pub async fn claim_due(pool: &PgPool, limit: i64) -> Result<Vec<OutboxEmail>, sqlx::Error> {
        let query = format!(
            "UPDATE email_outbox \
             SET next_attempt_at = NOW() + make_interval(secs => $2) \
             WHERE id IN ( \
                 SELECT id FROM email_outbox \
                 WHERE status = '{OUTBOX_PENDING}' AND next_attempt_at <= NOW() \
                 ORDER BY next_attempt_at, id \
                 LIMIT $1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        let mut rows = sqlx::query_as::<_, OutboxEmail>(&query)
            .bind(limit)
            .bind(CLAIM_LEASE_SECS as f64)
            .fetch_all(pool)
            .await?;
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    /// Mark a row delivered.
    pub async fn mark_sent(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(&format!(
            "UPDATE email_outbox \
             SET status = '{OUTBOX_SENT}', sent_at = NOW(), attempts = attempts + 1, \
                 last_error = NULL \
             WHERE id = $1"
        ))
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failed attempt and schedule the next one.
    pub async fn mark_retry(
        pool: &PgPool,
        id: DbId,
        error: &str,
        next_attempt_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE email_outbox \
             SET attempts = attempts + 1, last_error = $2, next_attempt_at = $3 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(next_attempt_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record the final failed attempt; the row is not retried again.
    pub async fn mark_failed(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(&format!(
            "UPDATE email_outbox \
             SET status = '{OUTBOX_FAILED}', attempts = attempts + 1, last_error = $2 \
             WHERE id = $1"
        ))
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find an outbox row by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OutboxEmail>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_outbox WHERE id = $1");
        sqlx::query_as::<_, OutboxEmail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Number of rows in a given status.
    pub async fn count_by_status(pool: &PgPool, status: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM email_outbox WHERE status = $1")
            .bind(status)
            .fetch_one(pool)
            .await
    }
}
