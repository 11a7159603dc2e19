//! Email outbox dispatcher.
//!
//! [`OutboxDispatcher`] runs as a background task. Each tick it claims due
//! rows from `email_outbox`, hands them to the [`Mailer`], and either marks
//! them sent or reschedules them with exponential backoff. A row that keeps
//! failing is marked `failed` after the configured number of attempts.
//! Delivery is at-least-once; every attempt carries the row's idempotency key.

use std::sync::Arc;
use std::time::Duration;

use civic_db::models::outbox::OutboxEmail;
use civic_db::repositories::OutboxRepo;
use civic_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::delivery::email::{Mailer, OutgoingEmail};

/// Delay before the first retry. Doubles on each further failure.
const BASE_RETRY_DELAY_SECS: i64 = 30;

/// Upper bound on the retry delay.
const MAX_RETRY_DELAY_SECS: i64 = 3_600;

const DEFAULT_POLL_SECS: u64 = 15;
const DEFAULT_MAX_ATTEMPTS: i32 = 5;
const DEFAULT_BATCH_SIZE: i64 = 50;

// ---------------------------------------------------------------------------
// OutboxConfig
// ---------------------------------------------------------------------------

/// Tuning for the dispatcher loop.
#[derive(Debug, Clone)]
pub struct OutboxConfig {
    pub poll_interval: Duration,
    pub max_attempts: i32,
    pub batch_size: i64,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl OutboxConfig {
    /// Load from `OUTBOX_POLL_SECS` (default 15) and `OUTBOX_MAX_ATTEMPTS`
    /// (default 5).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: std::env::var("OUTBOX_POLL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            max_attempts: std::env::var("OUTBOX_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse::<i32>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_attempts),
            batch_size: defaults.batch_size,
        }
    }
}

/// Delay before the next attempt after `failed_attempts` failures:
/// 30 s, 60 s, 120 s, ... capped at one hour.
pub fn retry_delay(failed_attempts: i32) -> chrono::Duration {
    let exponent = failed_attempts.clamp(1, 20) as u32 - 1;
    let secs = BASE_RETRY_DELAY_SECS
        .saturating_mul(1_i64 << exponent)
        .min(MAX_RETRY_DELAY_SECS);
    chrono::Duration::seconds(secs)
}

/// Counts from one dispatch pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub retried: usize,
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// OutboxDispatcher
// ---------------------------------------------------------------------------

/// Background service that delivers queued notification emails.
pub struct OutboxDispatcher {
    pool: DbPool,
    mailer: Arc<dyn Mailer>,
    config: OutboxConfig,
}

impl OutboxDispatcher {
    pub fn new(pool: DbPool, mailer: Arc<dyn Mailer>, config: OutboxConfig) -> Self {
        Self {
            pool,
            mailer,
            config,
        }
    }

    /// Run the dispatcher loop until the [`CancellationToken`] is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Outbox dispatcher cancelled");
                    break;
                }
                _ = interval.tick() => {
                    match self.dispatch_once().await {
                        Ok(report) if report != DispatchReport::default() => {
                            tracing::info!(
                                sent = report.sent,
                                retried = report.retried,
                                failed = report.failed,
                                "Outbox pass complete"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "Failed to dispatch outbox"),
                    }
                }
            }
        }
    }

    /// Claim and attempt every due row once.
    pub async fn dispatch_once(&self) -> Result<DispatchReport, sqlx::Error> {
        let due = OutboxRepo::claim_due(&self.pool, self.config.batch_size).await?;
        let mut report = DispatchReport::default();

        for row in &due {
            let email = to_outgoing(row);
            match self.mailer.send(&email).await {
                Ok(()) => {
                    OutboxRepo::mark_sent(&self.pool, row.id).await?;
                    report.sent += 1;
                }
                Err(e) => {
                    let failed_attempts = row.attempts + 1;
                    let error = e.to_string();
                    if failed_attempts >= self.config.max_attempts {
                        tracing::error!(
                            outbox_id = row.id,
                            to = %row.recipient,
                            attempts = failed_attempts,
                            error = %error,
                            "Giving up on notification email"
                        );
                        OutboxRepo::mark_failed(&self.pool, row.id, &error).await?;
                        report.failed += 1;
                    } else {
                        let next = chrono::Utc::now() + retry_delay(failed_attempts);
                        tracing::warn!(
                            outbox_id = row.id,
                            to = %row.recipient,
                            attempts = failed_attempts,
                            next_attempt_at = %next,
                            error = %error,
                            "Notification email failed, will retry"
                        );
                        OutboxRepo::mark_retry(&self.pool, row.id, &error, next).await?;
                        report.retried += 1;
                    }
                }
            }
        }

        Ok(report)
    }
}

fn to_outgoing(row: &OutboxEmail) -> OutgoingEmail {
    OutgoingEmail {
        to: row.recipient.clone(),
        subject: row.subject.clone(),
        body: row.body.clone(),
        idempotency_key: row.idempotency_key.clone(),
    }
}
