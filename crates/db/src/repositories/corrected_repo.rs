//! Repository for the `corrected_labels` table.

use sqlx::{PgExecutor, PgPool};

use crate::models::corrected::CorrectedLabel;

const COLUMNS: &str = "id, image, predicted, actual, created_at";

/// Append-only log of classification corrections.
pub struct CorrectedRepo;

impl CorrectedRepo {
    /// Record a correction. Labels are expected to be normalized and to differ.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        image: &str,
        predicted: &str,
        actual: &str,
    ) -> Result<CorrectedLabel, sqlx::Error> {
        let query = format!(
            "INSERT INTO corrected_labels (image, predicted, actual) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CorrectedLabel>(&query)
            .bind(image)
            .bind(predicted)
            .bind(actual)
            .fetch_one(executor)
            .await
    }

    /// List corrections, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CorrectedLabel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM corrected_labels \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, CorrectedLabel>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
