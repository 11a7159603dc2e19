//! Repository for the `users` table.

use sqlx::{PgExecutor, PgPool};

use crate::models::user::{LeaderboardEntry, UpsertUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, role, department, points, created_at, updated_at";

/// Provides identity upserts, point awards and the leaderboard.
pub struct UserRepo;

impl UserRepo {
    /// Insert or refresh a user keyed by identity-provider subject.
    ///
    /// Name, email, role and department are overwritten; points are kept.
    pub async fn upsert<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &UpsertUser<'_>,
    ) -> Result<User, sqlx::Error> {
        Self::upsert_with_points(executor, input, 0).await
    }

    /// Upsert the user and add `points` to their total in one statement, so
    /// a missing user is created with the award already applied.
    pub async fn award_points<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &UpsertUser<'_>,
        points: i64,
    ) -> Result<User, sqlx::Error> {
        Self::upsert_with_points(executor, input, points.max(0)).await
    }

    async fn upsert_with_points<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &UpsertUser<'_>,
        points: i64,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, name, email, role, department, points) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET \
                name = CASE WHEN EXCLUDED.name = '' THEN users.name ELSE EXCLUDED.name END, \
                email = EXCLUDED.email, \
                role = EXCLUDED.role, \
                department = EXCLUDED.department, \
                points = users.points + EXCLUDED.points \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.id)
            .bind(input.name)
            .bind(input.email)
            .bind(input.role)
            .bind(input.department)
            .bind(points)
            .fetch_one(executor)
            .await
    }

    /// Find a user by subject.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    ///
    /// Email is not unique across identity subjects; the earliest account wins.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) \
             ORDER BY created_at ASC, id ASC LIMIT 1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// Top users by points. Ties go to the earlier account.
    pub async fn leaderboard(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardEntry>(
            "SELECT name, email, points FROM users \
             ORDER BY points DESC, created_at ASC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
