//! User entity model and DTOs.

use civic_core::points::Badge;
use civic_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `users` table. `id` is the identity provider's subject.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub points: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn badge(&self) -> Badge {
        Badge::for_points(self.points)
    }
}

/// Identity fields written by an upsert. Role and department come from the
/// access list, never from the client.
#[derive(Debug, Clone)]
pub struct UpsertUser<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub department: Option<&'a str>,
}

/// Body of `POST /users`. Everything else comes from the token.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterUser {
    #[validate(length(max = 200))]
    pub name: Option<String>,
}

/// A user with the badge derived from their points.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithBadge {
    #[serde(flatten)]
    pub user: User,
    pub badge: Badge,
    pub badge_title: &'static str,
}

impl From<User> for UserWithBadge {
    fn from(user: User) -> Self {
        let badge = user.badge();
        Self {
            user,
            badge,
            badge_title: badge.title(),
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub email: String,
    pub points: i64,
}

/// Query parameters for user point lookups.
#[derive(Debug, Deserialize)]
pub struct PointsParams {
    pub email: String,
}

/// Query parameters for the leaderboard.
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}
