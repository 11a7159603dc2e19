//! Handlers for user records, points and the leaderboard.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use civic_core::error::CoreError;
use civic_core::points::{Badge, DEFAULT_LEADERBOARD_SIZE, MAX_LEADERBOARD_SIZE};
use civic_core::search::clamp_limit;
use civic_db::models::user::{
    LeaderboardEntry, LeaderboardParams, PointsParams, RegisterUser, UserWithBadge,
};
use civic_db::repositories::UserRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::lifecycle::upsert_input;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Points and badge for one email.
#[derive(Debug, Serialize)]
pub struct PointsSummary {
    pub email: String,
    pub points: i64,
    pub badge: Badge,
    pub badge_title: &'static str,
}

/// A leaderboard row with its rank and badge.
#[derive(Debug, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    pub badge: Badge,
    pub badge_title: &'static str,
}

/// POST /api/v1/users
///
/// Create or refresh the caller's user row. Role and department come from
/// the allow-list; a `name` in the body overrides the token's.
pub async fn register(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterUser>,
) -> AppResult<impl IntoResponse> {
    let mut upsert = upsert_input(&auth);
    if let Some(name) = input.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        upsert.name = name;
    }

    let user = UserRepo::upsert(&state.pool, &upsert).await?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        role = %user.role,
        "User registered"
    );

    Ok(Json(DataResponse {
        data: UserWithBadge::from(user),
    }))
}

/// GET /api/v1/users/me
pub async fn me(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, &auth.sub)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::MissingRecord {
                entity: "User",
                key: auth.sub.clone(),
            })
        })?;

    Ok(Json(DataResponse {
        data: UserWithBadge::from(user),
    }))
}

/// GET /api/v1/users/points?email=
pub async fn points(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PointsParams>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_email(&state.pool, params.email.trim())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::MissingRecord {
                entity: "User",
                key: params.email.clone(),
            })
        })?;

    let badge = user.badge();
    Ok(Json(DataResponse {
        data: PointsSummary {
            email: user.email,
            points: user.points,
            badge,
            badge_title: badge.title(),
        },
    }))
}

/// GET /api/v1/leaderboard?limit=
///
/// Top users by points. Defaults to the top three.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_LEADERBOARD_SIZE, MAX_LEADERBOARD_SIZE);
    let entries = UserRepo::leaderboard(&state.pool, limit).await?;

    let ranked: Vec<RankedEntry> = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let badge = Badge::for_points(entry.points);
            RankedEntry {
                rank: i + 1,
                entry,
                badge,
                badge_title: badge.title(),
            }
        })
        .collect();

    Ok(Json(DataResponse { data: ranked }))
}
