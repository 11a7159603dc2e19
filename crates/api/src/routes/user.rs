//! Route definitions for users and the leaderboard.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /                 -> register
/// GET    /me               -> me
/// GET    /points           -> points
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(user::register))
        .route("/me", get(user::me))
        .route("/points", get(user::points))
}
