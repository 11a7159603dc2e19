use axum::routing::{get, post};
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Routes mounted at `/analytics`.
///
/// ```text
/// POST   /area             -> area
/// GET    /overview         -> dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/area", post(analytics::area))
        .route("/overview", get(analytics::dashboard))
}
