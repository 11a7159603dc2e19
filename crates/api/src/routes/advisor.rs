//! Route definitions for advisory services, corrections and geocoding.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{advisor, corrected, geocode};
use crate::state::AppState;

/// Routes mounted at `/advisors`.
///
/// ```text
/// POST   /priority         -> suggest_priority
/// POST   /classify         -> classify_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/priority", post(advisor::suggest_priority))
        .route("/classify", post(advisor::classify_image))
}

/// Routes mounted at `/corrected`.
pub fn corrected_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(corrected::list_corrections).post(corrected::record_correction),
    )
}

/// Routes mounted at `/geocode`.
pub fn geocode_router() -> Router<AppState> {
    Router::new().route("/reverse", get(geocode::reverse))
}
