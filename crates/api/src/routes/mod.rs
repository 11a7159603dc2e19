pub mod advisor;
pub mod analytics;
pub mod health;
pub mod issue;
pub mod notification;
pub mod user;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                        register (POST)
/// /users/me                     own record with badge
/// /users/points                 points for an email
/// /leaderboard                  top users by points (public)
///
/// /issues                       list (public), create, like/comment (PATCH)
/// /issues/mine                  caller's submissions
/// /issues/duplicates            same-type issues nearby (public)
/// /issues/{id}                  detail (public), edit, delete
/// /issues/{id}/status           status transition (staff)
///
/// /admin/issues                 department work queue (staff)
///
/// /notifications                list
/// /notifications/unread-count   count
/// /notifications/read-all       mark all read (PATCH)
/// /notifications/{id}/read      mark one read (PATCH)
///
/// /advisors/priority            priority suggestion
/// /advisors/classify            image classification suggestion
/// /corrected                    record (POST), list (GET, admin)
///
/// /analytics/area               per-type figures in a radius (public)
/// /analytics/overview           dashboard totals and series (public)
///
/// /geocode/reverse              reverse geocoding proxy
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Users and gamification.
        .nest("/users", user::router())
        .route("/leaderboard", get(handlers::user::leaderboard))
        // Issues: submission, discovery, likes/comments, lifecycle.
        .nest("/issues", issue::router())
        // Staff queue.
        .route("/admin/issues", get(handlers::admin::issue_queue))
        // In-app notifications.
        .nest("/notifications", notification::router())
        // Advisory services and the correction log.
        .nest("/advisors", advisor::router())
        .nest("/corrected", advisor::corrected_router())
        .nest("/geocode", advisor::geocode_router())
        // Analytics.
        .nest("/analytics", analytics::router())
}
