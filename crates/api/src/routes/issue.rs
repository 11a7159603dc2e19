//! Route definitions for the `/issues` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::issue;
use crate::state::AppState;

/// Routes mounted at `/issues`.
///
/// ```text
/// POST   /                 -> create_issue
/// GET    /                 -> list_issues
/// PATCH  /                 -> interact (like toggle / comment)
/// GET    /mine             -> my_issues
/// GET    /duplicates       -> find_duplicates
/// GET    /{id}             -> get_issue
/// PATCH  /{id}             -> update_issue
/// DELETE /{id}             -> delete_issue
/// PATCH  /{id}/status      -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(issue::list_issues)
                .post(issue::create_issue)
                .patch(issue::interact),
        )
        .route("/mine", get(issue::my_issues))
        .route("/duplicates", get(issue::find_duplicates))
        .route(
            "/{id}",
            get(issue::get_issue)
                .patch(issue::update_issue)
                .delete(issue::delete_issue),
        )
        .route("/{id}/status", patch(issue::update_status))
}
