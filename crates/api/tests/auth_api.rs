//! HTTP-level tests for bearer-token authentication, user registration and
//! role enforcement.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use civic_api::auth::jwt::generate_access_token;
use common::{
    body_json, get, get_auth, patch_json_auth, post_json_auth, ADMIN, ROADS_STAFF,
};
use sqlx::PgPool;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Token handling
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/users/me").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .uri("/api/v1/users/me")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_token_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = generate_access_token(
        "test|late@x.com",
        "late@x.com",
        None,
        -300,
        &common::test_config().jwt,
    )
    .unwrap();

    let request = Request::builder()
        .uri("/api/v1/users/me")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_bearer_scheme_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .uri("/api/v1/users/me")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_is_404_before_registration(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/users/me", "new@x.com").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_plain_user_with_bronze_badge(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "name": "Asha" });
    let response = post_json_auth(app.clone(), "/api/v1/users", body, "Asha@X.com").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "asha@x.com");
    assert_eq!(json["data"]["name"], "Asha");
    assert_eq!(json["data"]["role"], "user");
    assert_eq!(json["data"]["points"], 0);
    assert_eq!(json["data"]["badge"], "bronze_reporter");

    let response = get_auth(app, "/api/v1/users/me", "asha@x.com").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], common::subject_for("asha@x.com"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_takes_role_and_department_from_allow_list(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app.clone(), "/api/v1/users", serde_json::json!({}), ADMIN).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "admin");
    assert!(json["data"]["department"].is_null());

    let response =
        post_json_auth(app, "/api/v1/users", serde_json::json!({}), ROADS_STAFF).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "department");
    assert_eq!(json["data"]["department"], "DEPT_PWD");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_unknown_fields(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "name": "Asha", "role": "admin" });
    let response = post_json_auth(app, "/api/v1/users", body, "asha@x.com").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Role enforcement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn plain_user_cannot_change_status(pool: PgPool) {
    let app = common::build_test_app(pool);
    let issue = common::submit_pothole(app.clone(), "a@x.com", 18.52, 73.85).await;
    let id = issue["id"].as_i64().unwrap();

    let response = patch_json_auth(
        app,
        &format!("/api/v1/issues/{id}/status"),
        serde_json::json!({ "status": "resolved" }),
        "a@x.com",
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn plain_user_cannot_read_staff_queue(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/issues", "a@x.com").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_admin_lists_corrections(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/corrected", ROADS_STAFF).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/corrected", ADMIN).await;
    assert_eq!(response.status(), StatusCode::OK);
}
