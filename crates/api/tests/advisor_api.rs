//! HTTP-level tests for the advisory endpoints, the correction log and the
//! geocoding proxy. External services are replaced by in-process stubs.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, get, get_auth, post_json_auth, FailingPriority, StubClassifier, StubPriority,
    ADMIN, TEST_IMAGE,
};
use sqlx::PgPool;

fn priority_body() -> serde_json::Value {
    serde_json::json!({
        "issue_type": "open_manhole",
        "description": "Cover missing next to the school gate",
        "location": "MG Road",
        "has_image": true,
    })
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn priority_advice_is_normalized(pool: PgPool) {
    let mut state = common::test_state(pool);
    state.priority = Some(Arc::new(StubPriority("  **CRITICAL**\n")));
    let app = common::build_app(state);

    let response = post_json_auth(app, "/api/v1/advisors/priority", priority_body(), "a@x.com").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["advice"], "critical");
    assert_eq!(json["data"]["priority"], "high");
    assert_eq!(json["data"]["criticality"], "Critical");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unrecognized_priority_answer_defaults_to_normal(pool: PgPool) {
    let mut state = common::test_state(pool);
    state.priority = Some(Arc::new(StubPriority("I am not sure")));
    let app = common::build_app(state);

    let response = post_json_auth(app, "/api/v1/advisors/priority", priority_body(), "a@x.com").await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["advice"], "normal");
    assert_eq!(json["data"]["priority"], "medium");
    assert_eq!(json["data"]["criticality"], "Normal");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failing_priority_advisor_returns_502(pool: PgPool) {
    let mut state = common::test_state(pool);
    state.priority = Some(Arc::new(FailingPriority));
    let app = common::build_app(state);

    let response = post_json_auth(app, "/api/v1/advisors/priority", priority_body(), "a@x.com").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "ADVISOR_UNAVAILABLE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unconfigured_priority_advisor_returns_502(pool: PgPool) {
    let mut state = common::test_state(pool);
    state.priority = None;
    let app = common::build_app(state);

    let response = post_json_auth(app, "/api/v1/advisors/priority", priority_body(), "a@x.com").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["error"], "The priority service is not configured");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn priority_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::post_json(app, "/api/v1/advisors/priority", priority_body()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn classification_suggests_matching_issue_type(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "image": TEST_IMAGE });
    let response = post_json_auth(app, "/api/v1/advisors/classify", body, "a@x.com").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["label"], "Open Manhole");
    assert_eq!(json["data"]["normalized_label"], "open_manhole");
    assert_eq!(json["data"]["suggestion"], "open_manhole");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unmatched_label_leaves_suggestion_empty(pool: PgPool) {
    let mut state = common::test_state(pool);
    state.classifier = Some(Arc::new(StubClassifier("graffiti")));
    let app = common::build_app(state);

    let body = serde_json::json!({ "image": TEST_IMAGE });
    let response = post_json_auth(app, "/api/v1/advisors/classify", body, "a@x.com").await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["label"], "graffiti");
    assert!(json["data"]["suggestion"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn undecodable_image_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "image": "data:image/png;base64,***not base64***" });
    let response = post_json_auth(app, "/api/v1/advisors/classify", body, "a@x.com").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unconfigured_classifier_returns_502(pool: PgPool) {
    let mut state = common::test_state(pool);
    state.classifier = None;
    let app = common::build_app(state);

    let body = serde_json::json!({ "image": TEST_IMAGE });
    let response = post_json_auth(app, "/api/v1/advisors/classify", body, "a@x.com").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// ---------------------------------------------------------------------------
// Correction log
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn correction_with_equal_labels_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "image": TEST_IMAGE,
        "predicted": "Garbage ",
        "actual": "garbage",
    });
    let response = post_json_auth(app, "/api/v1/corrected", body, "a@x.com").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Predicted and actual labels must differ");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn correction_is_stored_normalized(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "image": TEST_IMAGE,
        "predicted": "Fallen Trees",
        "actual": "garbage",
    });
    let response = post_json_auth(app.clone(), "/api/v1/corrected", body, "a@x.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["predicted"], "fallen_trees");
    assert_eq!(json["data"]["actual"], "garbage");

    let response = get_auth(app, "/api/v1/corrected", ADMIN).await;
    let json = body_json(response).await;
    let records = json["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["predicted"], "fallen_trees");
}

// ---------------------------------------------------------------------------
// Geocoding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reverse_geocode_passes_provider_answer_through(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/geocode/reverse?lat=18.52&lon=73.85", "a@x.com").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["data"]["results"][0]["formatted_address"],
        "FC Road, Pune"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reverse_geocode_rejects_invalid_coordinates(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/geocode/reverse?lat=95&lon=73.85", "a@x.com").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reverse_geocode_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/geocode/reverse?lat=18.52&lon=73.85").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
