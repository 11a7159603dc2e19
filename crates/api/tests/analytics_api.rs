//! HTTP-level tests for analytics, points and the leaderboard.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, get, get_auth, patch_json_auth, post_json, post_json_auth, submit_pothole,
    ROADS_STAFF, TEST_IMAGE,
};
use sqlx::PgPool;

async fn submit_garbage(app: axum::Router, email: &str, lat: f64, lng: f64) {
    let body = serde_json::json!({
        "issue_type": "garbage",
        "image": TEST_IMAGE,
        "latitude": lat,
        "longitude": lng,
    });
    let response = post_json_auth(app, "/api/v1/issues", body, email).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Area report
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn area_groups_issues_inside_radius(pool: PgPool) {
    let app = common::build_test_app(pool);
    submit_pothole(app.clone(), "a@x.com", 18.52, 73.85).await;
    submit_pothole(app.clone(), "b@x.com", 18.525, 73.85).await;
    submit_garbage(app.clone(), "a@x.com", 18.52, 73.855).await;
    // About 55 km north, outside the default 5 km.
    submit_garbage(app.clone(), "c@x.com", 19.02, 73.85).await;

    let body = serde_json::json!({ "lat": 18.52, "lng": 73.85 });
    let response = post_json(app, "/api/v1/analytics/area", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["radius_km"], 5.0);
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["categories"]["potholes"]["count"], 2);
    assert_eq!(json["data"]["categories"]["garbage"]["count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn area_rejects_radius_above_limit(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "lat": 18.52, "lng": 73.85, "radius_km": 500.0 });
    let response = post_json(app, "/api/v1/analytics/area", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_area_reports_zero(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "lat": 0.0, "lng": 0.0, "radius_km": 1.0 });
    let response = post_json(app, "/api/v1/analytics/area", body).await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 0);
    assert!(json["data"]["categories"].as_object().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Dashboard overview
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn overview_counts_by_status_and_department(pool: PgPool) {
    let app = common::build_test_app(pool);
    let issue = submit_pothole(app.clone(), "a@x.com", 18.52, 73.85).await;
    submit_garbage(app.clone(), "b@x.com", 18.53, 73.85).await;
    patch_json_auth(
        app.clone(),
        &format!("/api/v1/issues/{}/status", issue["id"]),
        serde_json::json!({ "status": "resolved" }),
        ROADS_STAFF,
    )
    .await;

    let response = get(app, "/api/v1/analytics/overview?interval=month").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["total"], 2);
    assert_eq!(data["open"], 1);
    assert_eq!(data["resolved"], 1);
    assert_eq!(data["in_progress"], 0);
    assert_eq!(data["by_type"]["potholes"], 1);
    assert_eq!(data["by_department"]["DEPT_PWD"], 1);
    assert_eq!(data["by_department"]["DEPT_ENV"], 1);
    let series = data["series"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["count"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn overview_rejects_unknown_interval(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/analytics/overview?interval=decade").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Points and leaderboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn points_report_badge_for_email(pool: PgPool) {
    let app = common::build_test_app(pool);
    submit_pothole(app.clone(), "a@x.com", 18.52, 73.85).await;

    let response = get_auth(app.clone(), "/api/v1/users/points?email=a@x.com", "b@x.com").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["points"], 10);
    assert_eq!(json["data"]["badge"], "bronze_reporter");

    let response = get_auth(app, "/api/v1/users/points?email=ghost@x.com", "b@x.com").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn leaderboard_ranks_top_three_by_points(pool: PgPool) {
    let app = common::build_test_app(pool);
    for (email, count) in [("a@x.com", 1), ("b@x.com", 3), ("c@x.com", 2), ("d@x.com", 0)] {
        for i in 0..count {
            submit_pothole(app.clone(), email, 18.5 + f64::from(i) * 0.01, 73.85).await;
        }
    }

    let response = get(app.clone(), "/api/v1/leaderboard").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let ranked = json["data"].as_array().unwrap();
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0]["rank"], 1);
    assert_eq!(ranked[0]["email"], "b@x.com");
    assert_eq!(ranked[0]["points"], 30);
    assert_eq!(ranked[1]["email"], "c@x.com");
    assert_eq!(ranked[2]["email"], "a@x.com");

    let response = get(app, "/api/v1/leaderboard?limit=10").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}
