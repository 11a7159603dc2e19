#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use civic_advisors::{
    AdvisorError, Classification, ClassificationAdvisor, PriorityAdvisor, ReverseGeocoder,
};
use civic_core::access::AccessList;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use civic_api::auth::jwt::{generate_access_token, JwtConfig};
use civic_api::config::{AdvisorConfig, ServerConfig};
use civic_api::router::build_app_router;
use civic_api::state::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

pub const ADMIN: &str = "admin@city.gov";
pub const ROADS_STAFF: &str = "roads@city.gov";
pub const WATER_STAFF: &str = "water@city.gov";

/// Base64 of `hello` behind a data URL prefix. The stubs never decode it further.
pub const TEST_IMAGE: &str = "data:image/png;base64,aGVsbG8=";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        access_list_path: None,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            issuer: None,
        },
        advisors: AdvisorConfig::default(),
    }
}

/// One admin plus staff for the public-works and water departments.
pub fn test_access_list() -> AccessList {
    AccessList::from_json(&format!(
        r#"{{
            "version": 1,
            "admins": ["{ADMIN}"],
            "departments": {{
                "DEPT_PWD": ["{ROADS_STAFF}"],
                "DEPT_WATER": ["{WATER_STAFF}"]
            }}
        }}"#
    ))
    .expect("test access list should parse")
}

// ---------------------------------------------------------------------------
// Advisor stubs
// ---------------------------------------------------------------------------

/// Answers every prompt with a fixed string.
pub struct StubPriority(pub &'static str);

#[async_trait]
impl PriorityAdvisor for StubPriority {
    async fn suggest_priority(&self, _prompt: &str) -> Result<String, AdvisorError> {
        Ok(self.0.to_string())
    }
}

/// Always fails as an overloaded upstream would.
pub struct FailingPriority;

#[async_trait]
impl PriorityAdvisor for FailingPriority {
    async fn suggest_priority(&self, _prompt: &str) -> Result<String, AdvisorError> {
        Err(AdvisorError::ApiError {
            status: 503,
            body: "model overloaded".to_string(),
        })
    }
}

/// Labels every image the same way.
pub struct StubClassifier(pub &'static str);

#[async_trait]
impl ClassificationAdvisor for StubClassifier {
    async fn classify(&self, _image: Vec<u8>) -> Result<Classification, AdvisorError> {
        Ok(Classification {
            label: self.0.to_string(),
            confidence: 0.93,
        })
    }
}

/// Returns a canned provider document.
pub struct StubGeocoder;

#[async_trait]
impl ReverseGeocoder for StubGeocoder {
    async fn reverse(&self, lat: f64, lng: f64) -> Result<serde_json::Value, AdvisorError> {
        Ok(serde_json::json!({
            "results": [{ "formatted_address": "FC Road, Pune", "lat": lat, "lng": lng }]
        }))
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Application state with the test allow-list and working advisor stubs.
/// Email delivery is off.
pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        access: Arc::new(test_access_list()),
        priority: Some(Arc::new(StubPriority("Critical"))),
        classifier: Some(Arc::new(StubClassifier("Open Manhole"))),
        geocoder: Some(Arc::new(StubGeocoder)),
        email_enabled: false,
    }
}

/// Build the router around a prepared state, through the same middleware
/// stack production uses.
pub fn build_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

/// Build the full application router with the default test state.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app(test_state(pool))
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Subject id the test identity provider assigns to an email.
pub fn subject_for(email: &str) -> String {
    format!("test|{email}")
}

/// Mint a one-hour access token for `email`.
pub fn token_for(email: &str) -> String {
    token_with_subject(&subject_for(email), email)
}

/// Mint a one-hour access token for an explicit subject and email.
pub fn token_with_subject(subject: &str, email: &str) -> String {
    generate_access_token(subject, email, None, 3600, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<String>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, email: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token_for(email)), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    email: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token_for(email)), Some(body)).await
}

pub async fn post_json_bearer(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token.to_string()), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    email: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token_for(email)), Some(body)).await
}

pub async fn patch_auth(app: Router, uri: &str, email: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token_for(email)), None).await
}

pub async fn delete_auth(app: Router, uri: &str, email: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token_for(email)), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Submit a pothole report at the given point and return the `data` object.
pub async fn submit_pothole(app: Router, email: &str, lat: f64, lng: f64) -> serde_json::Value {
    let body = serde_json::json!({
        "issue_type": "potholes",
        "image": TEST_IMAGE,
        "latitude": lat,
        "longitude": lng,
        "landmark": "FC Road",
    });
    let response = post_json_auth(app, "/api/v1/issues", body, email).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
