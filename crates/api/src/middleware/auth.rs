//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use civic_core::access::{Assignment, Role};
use civic_core::error::CoreError;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated identity extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// The email is trimmed and lower-cased; it is the identity stored as issue
/// submitter, liker and notification recipient. Role and department are
/// resolved from the allow-list on every request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identity-provider subject (`claims.sub`).
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub assignment: Assignment,
}

impl AuthUser {
    pub fn role(&self) -> Role {
        self.assignment.role
    }

    pub fn is_admin(&self) -> bool {
        self.assignment.role == Role::Admin
    }

    /// Whether this identity owns a record whose owner is `identity`.
    pub fn is(&self, identity: &str) -> bool {
        self.email.eq_ignore_ascii_case(identity.trim())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let email = claims.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Token carries no email".into(),
            )));
        }

        Ok(AuthUser {
            assignment: state.access.resolve(&email),
            sub: claims.sub,
            email,
            name: claims.name.filter(|n| !n.trim().is_empty()),
        })
    }
}
