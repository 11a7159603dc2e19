//! Request body extractor that runs `validator` rules after deserializing.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has passed its [`Validate`] rules.
///
/// Malformed JSON is a 400 `BAD_REQUEST`; a rule violation is a 400
/// `VALIDATION_ERROR`.
///
/// ```ignore
/// async fn create(ValidatedJson(input): ValidatedJson<CreateIssue>) -> AppResult<...>
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
