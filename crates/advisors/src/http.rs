//! Shared response handling for the advisor clients.

use std::time::Duration;

use crate::error::AdvisorError;

/// Per-request timeout for advisor calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Build the HTTP client shared by all advisors.
pub fn build_client() -> Result<reqwest::Client, AdvisorError> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or an [`AdvisorError::ApiError`] containing the
/// status and body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, AdvisorError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(AdvisorError::ApiError {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AdvisorError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}
