/// Errors from the advisory service clients.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Advisor API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered 2xx but without the expected content.
    #[error("Advisor returned no usable answer: {0}")]
    EmptyResponse(String),

    /// The submitted image could not be decoded.
    #[error("Invalid image payload: {0}")]
    InvalidImage(String),
}

// Request URLs can carry API keys in the path or query.
impl From<reqwest::Error> for AdvisorError {
    fn from(err: reqwest::Error) -> Self {
        AdvisorError::Request(err.without_url())
    }
}
