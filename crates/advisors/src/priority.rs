//! Priority advisor backed by the Gemini `generateContent` REST endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;
use crate::http::parse_response;

/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini REST base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Returns the advisor's free-text answer to a priority prompt.
#[async_trait]
pub trait PriorityAdvisor: Send + Sync {
    async fn suggest_priority(&self, prompt: &str) -> Result<String, AdvisorError>;
}

/// HTTP client for Gemini.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        Some(text)
    }
}

impl GeminiClient {
    /// Create a client reusing an existing [`reqwest::Client`].
    ///
    /// * `base_url` - e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(client: reqwest::Client, base_url: String, model: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        }
    }
}

#[async_trait]
impl PriorityAdvisor for GeminiClient {
    /// Send a `POST /models/{model}:generateContent` request with the prompt
    /// as a single text part.
    async fn suggest_priority(&self, prompt: &str) -> Result<String, AdvisorError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: GenerateResponse = parse_response(response).await?;
        let text = parsed
            .text()
            .ok_or_else(|| AdvisorError::EmptyResponse("no candidates".to_string()))?;

        tracing::debug!(model = %self.model, answer = %text.trim(), "Priority advisor answered");
        Ok(text)
    }
}
