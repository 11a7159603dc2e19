//! Image classification advisor.
//!
//! The classifier exposes `POST {base}/predict` taking a multipart `file`
//! field and answering `{ "class": "<label>", "confidence": 0.97 }`.

use async_trait::async_trait;
use base64::Engine;
use civic_core::classification::strip_data_url;
use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;
use crate::http::parse_response;

/// Raw classifier answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "class")]
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Returns the classifier's label for an image.
#[async_trait]
pub trait ClassificationAdvisor: Send + Sync {
    async fn classify(&self, image: Vec<u8>) -> Result<Classification, AdvisorError>;
}

/// Decode a base64 image, with or without a `data:` URL prefix.
pub fn decode_image(image: &str) -> Result<Vec<u8>, AdvisorError> {
    let payload = strip_data_url(image);
    if payload.is_empty() {
        return Err(AdvisorError::InvalidImage("image is empty".to_string()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AdvisorError::InvalidImage(e.to_string()))
}

/// HTTP client for the classification service.
pub struct ClassifierClient {
    client: reqwest::Client,
    base_url: String,
}

impl ClassifierClient {
    /// * `base_url` - e.g. `http://127.0.0.1:5000`.
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ClassificationAdvisor for ClassifierClient {
    async fn classify(&self, image: Vec<u8>) -> Result<Classification, AdvisorError> {
        let part = reqwest::multipart::Part::bytes(image).file_name("upload.jpg");
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let classification: Classification = parse_response(response).await?;
        tracing::debug!(
            label = %classification.label,
            confidence = classification.confidence,
            "Classifier answered"
        );
        Ok(classification)
    }
}
