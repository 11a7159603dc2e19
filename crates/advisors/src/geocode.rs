//! Reverse geocoding through the MapmyIndia REST API.

use async_trait::async_trait;

use crate::error::AdvisorError;
use crate::http::parse_response;

/// Default MapmyIndia advanced-maps base URL.
pub const DEFAULT_GEOCODE_BASE_URL: &str = "https://apis.mapmyindia.com/advancedmaps/v1";

/// Resolves a coordinate to the provider's address document.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, lat: f64, lng: f64) -> Result<serde_json::Value, AdvisorError>;
}

/// HTTP client for reverse geocoding.
pub struct GeocodeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeocodeClient {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl ReverseGeocoder for GeocodeClient {
    /// `GET {base}/{key}/rev_geocode?lat=..&lng=..`; the body is passed
    /// through unchanged.
    async fn reverse(&self, lat: f64, lng: f64) -> Result<serde_json::Value, AdvisorError> {
        let response = self
            .client
            .get(format!("{}/{}/rev_geocode", self.base_url, self.api_key))
            .query(&[("lat", lat), ("lng", lng)])
            .send()
            .await?;

        parse_response(response).await
    }
}
