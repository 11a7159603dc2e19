//! HTTP clients for the external advisory services.
//!
//! - [`GeminiClient`]: generative-AI priority suggestion ([`PriorityAdvisor`]).
//! - [`ClassifierClient`]: image classification ([`ClassificationAdvisor`]).
//! - [`GeocodeClient`]: reverse geocoding ([`ReverseGeocoder`]).
//!
//! The traits are the seams the API depends on. Each client returns the
//! service's raw answer; normalization happens in `civic-core`.

pub mod classifier;
pub mod error;
pub mod geocode;
mod http;
pub mod priority;

pub use classifier::{decode_image, Classification, ClassificationAdvisor, ClassifierClient};
pub use error::AdvisorError;
pub use geocode::{GeocodeClient, ReverseGeocoder};
pub use http::build_client;
pub use priority::{GeminiClient, PriorityAdvisor};
