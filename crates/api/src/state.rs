use std::sync::Arc;

use civic_advisors::{ClassificationAdvisor, PriorityAdvisor, ReverseGeocoder};
use civic_core::access::AccessList;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: civic_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Staff allow-list, loaded once at startup.
    pub access: Arc<AccessList>,
    /// Priority advisor; `None` when not configured.
    pub priority: Option<Arc<dyn PriorityAdvisor>>,
    /// Image classification advisor; `None` when not configured.
    pub classifier: Option<Arc<dyn ClassificationAdvisor>>,
    /// Reverse geocoder; `None` when not configured.
    pub geocoder: Option<Arc<dyn ReverseGeocoder>>,
    /// Whether status notifications also queue an email.
    pub email_enabled: bool,
}
