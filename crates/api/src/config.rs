use civic_advisors::geocode::DEFAULT_GEOCODE_BASE_URL;
use civic_advisors::priority::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Path of the staff allow-list JSON. `None` means everybody is a plain user.
    pub access_list_path: Option<String>,
    /// Token validation settings.
    pub jwt: JwtConfig,
    /// External advisory services.
    pub advisors: AdvisorConfig,
}

/// Endpoints and keys for the advisory services. A service whose key or URL
/// is missing stays disabled.
#[derive(Debug, Clone, Default)]
pub struct AdvisorConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub classifier_url: Option<String>,
    pub geocode_api_key: Option<String>,
    pub geocode_base_url: String,
}

impl AdvisorConfig {
    /// | Env Var            | Default                   |
    /// |--------------------|---------------------------|
    /// | `GEMINI_API_KEY`   | unset (disabled)          |
    /// | `GEMINI_MODEL`     | `gemini-2.5-flash`        |
    /// | `GEMINI_BASE_URL`  | Google `v1beta` endpoint  |
    /// | `CLASSIFIER_URL`   | unset (disabled)          |
    /// | `GEOCODE_API_KEY`  | unset (disabled)          |
    /// | `GEOCODE_BASE_URL` | MapmyIndia endpoint       |
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_model: non_empty_var("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: non_empty_var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            classifier_url: non_empty_var("CLASSIFIER_URL"),
            geocode_api_key: non_empty_var("GEOCODE_API_KEY"),
            geocode_base_url: non_empty_var("GEOCODE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEOCODE_BASE_URL.to_string()),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `ACCESS_LIST_PATH`     | unset                      |
    ///
    /// JWT settings come from [`JwtConfig::from_env`], advisor settings from
    /// [`AdvisorConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            access_list_path: non_empty_var("ACCESS_LIST_PATH"),
            jwt: JwtConfig::from_env(),
            advisors: AdvisorConfig::from_env(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
