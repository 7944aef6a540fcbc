//! Application configuration management.
//!
//! Configuration comes from environment variables, deserialized into a
//! type-safe struct by the `envy` crate.

use chrono::Duration;
use serde::Deserialize;

use crate::models::access_key::QuotaSettings;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (optional): Postgres connection string; when absent
///   the service runs on the volatile in-memory store
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DAILY_REQUEST_LIMIT` (optional): per-window request cap for
///   Developer keys, defaults to 500
/// - `QUOTA_WINDOW_HOURS` (optional): rolling window length, defaults to 24
/// - `DEFAULT_PAGE_SIZE` (optional): Developer-tier page size, defaults to 50
/// - `DOMAIN_CACHE_TTL_SECS` (optional): vocabulary cache TTL, defaults to 300
/// - `BOOTSTRAP_API_KEY` (optional): moderator key installed at startup
///   when not already present
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_daily_request_limit")]
    pub daily_request_limit: i64,

    #[serde(default = "default_quota_window_hours")]
    pub quota_window_hours: i64,

    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    #[serde(default = "default_domain_cache_ttl_secs")]
    pub domain_cache_ttl_secs: u64,

    #[serde(default)]
    pub bootstrap_api_key: Option<String>,
}

fn default_port() -> u16 {
    3000
}

fn default_daily_request_limit() -> i64 {
    500
}

fn default_quota_window_hours() -> i64 {
    24
}

fn default_page_size() -> u64 {
    50
}

fn default_domain_cache_ttl_secs() -> u64 {
    300
}

impl Config {
    /// Load configuration from environment variables, honoring an optional
    /// `.env` file.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
    }

    /// Quota limits in the shape the auth middleware consumes.
    pub fn quota_settings(&self) -> QuotaSettings {
        QuotaSettings {
            daily_request_limit: self.daily_request_limit,
            window: Duration::hours(self.quota_window_hours),
        }
    }
}
