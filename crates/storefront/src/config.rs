//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All are optional; defaults match the development deployment where the
//! six backend services listen on localhost ports 8081-8086.
//!
//! - `PRISM_USER_SERVICE_URL` - user/auth service (default: http://localhost:8081)
//! - `PRISM_PRODUCT_SERVICE_URL` - product catalog service (default: http://localhost:8082)
//! - `PRISM_ORDER_SERVICE_URL` - order service (default: http://localhost:8083)
//! - `PRISM_PAYMENT_SERVICE_URL` - payment service (default: http://localhost:8084)
//! - `PRISM_SHIPPING_SERVICE_URL` - shipping service (default: http://localhost:8085)
//! - `PRISM_REVIEW_SERVICE_URL` - review service (default: http://localhost:8086)
//! - `PRISM_POLL_INTERVAL_MS` - status poll interval (default: 1500)
//! - `PRISM_POLL_MAX_ATTEMPTS` - total poll attempt budget (default: 200)
//! - `PRISM_POLL_MAX_FAILURES` - consecutive failed-tick budget (default: 40)
//! - `PRISM_LOCAL_STORE_PATH` - fallback blob path (default: .prism/session.json)
//! - `PRISM_DEV_ADMIN_BYPASS` - honor the development admin login
//!   bypass; only effective in debug builds (default: false)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
///
/// Every variable has a default, so the only way loading fails is a
/// value that is present but unparseable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URLs for the six backend services.
    pub services: ServiceUrls,
    /// Status-polling behavior for the checkout sequencer.
    pub polling: PollingConfig,
    /// Path for the best-effort persisted session blob.
    pub local_store_path: PathBuf,
    /// Honor the development-only admin login bypass.
    ///
    /// Ignored entirely in release builds; see `UserClient::login`.
    pub dev_admin_bypass: bool,
}

/// Base URLs of the backend service collaborators.
#[derive(Debug, Clone)]
pub struct ServiceUrls {
    pub users: Url,
    pub products: Url,
    pub orders: Url,
    pub payments: Url,
    pub shipping: Url,
    pub reviews: Url,
}

/// Polling knobs for payment/shipment status confirmation.
#[derive(Debug, Clone, Copy)]
pub struct PollingConfig {
    /// Base delay between poll ticks.
    pub interval: Duration,
    /// Total attempt budget before the poll gives up.
    pub max_attempts: u32,
    /// Consecutive failed ticks before the backend is declared broken.
    pub max_consecutive_failures: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
            max_attempts: 200,
            max_consecutive_failures: 40,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let services = ServiceUrls {
            users: get_url_or_default("PRISM_USER_SERVICE_URL", "http://localhost:8081")?,
            products: get_url_or_default("PRISM_PRODUCT_SERVICE_URL", "http://localhost:8082")?,
            orders: get_url_or_default("PRISM_ORDER_SERVICE_URL", "http://localhost:8083")?,
            payments: get_url_or_default("PRISM_PAYMENT_SERVICE_URL", "http://localhost:8084")?,
            shipping: get_url_or_default("PRISM_SHIPPING_SERVICE_URL", "http://localhost:8085")?,
            reviews: get_url_or_default("PRISM_REVIEW_SERVICE_URL", "http://localhost:8086")?,
        };

        let polling = PollingConfig {
            interval: Duration::from_millis(get_parsed_or_default(
                "PRISM_POLL_INTERVAL_MS",
                1500,
            )?),
            max_attempts: get_parsed_or_default("PRISM_POLL_MAX_ATTEMPTS", 200)?,
            max_consecutive_failures: get_parsed_or_default("PRISM_POLL_MAX_FAILURES", 40)?,
        };

        let local_store_path =
            PathBuf::from(get_env_or_default("PRISM_LOCAL_STORE_PATH", ".prism/session.json"));

        let dev_admin_bypass = get_parsed_or_default("PRISM_DEV_ADMIN_BYPASS", false)?;

        Ok(Self {
            services,
            polling,
            local_store_path,
            dev_admin_bypass,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed as a URL, with a default.
fn get_url_or_default(key: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = get_env_or_default(key, default);
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an environment variable parsed as `T`, with a default.
fn get_parsed_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
