//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ROCKETSHOES_API_URL` - Inventory API base URL (default: <http://localhost:3333/>)
//! - `ROCKETSHOES_STORAGE_PATH` - Local storage file (default: .rocketshoes/storage.json)
//! - `ROCKETSHOES_CART_KEY` - Storage key for the cart snapshot (default: @RocketShoes:cart)
//! - `ROCKETSHOES_PRODUCT_CACHE_TTL_SECS` - Product metadata cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Storage key the browser storefront used for the cart snapshot.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

const DEFAULT_API_URL: &str = "http://localhost:3333/";
const DEFAULT_STORAGE_PATH: &str = ".rocketshoes/storage.json";
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Inventory API configuration
    pub inventory: InventoryConfig,
    /// Local file backing the key-value store
    pub storage_path: PathBuf,
    /// Key the cart snapshot is stored under
    pub cart_key: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Inventory API configuration.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Base URL; always ends with `/` so relative paths join beneath it
    pub base_url: Url,
    /// How long product metadata stays cached
    pub product_cache_ttl: Duration,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let inventory = InventoryConfig::from_env()?;
        let storage_path = PathBuf::from(get_env_or_default(
            "ROCKETSHOES_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));
        let cart_key = get_env_or_default("ROCKETSHOES_CART_KEY", DEFAULT_CART_KEY);
        if cart_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            inventory,
            storage_path,
            cart_key,
            sentry_dsn,
        })
    }
}

impl InventoryConfig {
    /// Build an inventory configuration from a base URL string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is
    /// not http(s).
    pub fn new(base_url: &str, product_cache_ttl: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("ROCKETSHOES_API_URL", base_url)?,
            product_cache_ttl,
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_env_or_default("ROCKETSHOES_API_URL", DEFAULT_API_URL);
        let ttl_secs = get_env_or_default(
            "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
            &DEFAULT_PRODUCT_CACHE_TTL_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar(
                "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS".to_string(),
                e.to_string(),
            )
        })?;

        Self::new(&base_url, Duration::from_secs(ttl_secs))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an API base URL, appending a trailing slash when missing.
///
/// Without the slash `Url::join` would replace the last path segment
/// (`http://host/api` + `stock/1` = `http://host/stock/1`).
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
