//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `COVU_API_URL` - Base URL of the REST API (default: https://covu.onrender.com/api)
//! - `COVU_PAGE_SIZE` - Items per page for list endpoints (default: 20)
//! - `COVU_DATA_DIR` - Directory holding `storage.json` (default: .covu)
//! - `COVU_PAYSTACK_PUBLIC_KEY` - Paystack public key for card payments

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://covu.onrender.com/api";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_DATA_DIR: &str = ".covu";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Covu client configuration.
///
/// Implements `Debug` manually to redact the payment key.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to, without trailing slash
    pub api_url: String,
    /// Page size sent with list requests
    pub page_size: u32,
    /// Directory for persisted session and cart data
    pub data_dir: PathBuf,
    /// Paystack public key, when card payments are enabled
    pub paystack_public_key: Option<SecretString>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("page_size", &self.page_size)
            .field("data_dir", &self.data_dir)
            .field(
                "paystack_public_key",
                &self.paystack_public_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            paystack_public_key: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = normalize_api_url(&get_env_or_default("COVU_API_URL", DEFAULT_API_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("COVU_API_URL".to_string(), e))?;
        let page_size = parse_page_size(&get_env_or_default(
            "COVU_PAGE_SIZE",
            &DEFAULT_PAGE_SIZE.to_string(),
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("COVU_PAGE_SIZE".to_string(), e))?;
        let data_dir = PathBuf::from(get_env_or_default("COVU_DATA_DIR", DEFAULT_DATA_DIR));
        let paystack_public_key =
            get_optional_env("COVU_PAYSTACK_PUBLIC_KEY").map(SecretString::from);

        Ok(Self {
            api_url,
            page_size,
            data_dir,
            paystack_public_key,
        })
    }

    /// Configuration pointing at `api_url`, otherwise default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an absolute http(s) URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_api_url(api_url)
                .map_err(|e| ConfigError::InvalidEnvVar("COVU_API_URL".to_string(), e))?,
            ..Self::default()
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Validate the base URL and strip trailing slashes.
///
/// The path is kept, so `https://host/api/` becomes `https://host/api`.
fn normalize_api_url(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

fn parse_page_size(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("must be a positive integer".to_owned()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keeps_path() {
        assert_eq!(
            normalize_api_url("https://covu.onrender.com/api/").unwrap(),
            "https://covu.onrender.com/api"
        );
        assert_eq!(
            normalize_api_url("http://127.0.0.1:8000").unwrap(),
            "http://127.0.0.1:8000"
        );
    }

    #[test]
    fn test_normalize_rejects_bad_urls() {
        assert!(normalize_api_url("not a url").is_err());
        assert!(normalize_api_url("ftp://covu.ng/api").is_err());
    }

    #[test]
    fn test_page_size() {
        assert_eq!(parse_page_size("50").unwrap(), 50);
        assert!(parse_page_size("0").is_err());
        assert!(parse_page_size("-1").is_err());
    }

    #[test]
    fn test_for_api_url() {
        let config = ClientConfig::for_api_url("http://localhost:9000/api/").unwrap();
        assert_eq!(config.api_url, "http://localhost:9000/api");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_debug_redacts_payment_key() {
        let config = ClientConfig {
            paystack_public_key: Some(SecretString::from("pk_live_very_secret")),
            ..ClientConfig::default()
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("covu.onrender.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("pk_live_very_secret"));
    }
}
