//! Client configuration

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Default request deadline. Not caller-configurable per call: exceeding it
/// is treated exactly like a connection failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address every relative path is resolved against
    pub base_url: String,
    /// Hard deadline applied independently to each request attempt
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Build configuration from the environment.
    ///
    /// Reads `BOTDECK_API_URL` and `BOTDECK_TIMEOUT_SECS`, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        // Try to load .env file (ignore errors)
        let _ = dotenvy::dotenv();

        let base_url = std::env::var("BOTDECK_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:8080".to_string());

        let timeout = std::env::var("BOTDECK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self { base_url, timeout }
    }
}

/// Trim, drop any trailing slash, and require an http(s) scheme with a host.
pub(crate) fn normalize_base_url(raw: &str) -> ClientResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::InvalidBaseUrl("empty".to_string()));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ClientError::InvalidBaseUrl(trimmed.to_string()));
    }
    let Some((_, remainder)) = trimmed.split_once("://") else {
        return Err(ClientError::InvalidBaseUrl(trimmed.to_string()));
    };
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(ClientError::InvalidBaseUrl(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}
