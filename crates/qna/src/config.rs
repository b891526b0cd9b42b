use std::time::Duration;

use crate::prelude::*;

/// Connection settings for the questions API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Default API base URL (local backend)
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8081/api/v1";

    /// Default request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();

        if base_url.is_empty() {
            return Err(eyre!("API base URL must not be empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(eyre!(
                "API base URL must start with http:// or https://: {}",
                base_url
            ));
        }
        if timeout.is_zero() {
            return Err(eyre!("Request timeout must be greater than zero"));
        }

        Ok(Self { base_url, timeout })
    }

    /// Build the configuration from the global CLI flags
    pub fn from_global(global: &crate::Global) -> Result<Self> {
        Self::new(
            global.api_url.clone(),
            Duration::from_secs(global.timeout),
        )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}
