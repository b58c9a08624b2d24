use std::env;

use crate::error::Error;

/// Production API root. Endpoints are concatenated onto this verbatim.
pub const DEFAULT_BASE_URL: &str = "https://api.fluxpoint.dev/";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the fluxpoint API client.
/// Values are fixed at construction and owned by the client instance.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Configuration against the production endpoint.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self::with_base_url(api_token, DEFAULT_BASE_URL)
    }

    /// Configuration against an arbitrary base URL (staging, mock servers).
    /// A missing trailing `/` is appended; no other URL normalization is
    /// performed, so leading separators on endpoints are the caller's problem.
    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: normalize_base_url(base_url.into()),
            user_agent: format!("fluxpoint/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - FLUXPOINT_TOKEN [required]
    /// - FLUXPOINT_API_URL (default: https://api.fluxpoint.dev/)
    /// - FLUXPOINT_HTTP_TIMEOUT_SECS (default: 30)
    pub fn from_env() -> Result<Self, Error> {
        let api_token = env::var("FLUXPOINT_TOKEN")
            .map_err(|_| Error::Config("Missing FLUXPOINT_TOKEN".to_string()))?;
        let base_url =
            env::var("FLUXPOINT_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("FLUXPOINT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut cfg = Self::with_base_url(api_token, base_url);
        cfg.timeout_secs = timeout_secs;
        Ok(cfg)
    }
}

fn normalize_base_url(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
