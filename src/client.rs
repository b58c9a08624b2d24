use crate::config::Config;
use crate::error::Error;
use crate::http::{self, ApiCall};
use reqwest::Response;
use serde_json::Value;

/// Handle to the fluxpoint.dev API. Each call opens its own short-lived
/// transport session; nothing is shared or reused across calls.
#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
}

impl Client {
    /// Client against the production endpoint.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            config: Config::new(api_token),
        }
    }

    /// Client against an arbitrary base URL (staging, mock servers).
    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            config: Config::with_base_url(api_token, base_url),
        }
    }

    /// Client from `FLUXPOINT_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            config: Config::from_env()?,
        })
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute a call and decode the 200 response body as JSON.
    pub async fn execute(&self, call: &ApiCall) -> Result<Value, Error> {
        let res = http::perform(&self.config, call).await?;
        Ok(res.json::<Value>().await?)
    }

    /// Execute a call and hand back the raw 200 response, body unread.
    pub async fn execute_raw(&self, call: &ApiCall) -> Result<Response, Error> {
        http::perform(&self.config, call).await
    }
}
