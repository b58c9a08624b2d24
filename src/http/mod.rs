use crate::config::Config;
use crate::error::{Error, RateLimited};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Extra attempts permitted after the first before a 429 becomes terminal.
pub const RETRY_BUDGET: u32 = 10;

/// HTTP verbs accepted by the fluxpoint API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// One logical API call: verb, relative endpoint, optional JSON body, extra
/// headers, and whether the executor may absorb 429s by retrying.
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    pub allow_retry: bool,
}

impl ApiCall {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            headers: HeaderMap::new(),
            allow_retry: true,
        }
    }

    /// Attach a JSON request body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach extra request headers. `Authorization` and `User-Agent` entries
    /// are overwritten at dispatch time with the client's own identity.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Fail immediately on a 429 instead of sleeping and retrying.
    pub fn no_retry(mut self) -> Self {
        self.allow_retry = false;
        self
    }

    /// Verb-and-path description used in rate-limit errors, e.g. `GET users/1`.
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.endpoint)
    }
}

// Fresh transport per attempt; dropped when the attempt completes, so no
// connection state survives into a retry.
fn build_transport(cfg: &Config) -> reqwest::Result<HttpClient> {
    HttpClient::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .use_rustls_tls()
        .build()
}

/// Caller headers pass through except `Authorization` and `User-Agent`,
/// which always carry the client's own token and identifier.
pub fn identity_headers(cfg: &Config, extra: &HeaderMap) -> HeaderMap {
    let mut headers = extra.clone();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&cfg.api_token).expect("valid header"),
    );
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&cfg.user_agent).expect("valid header"),
    );
    headers
}

/// Lenient integer read of the Retry-After response header.
pub fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
}

/// Issue a call against `{base_url}{endpoint}`, absorbing 429 responses by
/// sleeping for the server-specified duration and re-issuing, up to
/// [`RETRY_BUDGET`] extra attempts. Returns the response only on status 200;
/// every other outcome is a typed error.
pub async fn perform(cfg: &Config, call: &ApiCall) -> Result<Response, Error> {
    let url = format!("{}{}", cfg.base_url, call.endpoint);
    let headers = identity_headers(cfg, &call.headers);
    let mut attempt: u32 = 1;

    loop {
        let transport = build_transport(cfg)?;
        let mut req = transport
            .request(call.method.into(), &url)
            .headers(headers.clone());
        if let Some(body) = &call.body {
            req = req.json(body);
        }

        debug!("{} {} (attempt {})", call.method, url, attempt);
        let res = req.send().await?;
        let status = res.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after_secs(res.headers());
            if !call.allow_retry || attempt > RETRY_BUDGET {
                return Err(Error::RateLimited(RateLimited {
                    request: call.describe(),
                    retry_allowed: false,
                    retry_after,
                    error: Some("too many requests, try again later".to_string()),
                }));
            }
            // Sleeping requires a usable Retry-After value.
            let Some(secs) = retry_after else {
                return Err(Error::MalformedRateLimitResponse {
                    request: call.describe(),
                });
            };
            warn!(
                "{} rate limited, sleeping {}s before attempt {}",
                call.describe(),
                secs,
                attempt + 1
            );
            tokio::time::sleep(Duration::from_secs(secs)).await;
            attempt += 1;
            continue;
        }

        if status == StatusCode::OK {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        return Err(Error::RequestFailed { status, body });
    }
}
