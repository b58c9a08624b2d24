use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

/// Signal carried when a 429 could not be absorbed by the internal retry
/// loop: retries were disabled for the call or the attempt budget ran out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimited {
    /// Verb and endpoint of the triggering call, e.g. `GET users/1`.
    pub request: String,
    /// Whether a further retry was still permitted when this was raised.
    pub retry_allowed: bool,
    /// Server-provided Retry-After in seconds, when present and parseable.
    pub retry_after: Option<u64>,
    pub error: Option<String>,
}

impl fmt::Display for RateLimited {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "429 on {}", self.request)?;
        if let Some(secs) = self.retry_after {
            write!(f, ", retry after {}s", secs)?;
        }
        if let Some(err) = &self.error {
            write!(f, ": {}", err)?;
        }
        Ok(())
    }
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("rate limited: {0}")]
    RateLimited(RateLimited),

    /// Any status other than 200 and 429; `body` is the raw response text.
    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: StatusCode, body: String },

    /// A 429 that would have been retried but carried no usable integer
    /// Retry-After header.
    #[error("rate limited on {request} without a usable Retry-After header")]
    MalformedRateLimitResponse { request: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Stable machine-readable label for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Error::RateLimited(_) => "rate_limited",
            Error::RequestFailed { status, .. } => status_label(*status),
            Error::MalformedRateLimitResponse { .. } => "malformed_rate_limit",
            Error::Transport(_) => "transport",
            Error::Config(_) => "config",
        }
    }

    /// Whether a higher-level retry loop may reasonably re-issue the call.
    pub fn is_retriable(&self) -> bool {
        match self {
            Error::RateLimited(_) => true,
            Error::RequestFailed { status, .. } => status.is_server_error(),
            Error::MalformedRateLimitResponse { .. } => false,
            Error::Transport(e) => e.is_timeout() || e.is_connect(),
            Error::Config(_) => false,
        }
    }
}

fn status_label(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "bad_request",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::CONFLICT => "conflict",
        s if s.is_server_error() => "upstream_error",
        _ => "server_error",
    }
}
