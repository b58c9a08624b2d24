//! Async client for the fluxpoint.dev REST API.
//!
//! Attaches the account token and a versioned user agent to every request,
//! absorbs 429 responses by honoring `Retry-After` for up to ten extra
//! attempts, and surfaces every other failure as a typed [`Error`].
//!
//! ```no_run
//! use fluxpoint::{ApiCall, Client, Method};
//!
//! # async fn run() -> Result<(), fluxpoint::Error> {
//! let client = Client::new("token");
//! let meme = client.execute(&ApiCall::new(Method::Get, "meme")).await?;
//! println!("{meme}");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
pub mod error;
pub mod http;

pub use client::Client;
pub use config::Config;
pub use error::{Error, RateLimited};
pub use http::{ApiCall, Method, RETRY_BUDGET};
