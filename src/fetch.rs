//! Retrying JSON fetcher over a pluggable HTTP transport.
//!
//! The [`Transport`] trait is the crate's sole network boundary: an
//! implementation performs exactly one GET and reports the raw outcome.
//! Retry, backoff, and rate-limit handling live above that seam in
//! [`Fetcher`], so the whole policy is testable without sockets.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// User agent sent with every request, per the upstream API policy.
pub const USER_AGENT: &str = concat!("reddit-threads/", env!("CARGO_PKG_VERSION"));

/// Default number of error attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Fallback `Retry-After` delay when the header is absent or unparseable.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

// Rate-limit sleeps don't consume the error budget, so they need their
// own bound for the loop to terminate under a server that 429s forever.
const MAX_RATE_LIMIT_SLEEPS: u32 = 10;

/// A single raw HTTP exchange as seen by the retry engine.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Status reason phrase (empty when the transport has none).
    pub status_text: String,
    /// Raw `Retry-After` header value, if present.
    pub retry_after: Option<String>,
    /// Response body.
    pub body: String,
}

/// The crate's network boundary: one GET per call, no policy.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one GET request and report the raw outcome.
    ///
    /// Errors returned here represent transport-level failures
    /// (connection refused, TLS, truncated body); HTTP error statuses
    /// are reported through [`RawResponse::status`] instead.
    async fn get(&self, url: &str) -> Result<RawResponse>;
}

/// JSON GET with bounded retries over any [`Transport`].
///
/// Per-attempt behavior:
/// - 429: sleep for `Retry-After` seconds (default 5) and go again
///   without consuming the error budget.
/// - 500/503: exponential backoff (`2^attempt` seconds), consuming one
///   attempt.
/// - any other non-2xx: fail immediately with [`Error::Http`].
/// - transport or JSON-parse failure: backoff and retry, exhausting
///   into [`Error::FetchExhausted`] on the final attempt.
#[derive(Debug)]
pub struct Fetcher<T> {
    transport: T,
    max_attempts: u32,
}

impl<T: Transport> Fetcher<T> {
    /// Create a fetcher with the default retry budget.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the retry budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Access the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `url` and decode the body as JSON, retrying transient failures.
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        let mut attempts = 0u32;
        let mut rate_limit_sleeps = 0u32;

        loop {
            let failure = match self.transport.get(url).await {
                Ok(resp) if resp.status == 429 => {
                    rate_limit_sleeps += 1;
                    if rate_limit_sleeps > MAX_RATE_LIMIT_SLEEPS {
                        return Err(Error::FetchExhausted {
                            attempts: rate_limit_sleeps,
                            last_error: "rate limited on every attempt".to_string(),
                        });
                    }
                    let delay = parse_retry_after(resp.retry_after.as_deref());
                    warn!(url, delay_secs = delay.as_secs(), "rate limited, sleeping");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Ok(resp) if resp.status == 500 || resp.status == 503 => Error::Http {
                    status: resp.status,
                    status_text: resp.status_text,
                },
                Ok(resp) if !(200..300).contains(&resp.status) => {
                    return Err(Error::Http {
                        status: resp.status,
                        status_text: resp.status_text,
                    });
                }
                Ok(resp) => match serde_json::from_str(&resp.body) {
                    Ok(value) => return Ok(value),
                    Err(e) => Error::Parse(e.to_string()),
                },
                Err(e) => e,
            };

            attempts += 1;
            if attempts >= self.max_attempts {
                return Err(Error::FetchExhausted {
                    attempts,
                    last_error: failure.to_string(),
                });
            }
            let backoff = Duration::from_secs(1u64 << attempts);
            debug!(
                url,
                attempt = attempts,
                backoff_secs = backoff.as_secs(),
                error = %failure,
                "transient fetch failure, backing off"
            );
            tokio::time::sleep(backoff).await;
        }
    }
}

fn parse_retry_after(raw: Option<&str>) -> Duration {
    let secs = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    Duration::from_secs(secs)
}

/// Production transport backed by a configured [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the crate's fixed user agent.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let status = resp.status();
        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            retry_after,
            body,
        })
    }
}
