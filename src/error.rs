//! Error types for the Reddit thread client.

use std::time::Duration;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while fetching and assembling threads.
///
/// The taxonomy separates failures a caller must surface verbatim
/// (`InvalidReference`, `Http`) from transient conditions that were
/// retried and still failed (`FetchExhausted`), shape violations of the
/// upstream response (`ThreadFetchFailed`), and the two admission-control
/// outcomes embedding servers map to a "busy" signal (`Timeout`, `Busy`).
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Input matched none of the accepted post reference shapes.
    #[error("invalid post reference: {0}")]
    InvalidReference(String),

    /// Non-retryable non-2xx response from the upstream API.
    #[error("HTTP {status} {status_text}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Status reason phrase reported by the server.
        status_text: String,
    },

    /// A transient failure (429/5xx/network) persisted past the retry budget.
    #[error("fetch failed after {attempts} attempts: {last_error}")]
    FetchExhausted {
        /// Attempts consumed before giving up.
        attempts: u32,
        /// Description of the last failure observed.
        last_error: String,
    },

    /// The initial response did not have the expected two-listing shape.
    #[error("unexpected thread response: {0}")]
    ThreadFetchFailed(String),

    /// Transport-level failure (connection, TLS, body read).
    #[error("network error: {0}")]
    Network(String),

    /// A response body could not be decoded as JSON.
    #[error("malformed response: {0}")]
    Parse(String),

    /// The whole-invocation deadline elapsed.
    #[error("thread fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The concurrency gate is saturated.
    #[error("too many concurrent thread fetches")]
    Busy,
}
