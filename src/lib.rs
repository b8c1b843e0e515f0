//! # reddit-threads
//!
//! A resilient client library for retrieving complete Reddit discussion
//! threads: the post, every comment the API will give up (including
//! the ones hidden behind "more comments" stubs), and metadata that
//! reflects what was actually fetched.
//!
//! ## Design Philosophy
//!
//! - **One network seam**: all I/O goes through the [`Transport`]
//!   trait; retry, backoff, rate-limit pacing, and tree assembly are
//!   plain logic above it and fully testable against a scripted
//!   transport.
//! - **Partial data over no data**: a failed resolution batch is
//!   skipped, never fatal. The returned metadata counts the nodes that
//!   are really there.
//! - **Sequential within, parallel across**: each fetch runs its HTTP
//!   calls strictly in order with pacing between batches, but
//!   independent fetches share no state and can run concurrently,
//!   bounded, if you want, by a [`FetchGate`].
//!
//! ## Examples
//!
//! ```rust,no_run
//! use reddit_threads::{PostRef, SortOrder, ThreadClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reference = PostRef::parse("https://www.reddit.com/r/rust/comments/abc123/title/")?;
//! let client = ThreadClient::new()?;
//! let thread = client.fetch_thread(&reference, SortOrder::Top, 5).await?;
//!
//! println!(
//!     "{}: {} comments fetched",
//!     thread.post.title, thread.metadata.total_comments_fetched
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Trimming a finished thread for display keeps the original intact:
//!
//! ```rust
//! use reddit_threads::tree::truncate;
//!
//! let trimmed = truncate(&[], 50);
//! assert!(trimmed.is_empty());
//! ```

#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod client;
pub mod error;
pub mod fetch;
pub mod gate;
pub mod reference;
pub mod tree;

// Scripted transport for exercising the pipeline in tests
pub mod mock;

pub use client::{SortOrder, ThreadClient};
pub use error::{Error, Result};
pub use fetch::{Fetcher, HttpTransport, RawResponse, Transport, USER_AGENT};
pub use gate::FetchGate;
pub use reference::PostRef;
pub use tree::{CommentNode, FetchMetadata, Post, ThreadResult};

/// Base URL of the upstream JSON API.
pub const BASE_URL: &str = "https://www.reddit.com";
