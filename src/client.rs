//! High-level thread assembly.
//!
//! [`ThreadClient`] sequences the whole acquisition workflow: fetch the
//! initial listing pair, extract the post and the partial comment tree,
//! resolve withheld comments batch by batch, and return a
//! [`ThreadResult`] with consistent metadata. Every HTTP call within
//! one invocation runs sequentially, in order; independent invocations
//! are free to run in parallel because the client holds no per-fetch
//! mutable state.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fetch::{Fetcher, HttpTransport, Transport};
use crate::reference::PostRef;
use crate::tree::{
    count_forest, extract_listing, extract_post, FetchMetadata, MoreResolver, ThreadResult,
    MAX_BATCH_SIZE,
};

/// Comment sort orders accepted by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// The source's "best" ranking (its default).
    #[default]
    Confidence,
    /// Highest score first.
    Top,
    /// Newest first.
    New,
    /// Most controversial first.
    Controversial,
    /// Oldest first.
    Old,
}

impl SortOrder {
    /// Query-string value for this order.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Confidence => "confidence",
            SortOrder::Top => "top",
            SortOrder::New => "new",
            SortOrder::Controversial => "controversial",
            SortOrder::Old => "old",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "confidence" => Ok(SortOrder::Confidence),
            "top" => Ok(SortOrder::Top),
            "new" => Ok(SortOrder::New),
            "controversial" => Ok(SortOrder::Controversial),
            "old" => Ok(SortOrder::Old),
            other => Err(Error::InvalidReference(format!(
                "unknown sort order: {other}"
            ))),
        }
    }
}

/// Callback invoked with human-readable progress strings.
pub type ProgressFn = Box<dyn Fn(&str) + Send + Sync>;

/// High-level client assembling complete threads.
///
/// Generic over [`Transport`] so the entire workflow can be exercised
/// against a scripted transport in tests; production code uses the
/// reqwest-backed default.
pub struct ThreadClient<T = HttpTransport> {
    fetcher: Fetcher<T>,
    progress: Option<ProgressFn>,
}

impl ThreadClient<HttpTransport> {
    /// Create a client backed by the production HTTP transport.
    pub fn new() -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new()?))
    }
}

impl<T: Transport> ThreadClient<T> {
    /// Create a client over an explicit transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            fetcher: Fetcher::new(transport),
            progress: None,
        }
    }

    /// Install a progress callback.
    ///
    /// The callback is a pure side channel: it receives status strings
    /// at each pipeline stage and has no effect on the result.
    pub fn on_progress(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// The fetcher this client issues requests through.
    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    fn report(&self, message: &str) {
        if let Some(callback) = &self.progress {
            callback(message);
        }
    }

    /// Fetch a complete thread: post, comment forest, and metadata.
    ///
    /// `max_more_batches` bounds how many withheld-comment batches are
    /// resolved (`-1` for unlimited). Fetch and extraction failures
    /// propagate as-is; a response that is not the expected two-listing
    /// pair fails with [`Error::ThreadFetchFailed`]. Failed resolution
    /// batches are skipped, so the returned tree may hold fewer
    /// comments than the post self-reports; the metadata count always
    /// reflects what was actually fetched.
    pub async fn fetch_thread(
        &self,
        reference: &PostRef,
        sort: SortOrder,
        max_more_batches: i64,
    ) -> Result<ThreadResult> {
        self.report(&format!("Fetching post {}", reference.post_id));
        let url = format!("{}.json?sort={}", reference.canonical_url, sort.as_str());
        let response = self.fetcher.get_json(&url).await?;

        let listings = response
            .as_array()
            .filter(|listings| listings.len() == 2)
            .ok_or_else(|| {
                Error::ThreadFetchFailed(
                    "expected a two-element [post, comments] response".to_string(),
                )
            })?;

        let post = extract_post(&listings[0])?;
        let reference = if reference.subreddit.is_empty() {
            reference.with_subreddit(&post.subreddit)
        } else {
            reference.clone()
        };
        self.report(&format!(
            "Fetched r/{} post \"{}\"",
            reference.subreddit, post.title
        ));

        let extracted = extract_listing(&listings[1]);
        let mut comments = extracted.comments;
        if !extracted.more_ids.is_empty() {
            let link_id = extracted.link_id.unwrap_or_else(|| post.fullname());
            let batches = extracted.more_ids.len().div_ceil(MAX_BATCH_SIZE);
            self.report(&format!(
                "Resolving {} hidden comments in {} batches",
                extracted.more_ids.len(),
                batches
            ));
            let resolver = MoreResolver::new(&self.fetcher);
            let merged = resolver
                .resolve(&mut comments, &extracted.more_ids, &link_id, max_more_batches)
                .await;
            debug!(merged, "more-comments resolution finished");
        }

        let total = count_forest(&comments);
        self.report(&format!("Fetched {total} comments"));
        Ok(ThreadResult {
            post,
            comments,
            metadata: FetchMetadata {
                fetched_at: Utc::now(),
                total_comments_fetched: total,
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    /// Like [`ThreadClient::fetch_thread`], bounded by a wall-clock deadline.
    ///
    /// The deadline covers the whole invocation and aborts in-flight
    /// HTTP calls; expiry surfaces as [`Error::Timeout`], distinct from
    /// other failures so embedding servers can map it to a busy signal
    /// rather than a generic upstream error.
    pub async fn fetch_thread_with_timeout(
        &self,
        reference: &PostRef,
        sort: SortOrder,
        max_more_batches: i64,
        deadline: Duration,
    ) -> Result<ThreadResult> {
        tokio::time::timeout(deadline, self.fetch_thread(reference, sort, max_more_batches))
            .await
            .map_err(|_| Error::Timeout(deadline))?
    }
}
