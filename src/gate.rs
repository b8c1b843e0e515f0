//! Bounding concurrent fetch workflows for embedding servers.
//!
//! The core holds no shared mutable state, so any number of
//! invocations could run in parallel, but unbounded parallelism blows
//! memory and trips upstream rate limits. [`FetchGate`] gives servers
//! the admission control described by the concurrency model: a fixed
//! permit pool, a per-invocation deadline, and an immediate `Busy`
//! rejection instead of unbounded queuing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::{Error, Result};

/// Default bound on concurrently admitted workflows.
pub const DEFAULT_MAX_CONCURRENT: usize = 20;

/// Default wall-clock deadline applied to each admitted workflow.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Fixed-size admission gate for concurrent thread fetches.
///
/// Cloning is cheap and shares the permit pool.
#[derive(Debug, Clone)]
pub struct FetchGate {
    permits: Arc<Semaphore>,
    deadline: Duration,
}

impl FetchGate {
    /// Gate with the default bounds (20 concurrent, 30s deadline).
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_CONCURRENT, DEFAULT_DEADLINE)
    }

    /// Gate with explicit bounds.
    pub fn with_limits(max_concurrent: usize, deadline: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            deadline,
        }
    }

    /// Permits currently available.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `work` under the gate.
    ///
    /// Fails fast with [`Error::Busy`] when the pool is saturated and
    /// with [`Error::Timeout`] when the deadline elapses; the timed-out
    /// future is dropped, aborting any in-flight HTTP call.
    pub async fn run<F, O>(&self, work: F) -> Result<O>
    where
        F: Future<Output = Result<O>>,
    {
        let _permit = self.permits.try_acquire().map_err(|_| Error::Busy)?;
        tokio::time::timeout(self.deadline, work)
            .await
            .map_err(|_| Error::Timeout(self.deadline))?
    }
}

impl Default for FetchGate {
    fn default() -> Self {
        Self::new()
    }
}
