//! Resolving "more comments" stubs and merging them into the tree.
//!
//! Stub ids are fetched in bounded batches through the retrying
//! fetcher and merged back by parent lookup. The parent index is built
//! once from the existing tree and extended as comments are placed, so
//! a comment can attach to a parent that itself arrived in an earlier
//! batch. Batches run strictly in order with a pacing delay between
//! them; a failed batch is skipped, never fatal.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::fetch::{Fetcher, Transport};
use crate::BASE_URL;

use super::extract::comment_from_data;
use super::types::CommentNode;

/// Hard upstream limit on ids per batch call.
pub const MAX_BATCH_SIZE: usize = 100;

/// Fixed delay between consecutive batch fetches.
pub const BATCH_PACING: Duration = Duration::from_secs(1);

/// Incremental index from node fullname to its position in the forest.
///
/// Positions are child-index paths from the root list. Nodes are only
/// ever appended, so existing paths stay valid and the index can be
/// extended in place as resolved comments are merged.
#[derive(Debug, Default)]
struct ForestIndex {
    paths: HashMap<String, Vec<usize>>,
}

impl ForestIndex {
    /// Seed the index with a full pre-order traversal of the forest.
    fn build(roots: &[CommentNode]) -> Self {
        let mut index = Self::default();
        for (i, node) in roots.iter().enumerate() {
            index.add_subtree(node, vec![i]);
        }
        index
    }

    fn add_subtree(&mut self, node: &CommentNode, path: Vec<usize>) {
        for (i, reply) in node.replies.iter().enumerate() {
            let mut child = path.clone();
            child.push(i);
            self.add_subtree(reply, child);
        }
        self.paths.insert(node.fullname(), path);
    }

    fn insert(&mut self, fullname: String, path: Vec<usize>) {
        self.paths.insert(fullname, path);
    }

    fn path(&self, fullname: &str) -> Option<Vec<usize>> {
        self.paths.get(fullname).cloned()
    }
}

fn node_at_mut<'a>(
    roots: &'a mut Vec<CommentNode>,
    path: &[usize],
) -> Option<&'a mut CommentNode> {
    let (first, rest) = path.split_first()?;
    let mut node = roots.get_mut(*first)?;
    for idx in rest {
        node = node.replies.get_mut(*idx)?;
    }
    Some(node)
}

/// Resolves withheld comments and merges them into an existing forest.
pub struct MoreResolver<'a, T> {
    fetcher: &'a Fetcher<T>,
    pacing: Duration,
}

impl<'a, T: Transport> MoreResolver<'a, T> {
    /// Create a resolver that fetches through `fetcher`.
    pub fn new(fetcher: &'a Fetcher<T>) -> Self {
        Self {
            fetcher,
            pacing: BATCH_PACING,
        }
    }

    /// Resolve `more_ids` and merge the results into `roots`.
    ///
    /// Ids are partitioned into batches of at most [`MAX_BATCH_SIZE`]
    /// and fetched in order, up to `max_batches` batches (`-1` for
    /// unlimited); ids beyond the quota stay unresolved. A batch whose
    /// fetch fails after its own retries is logged and skipped so the
    /// remaining batches still run. Returns the number of comments
    /// merged.
    pub async fn resolve(
        &self,
        roots: &mut Vec<CommentNode>,
        more_ids: &[String],
        link_id: &str,
        max_batches: i64,
    ) -> usize {
        if more_ids.is_empty() {
            return 0;
        }

        let mut index = ForestIndex::build(roots);
        let batches: Vec<&[String]> = more_ids.chunks(MAX_BATCH_SIZE).collect();
        let quota = if max_batches < 0 {
            batches.len()
        } else {
            batches.len().min(max_batches as usize)
        };

        let mut merged = 0usize;
        for (i, batch) in batches[..quota].iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.pacing).await;
            }
            let url = morechildren_url(link_id, batch);
            let response = match self.fetcher.get_json(&url).await {
                Ok(value) => value,
                Err(e) => {
                    warn!(batch = i + 1, total = quota, error = %e, "skipping failed more-comments batch");
                    continue;
                }
            };
            let placed = merge_batch(roots, &mut index, &response);
            debug!(batch = i + 1, total = quota, placed, "merged more-comments batch");
            merged += placed;
        }
        merged
    }
}

fn morechildren_url(link_id: &str, ids: &[String]) -> String {
    format!(
        "{BASE_URL}/api/morechildren.json?api_type=json&link_id={link_id}&children={}",
        ids.join(",")
    )
}

/// Merge every `t1` item of one batch response into the forest.
///
/// Comments are processed in API response order, not topologically: a
/// comment whose parent arrives later in the same batch is promoted to
/// a root and stays there. That matches the source's behavior and is
/// deliberate.
fn merge_batch(roots: &mut Vec<CommentNode>, index: &mut ForestIndex, response: &Value) -> usize {
    let things = match response
        .pointer("/json/data/things")
        .and_then(Value::as_array)
    {
        Some(things) => things,
        None => return 0,
    };

    let mut placed = 0usize;
    for thing in things {
        if thing.get("kind").and_then(Value::as_str) != Some("t1") {
            continue;
        }
        let data = match thing.get("data") {
            Some(data) => data,
            None => continue,
        };
        let node = comment_from_data(data);
        let fullname = node.fullname();

        match index.path(&node.parent_id) {
            Some(parent_path) => {
                if let Some(parent) = node_at_mut(roots, &parent_path) {
                    let mut path = parent_path;
                    path.push(parent.replies.len());
                    parent.replies.push(node);
                    index.insert(fullname, path);
                    placed += 1;
                }
            }
            None => {
                let path = vec![roots.len()];
                roots.push(node);
                index.insert(fullname, path);
                placed += 1;
            }
        }
    }
    placed
}
