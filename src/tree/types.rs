//! Core data model for reconstructed threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel used when the source withholds an author or body.
pub const DELETED: &str = "[deleted]";

/// The submission a thread hangs off.
///
/// Built once from the first listing of a fetch and immutable after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Base-36 post id.
    pub id: String,
    /// Submission title.
    pub title: String,
    /// Author name, `"[deleted]"` when withheld.
    pub author: String,
    /// Subreddit name without the `r/` prefix.
    pub subreddit: String,
    /// Self-post body text (empty for link posts).
    pub selftext: String,
    /// External URL for link posts, or the post's own URL.
    pub url: String,
    /// Net score.
    pub score: i64,
    /// Fraction of votes that are upvotes.
    pub upvote_ratio: f64,
    /// Comment count as self-reported by the source.
    pub num_comments: u64,
    /// Creation time, unix seconds.
    pub created_utc: i64,
    /// Site-relative permalink.
    pub permalink: String,
    /// Link flair, when set.
    pub link_flair_text: Option<String>,
    /// Whether this is a self (text) post.
    pub is_self: bool,
    /// NSFW marker.
    pub over_18: bool,
    /// Spoiler marker.
    pub spoiler: bool,
    /// Whether commenting is locked.
    pub locked: bool,
    /// Whether the post is archived.
    pub archived: bool,
}

impl Post {
    /// Fullname (`t3_<id>`) of this submission.
    pub fn fullname(&self) -> String {
        format!("t3_{}", self.id)
    }
}

/// A single comment and the subtree of replies it owns.
///
/// Nodes carry no parent back-pointer; `parent_id` and `depth` (both as
/// reported by the source) are enough for reconstruction. A node's
/// `replies` keep source listing order, except comments merged in later
/// by more-comments resolution, which are appended after existing
/// children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    /// Base-36 comment id.
    pub id: String,
    /// Author name, `"[deleted]"` when withheld.
    pub author: String,
    /// Body text, `"[deleted]"` when withheld.
    pub body: String,
    /// Net score.
    pub score: i64,
    /// Creation time, unix seconds.
    pub created_utc: i64,
    /// Fullname of the parent (`t1_<id>` or `t3_<id>` for top level).
    pub parent_id: String,
    /// Nesting level as reported by the source, not recomputed.
    pub depth: u32,
    /// Whether the author is the submitter.
    pub is_submitter: bool,
    /// Distinguished role (`"moderator"`, `"admin"`), when any.
    pub distinguished: Option<String>,
    /// Whether the comment is stickied.
    pub stickied: bool,
    /// Whether the comment was edited (the source reports a timestamp).
    pub edited: bool,
    /// Child comments, in insertion order.
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Fullname (`t1_<id>`) of this comment.
    pub fn fullname(&self) -> String {
        format!("t1_{}", self.id)
    }

    /// Count all nodes in this subtree, including this one.
    pub fn count_nodes(&self) -> usize {
        1 + self.replies.iter().map(|r| r.count_nodes()).sum::<usize>()
    }

    /// Maximum reply depth below this node (0 when it has no replies).
    pub fn max_depth(&self) -> usize {
        if self.replies.is_empty() {
            0
        } else {
            1 + self
                .replies
                .iter()
                .map(|r| r.max_depth())
                .max()
                .unwrap_or(0)
        }
    }

    /// Copy of this node without its replies.
    pub fn shallow_clone(&self) -> Self {
        Self {
            replies: Vec::new(),
            ..self.clone()
        }
    }
}

/// Count every node reachable from a comment forest.
pub fn count_forest(comments: &[CommentNode]) -> usize {
    comments.iter().map(|c| c.count_nodes()).sum()
}

/// Metadata stamped onto every fetch result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchMetadata {
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
    /// Number of comment nodes actually reachable from the result.
    pub total_comments_fetched: usize,
    /// Version of this crate that produced the result.
    pub tool_version: String,
}

/// A complete fetched thread: post, comment forest, and metadata.
///
/// Constructed once per fetch invocation and never mutated after
/// return. Callers that filter or truncate must produce new copies;
/// the same result may be reshaped many times in one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadResult {
    /// The submission.
    pub post: Post,
    /// Root-level comments, in listing order.
    pub comments: Vec<CommentNode>,
    /// Fetch metadata.
    pub metadata: FetchMetadata,
}

impl ThreadResult {
    /// Iterate over every comment, depth-first in display order.
    pub fn iter(&self) -> CommentIter<'_> {
        CommentIter::new(&self.comments)
    }

    /// Number of comment nodes reachable from `comments`.
    pub fn comment_count(&self) -> usize {
        count_forest(&self.comments)
    }
}

/// Depth-first pre-order iterator over a comment forest.
pub struct CommentIter<'a> {
    stack: Vec<&'a CommentNode>,
}

impl<'a> CommentIter<'a> {
    /// Iterate `roots` and their descendants in display order.
    pub fn new(roots: &'a [CommentNode]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for CommentIter<'a> {
    type Item = &'a CommentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push replies in reverse so they come out left-to-right.
        for reply in node.replies.iter().rev() {
            self.stack.push(reply);
        }
        Some(node)
    }
}
