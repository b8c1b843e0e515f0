//! Converting raw listing pages into typed comment trees.
//!
//! A listing's `replies` field is itself another full listing, so
//! extraction is a straightforward recursive walk. Results thread back
//! up through return values; nothing here holds shared mutable state.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

use super::types::{CommentNode, Post, DELETED};

/// Result of walking one raw listing page.
#[derive(Debug, Default)]
pub struct ExtractedListing {
    /// Comments in listing order, with nested replies attached.
    pub comments: Vec<CommentNode>,
    /// Ids carried by `more` stubs, flattened in listing order.
    pub more_ids: Vec<String>,
    /// Submission fullname from the first comment carrying one, at any depth.
    pub link_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawComment {
    #[serde(default)]
    id: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    parent_id: String,
    #[serde(default)]
    depth: u32,
    #[serde(default)]
    is_submitter: bool,
    #[serde(default)]
    distinguished: Option<String>,
    #[serde(default)]
    stickied: bool,
    #[serde(default)]
    edited: Value,
}

/// Transform one raw comment object into a node with no replies.
///
/// Missing author/body become the `"[deleted]"` sentinel, and `edited`
/// is true only when the source reports a timestamp number.
pub(crate) fn comment_from_data(data: &Value) -> CommentNode {
    let raw: RawComment = serde_json::from_value(data.clone()).unwrap_or_default();
    CommentNode {
        id: raw.id,
        author: raw.author.unwrap_or_else(|| DELETED.to_string()),
        body: raw.body.unwrap_or_else(|| DELETED.to_string()),
        score: raw.score,
        created_utc: raw.created_utc as i64,
        parent_id: raw.parent_id,
        depth: raw.depth,
        is_submitter: raw.is_submitter,
        distinguished: raw.distinguished,
        stickied: raw.stickied,
        edited: raw.edited.is_number(),
        replies: Vec::new(),
    }
}

/// Walk a raw listing into comments plus the ids still to resolve.
///
/// `t1` children become [`CommentNode`]s, recursing into their nested
/// `replies` listings; `more` children contribute their ids to
/// `more_ids`. Children are processed and emitted in listing order.
pub fn extract_listing(listing: &Value) -> ExtractedListing {
    let mut out = ExtractedListing::default();
    let children = match listing.pointer("/data/children").and_then(Value::as_array) {
        Some(children) => children,
        None => return out,
    };

    for child in children {
        let kind = child.get("kind").and_then(Value::as_str).unwrap_or("");
        let data = match child.get("data") {
            Some(data) => data,
            None => continue,
        };
        match kind {
            "t1" => {
                let mut node = comment_from_data(data);
                if out.link_id.is_none() {
                    out.link_id = data
                        .get("link_id")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                }
                // The replies field is "" when empty, a listing otherwise.
                if data.get("replies").map(Value::is_object).unwrap_or(false) {
                    let nested = extract_listing(&data["replies"]);
                    node.replies = nested.comments;
                    out.more_ids.extend(nested.more_ids);
                    if out.link_id.is_none() {
                        out.link_id = nested.link_id;
                    }
                }
                out.comments.push(node);
            }
            "more" => {
                if let Some(ids) = data.get("children").and_then(Value::as_array) {
                    out.more_ids
                        .extend(ids.iter().filter_map(Value::as_str).map(str::to_string));
                }
            }
            _ => {}
        }
    }
    out
}

#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    upvote_ratio: f64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    link_flair_text: Option<String>,
    #[serde(default)]
    is_self: bool,
    #[serde(default)]
    over_18: bool,
    #[serde(default)]
    spoiler: bool,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    archived: bool,
}

/// Extract the submission from the first listing of a thread response.
pub fn extract_post(listing: &Value) -> Result<Post> {
    let data = listing
        .pointer("/data/children/0/data")
        .ok_or_else(|| Error::ThreadFetchFailed("post listing has no children".to_string()))?;
    let raw: RawPost = serde_json::from_value(data.clone())
        .map_err(|e| Error::ThreadFetchFailed(format!("malformed post object: {e}")))?;
    Ok(Post {
        id: raw.id,
        title: raw.title,
        author: raw.author.unwrap_or_else(|| DELETED.to_string()),
        subreddit: raw.subreddit,
        selftext: raw.selftext,
        url: raw.url,
        score: raw.score,
        upvote_ratio: raw.upvote_ratio,
        num_comments: raw.num_comments,
        created_utc: raw.created_utc as i64,
        permalink: raw.permalink,
        link_flair_text: raw.link_flair_text,
        is_self: raw.is_self,
        over_18: raw.over_18,
        spoiler: raw.spoiler,
        locked: raw.locked,
        archived: raw.archived,
    })
}
