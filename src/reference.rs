//! Parsing user-supplied post references.
//!
//! A post can be referred to by a full or partial URL, by the
//! `r/<subreddit>/comments/<id>` shorthand, or by a bare post id.
//! Parsing is pure string work; nothing here touches the network.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::BASE_URL;

lazy_static! {
    // Full or partial URL on any reddit.com subdomain.
    static ref URL_RE: Regex = Regex::new(
        r"(?i)^(?:https?://)?(?:[a-z0-9-]+\.)?reddit\.com/r/([A-Za-z0-9_]+)/comments/([A-Za-z0-9]+)"
    )
    .unwrap();
    // Bare `r/<sub>/comments/<id>` shorthand, no host.
    static ref SHORTHAND_RE: Regex =
        Regex::new(r"^r/([A-Za-z0-9_]+)/comments/([A-Za-z0-9]+)").unwrap();
    // A post id on its own.
    static ref ID_RE: Regex = Regex::new(r"^[A-Za-z0-9]{5,10}$").unwrap();
}

/// A structured reference to a single post.
///
/// Produced by [`PostRef::parse`] and consumed once by the assembler to
/// build the fetch URL. `subreddit` stays empty for bare-id input until
/// the first fetch resolves it; callers must not rely on it before then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRef {
    /// Subreddit name without the `r/` prefix; empty until resolved.
    pub subreddit: String,
    /// The base-36 post id.
    pub post_id: String,
    /// Canonical URL of the post, without trailing slug or slash.
    pub canonical_url: String,
}

impl PostRef {
    /// Parse raw user input into a `PostRef`.
    ///
    /// Accepts three shapes: a full/partial URL containing
    /// `/r/<sub>/comments/<id>`, the `r/<sub>/comments/<id>` shorthand,
    /// or a bare 5-10 character alphanumeric id. Anything else fails
    /// with [`Error::InvalidReference`].
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if let Some(caps) = URL_RE
            .captures(input)
            .or_else(|| SHORTHAND_RE.captures(input))
        {
            let subreddit = caps[1].to_string();
            let post_id = caps[2].to_string();
            let canonical_url = format!("{BASE_URL}/r/{subreddit}/comments/{post_id}");
            return Ok(Self {
                subreddit,
                post_id,
                canonical_url,
            });
        }

        if ID_RE.is_match(input) {
            return Ok(Self {
                subreddit: String::new(),
                post_id: input.to_string(),
                canonical_url: format!("{BASE_URL}/comments/{input}"),
            });
        }

        Err(Error::InvalidReference(input.to_string()))
    }

    /// Copy of this reference with the subreddit filled in.
    ///
    /// Used after the first fetch resolves a bare-id reference; the
    /// canonical URL is rebuilt onto the `r/<sub>` form.
    pub fn with_subreddit(&self, subreddit: &str) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            post_id: self.post_id.clone(),
            canonical_url: format!("{BASE_URL}/r/{subreddit}/comments/{}", self.post_id),
        }
    }
}

impl FromStr for PostRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PostRef::parse(s)
    }
}
