//! Comment-tree construction: extraction, resolution, truncation.
//!
//! The tree pipeline turns raw listing pages into a typed comment
//! forest and fills in the comments the source withheld:
//!
//! - [`extract_listing`] walks one raw listing into [`CommentNode`]s
//!   plus a flat work-list of unresolved stub ids.
//! - [`MoreResolver`] fetches those ids in bounded batches and merges
//!   the results back by parent lookup.
//! - [`truncate()`] trims a finished forest to a node budget while
//!   preserving its shape.
//!
//! Each invocation operates on its own tree; no long-lived shared
//! state is held anywhere in the pipeline.

mod extract;
mod resolve;
mod truncate;
mod types;

pub use extract::{extract_listing, extract_post, ExtractedListing};
pub use resolve::{MoreResolver, BATCH_PACING, MAX_BATCH_SIZE};
pub use truncate::truncate;
pub use types::{
    count_forest, CommentIter, CommentNode, FetchMetadata, Post, ThreadResult, DELETED,
};
