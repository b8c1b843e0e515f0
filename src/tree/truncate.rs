//! Budgeted truncation of comment forests.

use super::types::CommentNode;

/// Trim a comment forest to at most `limit` nodes, preserving shape.
///
/// Pure and non-mutating: the result is built from shallow copies. One
/// budget is shared across the whole forest: roots are visited in
/// order and each root's subtree is walked pre-order, depth-first,
/// until the budget runs out, at which point everything after the
/// current node in traversal order is dropped. An early deep or wide
/// branch can therefore consume the entire budget before a later
/// sibling is reached at all; that is deliberate, not per-branch fair.
///
/// A negative `limit` (`-1` by convention) returns the input unchanged.
pub fn truncate(comments: &[CommentNode], limit: i64) -> Vec<CommentNode> {
    if limit < 0 {
        return comments.to_vec();
    }
    let mut remaining = limit as usize;
    let mut kept = Vec::new();
    for node in comments {
        if remaining == 0 {
            break;
        }
        kept.push(take_subtree(node, &mut remaining));
    }
    kept
}

fn take_subtree(node: &CommentNode, remaining: &mut usize) -> CommentNode {
    *remaining -= 1;
    let mut copy = node.shallow_clone();
    for reply in &node.replies {
        if *remaining == 0 {
            break;
        }
        copy.replies.push(take_subtree(reply, remaining));
    }
    copy
}
