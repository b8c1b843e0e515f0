//! Show how truncation shares one node budget across a whole forest.
//!
//! ```text
//! cargo run --example truncate
//! ```

use reddit_threads::tree::{count_forest, truncate, CommentIter};
use reddit_threads::CommentNode;

fn comment(id: &str, parent_id: &str, depth: u32, replies: Vec<CommentNode>) -> CommentNode {
    CommentNode {
        id: id.to_string(),
        author: format!("user_{id}"),
        body: format!("comment {id}"),
        score: 1,
        created_utc: 1_700_000_000,
        parent_id: parent_id.to_string(),
        depth,
        is_submitter: false,
        distinguished: None,
        stickied: false,
        edited: false,
        replies,
    }
}

fn main() {
    // Two roots; the first owns a deep chain that will eat the budget.
    let forest = vec![
        comment(
            "a",
            "t3_demo",
            0,
            vec![comment(
                "a1",
                "t1_a",
                1,
                vec![comment("a2", "t1_a1", 2, vec![])],
            )],
        ),
        comment("b", "t3_demo", 0, vec![comment("b1", "t1_b", 1, vec![])]),
    ];

    println!("full forest: {} nodes", count_forest(&forest));
    for limit in [6, 3, 1] {
        let trimmed = truncate(&forest, limit);
        let ids: Vec<&str> = CommentIter::new(&trimmed).map(|c| c.id.as_str()).collect();
        println!("limit {limit}: kept {:?}", ids);
    }
}
