//! End-to-end pipeline tests driving the full workflow against a
//! scripted transport: initial listing fetch, tree extraction,
//! more-comments resolution, and result metadata consistency.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use reddit_threads::mock::{Reply, ScriptedTransport};
use reddit_threads::tree::{count_forest, truncate};
use reddit_threads::{Error, FetchGate, PostRef, SortOrder, ThreadClient};

/// A realistic two-listing response: a self post with three top-level
/// comments, one nested reply chain, and a more-stub carrying the ids
/// the API withheld.
fn thread_body(more_ids: &[&str]) -> String {
    let comment = |id: &str, parent: &str, depth: u32, replies: serde_json::Value| {
        json!({
            "kind": "t1",
            "data": {
                "id": id,
                "author": format!("user_{id}"),
                "body": format!("comment {id}"),
                "score": 4,
                "created_utc": 1_700_000_100.0,
                "parent_id": parent,
                "link_id": "t3_q1x9z",
                "depth": depth,
                "is_submitter": false,
                "stickied": false,
                "edited": false,
                "replies": replies,
            }
        })
    };

    let nested = json!({ "kind": "Listing", "data": { "children": [
        comment("c2a", "t1_c2", 1, json!("")),
    ]}});

    let mut children = vec![
        comment("c1", "t3_q1x9z", 0, json!("")),
        comment("c2", "t3_q1x9z", 0, nested),
        comment("c3", "t3_q1x9z", 0, json!("")),
    ];
    if !more_ids.is_empty() {
        children.push(json!({
            "kind": "more",
            "data": { "id": "mstub", "parent_id": "t3_q1x9z", "children": more_ids }
        }));
    }

    json!([
        { "kind": "Listing", "data": { "children": [{
            "kind": "t3",
            "data": {
                "id": "q1x9z",
                "title": "What broke production today?",
                "author": "op_user",
                "subreddit": "devops",
                "selftext": "War stories welcome.",
                "url": "https://www.reddit.com/r/devops/comments/q1x9z/what_broke/",
                "score": 1523,
                "upvote_ratio": 0.94,
                "num_comments": 7,
                "created_utc": 1_700_000_000.0,
                "permalink": "/r/devops/comments/q1x9z/what_broke/",
                "is_self": true,
            }
        }]}},
        { "kind": "Listing", "data": { "children": children } },
    ])
    .to_string()
}

fn batch_body(items: &[(&str, &str)]) -> String {
    let things: Vec<serde_json::Value> = items
        .iter()
        .map(|(id, parent)| {
            json!({ "kind": "t1", "data": {
                "id": id,
                "author": format!("user_{id}"),
                "body": format!("resolved {id}"),
                "parent_id": parent,
                "depth": 1,
            }})
        })
        .collect();
    json!({ "json": { "data": { "things": things } } }).to_string()
}

#[tokio::test(start_paused = true)]
async fn full_pipeline_resolves_and_merges() {
    let transport = ScriptedTransport::new(vec![
        Reply::Json(thread_body(&["m1", "m2", "m3"])),
        Reply::Json(batch_body(&[
            ("m1", "t1_c1"),
            ("m2", "t1_c2a"),
            ("m3", "t1_gone"),
        ])),
    ]);
    let client = ThreadClient::with_transport(transport);
    let reference = PostRef::parse("r/devops/comments/q1x9z").unwrap();

    let thread = client
        .fetch_thread(&reference, SortOrder::Confidence, -1)
        .await
        .unwrap();

    assert_eq!(thread.post.title, "What broke production today?");
    assert_eq!(thread.post.subreddit, "devops");

    // 4 inline comments + 3 resolved; m3's parent is absent so it lands
    // as a new root after the originals.
    assert_eq!(thread.metadata.total_comments_fetched, 7);
    assert_eq!(thread.comment_count(), 7);
    assert_eq!(thread.comments.len(), 4);
    assert_eq!(thread.comments[3].id, "m3");

    // m1 was appended after c1's existing children, m2 under the nested
    // c2a.
    assert_eq!(thread.comments[0].replies.last().unwrap().id, "m1");
    assert_eq!(thread.comments[1].replies[0].replies[0].id, "m2");

    // Display order is stable pre-order.
    let order: Vec<&str> = thread.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, vec!["c1", "m1", "c2", "c2a", "m2", "c3", "m3"]);
}

#[tokio::test(start_paused = true)]
async fn batch_quota_leaves_tail_unresolved() {
    // 150 stub ids but a quota of 1: only the first batch of 100 is
    // fetched, and only its comments appear.
    let many_ids: Vec<String> = (0..150).map(|i| format!("m{i}")).collect();
    let id_refs: Vec<&str> = many_ids.iter().map(String::as_str).collect();

    let transport = ScriptedTransport::new(vec![
        Reply::Json(thread_body(&id_refs)),
        Reply::Json(batch_body(&[("m0", "t3_q1x9z")])),
    ]);
    let client = ThreadClient::with_transport(transport);
    let reference = PostRef::parse("r/devops/comments/q1x9z").unwrap();

    let thread = client
        .fetch_thread(&reference, SortOrder::Confidence, 1)
        .await
        .unwrap();

    assert_eq!(thread.metadata.total_comments_fetched, 5);
    assert!(client.fetcher().transport().is_complete());
    let requests = client.fetcher().transport().requests();
    assert_eq!(requests.len(), 2, "quota must cap batch fetches");
}

#[tokio::test(start_paused = true)]
async fn failed_batch_still_yields_partial_thread() {
    let many_ids: Vec<String> = (0..200).map(|i| format!("m{i}")).collect();
    let id_refs: Vec<&str> = many_ids.iter().map(String::as_str).collect();

    let transport = ScriptedTransport::new(vec![
        Reply::Json(thread_body(&id_refs)),
        // First batch exhausts its retry budget (3 network failures),
        // second succeeds.
        Reply::NetworkError("reset".to_string()),
        Reply::NetworkError("reset".to_string()),
        Reply::NetworkError("reset".to_string()),
        Reply::Json(batch_body(&[("m100", "t3_q1x9z")])),
    ]);
    let client = ThreadClient::with_transport(transport);
    let reference = PostRef::parse("r/devops/comments/q1x9z").unwrap();

    let thread = client
        .fetch_thread(&reference, SortOrder::Confidence, -1)
        .await
        .unwrap();

    // 4 inline + 1 from the surviving batch; losing a batch is not an
    // error, and the count reflects reality.
    assert_eq!(thread.metadata.total_comments_fetched, 5);
    assert_eq!(thread.comments.last().unwrap().id, "m100");
}

#[tokio::test(start_paused = true)]
async fn progress_messages_trace_the_stages() {
    let transport = ScriptedTransport::new(vec![
        Reply::Json(thread_body(&["m1"])),
        Reply::Json(batch_body(&[("m1", "t1_c1")])),
    ]);
    let messages: Arc<Mutex<Vec<String>>> = Default::default();
    let sink = messages.clone();
    let client = ThreadClient::with_transport(transport)
        .on_progress(move |msg| sink.lock().unwrap().push(msg.to_string()));
    let reference = PostRef::parse("q1x9z").unwrap();

    client
        .fetch_thread(&reference, SortOrder::New, -1)
        .await
        .unwrap();

    let messages = messages.lock().unwrap();
    assert!(messages.len() >= 3);
    assert!(messages[0].contains("q1x9z"));
    assert!(messages.iter().any(|m| m.contains("r/devops")));
    assert!(messages.iter().any(|m| m.contains("1 batches")));
    assert!(messages.last().unwrap().contains("5 comments"));
}

#[tokio::test(start_paused = true)]
async fn results_are_reshaped_by_copy_not_mutation() {
    let transport = ScriptedTransport::new(vec![Reply::Json(thread_body(&[]))]);
    let client = ThreadClient::with_transport(transport);
    let reference = PostRef::parse("r/devops/comments/q1x9z").unwrap();

    let thread = client
        .fetch_thread(&reference, SortOrder::Confidence, -1)
        .await
        .unwrap();

    let trimmed_two = truncate(&thread.comments, 2);
    let trimmed_all = truncate(&thread.comments, -1);

    assert_eq!(count_forest(&trimmed_two), 2);
    assert_eq!(count_forest(&trimmed_all), thread.comment_count());
    // The canonical tree is untouched by either reshape.
    assert_eq!(thread.comment_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn gated_fetches_respect_busy_and_deadline() {
    let gate = FetchGate::with_limits(1, Duration::from_secs(30));

    let transport = ScriptedTransport::new(vec![Reply::Json(thread_body(&[]))]);
    let client = ThreadClient::with_transport(transport);
    let reference = PostRef::parse("r/devops/comments/q1x9z").unwrap();

    let inner_gate = gate.clone();
    let thread = gate
        .run(async {
            // While this fetch holds the only permit, a second request
            // is turned away instead of queuing.
            assert!(matches!(
                inner_gate.run(async { Ok(()) }).await,
                Err(Error::Busy)
            ));
            client
                .fetch_thread(&reference, SortOrder::Confidence, -1)
                .await
        })
        .await
        .unwrap();

    assert_eq!(thread.metadata.total_comments_fetched, 4);
    assert_eq!(gate.available(), 1);
}
