//! Fetch a live thread and print a short summary.
//!
//! Usage:
//!
//! ```text
//! cargo run --example fetch_thread -- <url-or-id> [sort] [max-batches]
//! ```

use reddit_threads::{PostRef, SortOrder, ThreadClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let input = match args.next() {
        Some(input) => input,
        None => {
            eprintln!("usage: fetch_thread <url-or-id> [sort] [max-batches]");
            std::process::exit(2);
        }
    };
    let sort: SortOrder = match args.next() {
        Some(raw) => raw.parse()?,
        None => SortOrder::default(),
    };
    let max_batches: i64 = args.next().map(|raw| raw.parse()).transpose()?.unwrap_or(5);

    let reference = PostRef::parse(&input)?;
    let client = ThreadClient::new()?.on_progress(|msg| eprintln!("* {msg}"));
    let thread = client.fetch_thread(&reference, sort, max_batches).await?;

    println!(
        "r/{} | {} (score {}, {} comments fetched of {} reported)",
        thread.post.subreddit,
        thread.post.title,
        thread.post.score,
        thread.metadata.total_comments_fetched,
        thread.post.num_comments,
    );
    for comment in thread.iter().take(15) {
        let first_line = comment.body.lines().next().unwrap_or("");
        println!(
            "{:indent$}[{:>5}] {}: {}",
            "",
            comment.score,
            comment.author,
            first_line,
            indent = (comment.depth as usize) * 2
        );
    }
    Ok(())
}
