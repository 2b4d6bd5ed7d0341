//! # Live Feed Probe
//!
//! Connects to a notification feed, pushes every frame through a notification
//! queue and prints each transition until the run time elapses. Useful to
//! check a server by hand:
//!
//! ```text
//! cargo run -p project_tests --bin test_docs_feed -- --url ws://localhost:8080/notifications --seconds 30
//! ```

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use lib_docs::core::{NotificationQueue, QueueTimings};
use lib_docs::documents::NotificationItem;
use lib_docs::ingestors::LiveFeedListener;

#[derive(Parser, Debug)]
#[clap(about = "Print a live notification feed")]
struct Args {
    #[clap(long, default_value = "ws://localhost:8080/notifications")]
    url: String,

    #[clap(long, default_value_t = 30)]
    seconds: u64,

    #[clap(long, default_value_t = 1000)]
    display_ms: u64,

    #[clap(long, default_value_t = 500)]
    cooldown_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()?;

    let args = Args::parse();
    println!("--- Probing {} for {}s ---", args.url, args.seconds);

    let queue = NotificationQueue::spawn(QueueTimings::from_millis(args.display_ms, args.cooldown_ms));
    let mut states = queue.subscribe();

    let feed_queue = queue.clone();
    let listener = LiveFeedListener::new(args.url.clone(), move |item: NotificationItem| {
        feed_queue.add(item);
    })
    .on_error(|e| println!("!! {}", e))
    .spawn();

    let deadline = tokio::time::sleep(Duration::from_secs(args.seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                println!(
                    "{:?} current={:?} queued={} total={}",
                    state.phase(),
                    state.current_notification.as_ref().map(|n| n.document_title.as_str()),
                    state.queue.len(),
                    state.total_count
                );
            }
        }
    }

    listener.close();
    queue.shutdown();
    println!("--- Done. {} notifications received ---", queue.state().total_count);
    Ok(())
}
