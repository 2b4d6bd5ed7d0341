use anyhow::Result;
use clap::Parser;
use lib_docs::core::{NotificationQueue, QueueTimings};
use lib_docs::ingestors::LiveFeedListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

mod feed_logic;
use feed_logic::{config, logger, presenter};

#[derive(Parser, Debug)]
#[clap(about = "Live document notification feed", version)]
struct Cli {
    #[command(flatten)]
    config: config::ConfigArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = config::load_config(&cli.config)?;
    logger::setup_logging(&settings.log_dir, &settings.log_level, "docs_feed")?;
    settings.log_sources();

    let shutdown = CancellationToken::new();

    let timings = QueueTimings::new(settings.client.display_duration(), settings.client.cooldown());
    let queue = NotificationQueue::spawn_with_token(timings, shutdown.child_token());

    let presenter_handle = tokio::spawn(presenter::run(queue.subscribe(), shutdown.child_token()));

    let listener = LiveFeedListener::notifications(&settings.client, queue.clone())
        .on_error(|e| log::error!("{}", e))
        .spawn_with_token(shutdown.child_token());

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
        }
        _ = async {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut term_signal) => {
                        term_signal.recv().await;
                        log::info!("SIGTERM received, initiating shutdown.");
                    }
                    Err(e) => {
                        log::warn!("Cannot listen for SIGTERM: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                // On non-unix platforms, just wait forever.
                std::future::pending::<()>().await;
            }
        } => {}
    }

    // Cancel the queue driver, the presenter and the listener together
    shutdown.cancel();

    listener.join().await;
    queue.closed().await;
    let _ = presenter_handle.await;

    let state = queue.state();
    log::info!(
        "Shutdown complete. {} notifications received, {} still queued.",
        state.total_count,
        state.queue.len()
    );
    Ok(())
}
