use forward_cycle::ForwardCycle;
use reddit_client::RedditClient;
use redgram_core::{Config, ForwarderError};
use state_store::DedupStore;
use telegram_client::TelegramDispatcher;

#[tokio::main]
async fn main() -> Result<(), ForwarderError> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting redgram - Reddit to Telegram forwarder");

    // Validate configuration before any network call
    let config = Config::from_env()?;

    let source = RedditClient::new(&config)?;
    let sink = TelegramDispatcher::new(&config)?;
    let mut store = DedupStore::load(&config.state_file)?;

    let cycle = ForwardCycle::new(source, sink);
    let report = cycle.run(&mut store).await.map_err(|e| {
        tracing::error!("Cycle failed: {}", e);
        e
    })?;

    tracing::info!(
        "Run complete: {} forwarded, {} failed, {} already seen",
        report.forwarded,
        report.failed,
        report.already_seen
    );
    Ok(())
}
