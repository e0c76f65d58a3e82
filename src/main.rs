//! listing-watch — binary entrypoint.
//! Loads config, wires sources, notifiers and the cursor store, then polls forever.

use anyhow::Context;
use listing_watch::config::AppConfig;
use listing_watch::cursor::FileCursorStore;
use listing_watch::ingest::config::load_sources_default;
use listing_watch::ingest::fetch::HttpFetcher;
use listing_watch::notify::discord::DiscordNotifier;
use listing_watch::notify::telegram::TelegramNotifier;
use listing_watch::{NotifierMux, Poller};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(2);
        }
    };
    listing_watch::init_tracing(cfg.debug);

    if let Some(addr) = cfg.metrics_addr {
        listing_watch::telemetry::install(addr)?;
    }

    let sources = load_sources_default().context("loading sources")?;
    tracing::info!(
        sources = ?sources.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        interval_secs = cfg.poll_interval.as_secs(),
        state = %cfg.state_path.display(),
        "starting listing watch"
    );

    let fetcher = HttpFetcher::new().context("building http client")?;

    let mut mux = NotifierMux::new().with(
        TelegramNotifier::new(cfg.telegram_token.clone(), cfg.telegram_chat_id.clone())
            .with_client(fetcher.client()),
    );
    if let Some(hook) = cfg.discord_webhook.clone() {
        mux.push(Box::new(DiscordNotifier::new(hook).with_client(fetcher.client())));
    }

    let poller = Poller::new(
        sources,
        Box::new(fetcher),
        Box::new(mux),
        Box::new(FileCursorStore::new(cfg.state_path.clone())),
    )
    .with_retry(cfg.retry)
    .with_interval(cfg.poll_interval);

    tokio::select! {
        _ = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
        }
    }
    Ok(())
}
