//! Sends one sample announcement through the configured channels.
//! Handy for checking TG_TOKEN / TG_CHAT_ID / DISCORD_WEBHOOK_URL before a deploy.

use listing_watch::config::AppConfig;
use listing_watch::notify::discord::DiscordNotifier;
use listing_watch::notify::telegram::TelegramNotifier;
use listing_watch::{Item, Notifier, NotifierMux};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(2);
        }
    };

    let mut mux = NotifierMux::new().with(TelegramNotifier::new(
        cfg.telegram_token.clone(),
        cfg.telegram_chat_id.clone(),
    ));
    if let Some(hook) = cfg.discord_webhook {
        mux.push(Box::new(DiscordNotifier::new(hook)));
    }

    let item = Item::new(
        "Binance Will List DEMO (DEMO) [test message]",
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        None,
        "https://www.binance.com/en/support/announcement/list/48",
    );

    match mux.deliver(&item).await {
        Ok(()) => println!("notify-demo done ({} channel(s))", mux.len()),
        Err(e) => {
            eprintln!("notify-demo failed: {e:#}");
            std::process::exit(1);
        }
    }
}
