use anyhow::{Context, Result};
use lead_watch::browser::login::login;
use lead_watch::browser::webdriver::WebDriverPage;
use lead_watch::config::{Config, LoggingConfig};
use lead_watch::controller::{LoopController, LoopTimings};
use lead_watch::lead::auction_cards::AuctionCards;
use lead_watch::lead::extractor::Extractor;
use lead_watch::notify::webhook::WebhookClient;
use lead_watch::notify::{DispatchMode, Notifier};
use lead_watch::pipeline::Pipeline;
use lead_watch::scheduler::shutdown_channel;
use lead_watch::store::sheets::SheetsStore;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .with_context(|| format!("invalid log filter: {}", config.filter))?;

    match config.file {
        Some(ref path) => {
            let log_file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(log_file)
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var("LEAD_WATCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let config = Config::load(Path::new(&config_path))?;

    // Load saved secrets from .env (real env vars take precedence)
    Config::load_env_file();
    init_logging(&config.logging)?;

    let password = Config::login_password()?;
    let webhook_token = Config::webhook_token()?;

    // --- Services ---
    let store = Arc::new(SheetsStore::new(&config.store).context("store initialization failed")?);
    match store.preflight_check().await {
        Ok(rows) => tracing::info!(rows, range = %config.store.range, "store reachable"),
        Err(e) => tracing::warn!(error = %format!("{:#}", e), "store pre-flight failed, will retry each cycle"),
    }

    let sink = Arc::new(WebhookClient::new(
        &config.webhook.url,
        webhook_token,
        config.webhook.timeout(),
    )?);
    let notifier = Notifier::new(sink, &config.webhook, &config.notify, DispatchMode::FireAndForget);

    let extractor = Extractor::new(Box::new(AuctionCards::new()));
    tracing::info!(strategy = extractor.strategy_id(), gating = ?config.notify.gating, "pipeline ready");
    let pipeline = Pipeline::new(extractor, store, notifier, config.notify.gating);

    // --- Session bootstrap ---
    let page = WebDriverPage::start(&config.browser).await?;
    tracing::info!(url = %config.portal.target_url, "logging in");
    if let Err(e) = login(&page, &config.portal, &password).await {
        let _ = page.quit().await;
        return Err(e.context("initial login failed"));
    }

    // --- Poll loop ---
    let (shutdown_tx, scheduler) = shutdown_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    let timings = LoopTimings {
        poll_interval: config.poll_interval(),
        retry_delay: config.retry_delay(),
        wait_timeout: config.portal.wait_timeout(),
    };
    let mut controller = LoopController::new(
        page,
        pipeline,
        &config.portal.listing_selector,
        timings,
        scheduler,
    );
    controller.run().await;

    controller.into_page().quit().await?;
    Ok(())
}
