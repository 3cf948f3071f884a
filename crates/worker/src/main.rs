use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sift_core::config::Settings;
use sift_core::ports::{ChannelRegistry, MessageRegistry, MessageSource, Notifier, SubscriberRegistry};
use sift_store::{ChannelIndex, MessageIndex, SearchStore, SubscriberIndex};
use tracing::{error, info};

mod bot;
mod jobs;
mod source;

use bot::TelegramBot;
use source::TelegramGateway;

/// Crawls registered channels into the search index and pushes keyword
/// matches back to subscribers.
#[derive(Debug, Parser)]
#[command(name = "sift-worker")]
struct Args {
    /// Create the store indexes with their mappings, then exit
    #[arg(long)]
    setup: bool,
    /// Run a single crawl cycle over all active channels, then exit
    #[arg(long)]
    download: bool,
    /// Run a single notification cycle over all subscribers, then exit
    #[arg(long)]
    notify: bool,
    /// Run both background loops until the process is terminated
    #[arg(long)]
    start: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let args = Args::parse();
    if !args.setup && !args.download && !args.notify && !args.start {
        error!("no mode selected; pass --setup, --download, --notify or --start");
        std::process::exit(2);
    }

    let settings = Settings::from_env();

    let store = Arc::new(SearchStore::new(
        &settings.store_url,
        &settings.store_username,
        &settings.store_password,
        settings.store_insecure,
    )?);
    if args.setup {
        info!("creating store indexes");
        sift_store::bootstrap::create_indexes(&store).await?;
    }

    let channels = ChannelIndex::new(store.clone());
    let subscribers = SubscriberIndex::new(store.clone());
    let messages = MessageIndex::new(store);
    let source = TelegramGateway::new(&settings.gateway_url)?;
    let bot = TelegramBot::new(&settings.bot_token)?;

    if args.download {
        info!("starting message download cycle");
        jobs::crawl::run(&source, &channels, &messages).await?;
    }

    if args.notify {
        info!("starting notification cycle");
        jobs::notify::run(&subscribers, &messages, &bot).await?;
    }

    if args.start {
        info!(
            crawl_interval_secs = settings.crawl_interval_secs,
            notify_interval_secs = settings.notify_interval_secs,
            "starting download and notification background loops"
        );
        tokio::join!(
            crawl_loop(
                Duration::from_secs(settings.crawl_interval_secs),
                &source,
                &channels,
                &messages,
            ),
            notify_loop(
                Duration::from_secs(settings.notify_interval_secs),
                &subscribers,
                &messages,
                &bot,
            ),
        );
    }

    Ok(())
}

/// A failed cycle is logged and retried on the next tick; nothing inside the
/// loop may kill it.
async fn crawl_loop(
    interval: Duration,
    source: &dyn MessageSource,
    channels: &dyn ChannelRegistry,
    messages: &dyn MessageRegistry,
) {
    loop {
        if let Err(err) = jobs::crawl::run(source, channels, messages).await {
            error!(%err, "crawl cycle failed");
        }
        tokio::time::sleep(interval).await;
    }
}

async fn notify_loop(
    interval: Duration,
    subscribers: &dyn SubscriberRegistry,
    messages: &dyn MessageRegistry,
    notifier: &dyn Notifier,
) {
    loop {
        if let Err(err) = jobs::notify::run(subscribers, messages, notifier).await {
            error!(%err, "notify cycle failed");
        }
        tokio::time::sleep(interval).await;
    }
}
