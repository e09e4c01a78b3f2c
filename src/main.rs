//! # Rugby News Bot
//!
//! Relays rugby headlines to a Telegram channel without giving away results.
//!
//! Each run scrapes a fixed list of news listing pages, drops anything that
//! mentions a score or outcome, skips what was already posted in the last
//! week, and posts the rest. It runs once and exits; schedule it externally
//! (cron, a systemd timer) to run hourly.
//!
//! ## Usage
//!
//! ```sh
//! TELEGRAM_TOKEN=123:abc CHANNEL_ID=@RugbyNews rugby_news_bot -c config.yaml
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: GET each listing page, one after another
//! 2. **Extracting**: shared heuristic selectors produce candidates
//! 3. **Filtering**: spoiler terms, per-site freshness cap, duplicates
//! 4. **Publishing**: one message per candidate with a pause in between
//! 5. **History**: record what was posted, prune to seven days, save

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod filters;
mod history;
mod models;
mod pipeline;
mod publish;
mod scrapers;
mod utils;

use api::{DryRunSink, TelegramBot};
use cli::Cli;
use config::Config;
use history::HistoryStore;
use pipeline::RunReport;
use publish::Publisher;
use scrapers::HttpFetcher;
use utils::ensure_writable_parent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("Starting scrape");

    let args = Cli::parse();
    debug!(config = %args.config.display(), dry_run = args.dry_run, "Parsed CLI arguments");

    let config = Config::load(&args.config).await?.with_overrides(&args);
    config.validate(args.dry_run)?;

    let store = HistoryStore::new(&config.history_path, config.retention());
    if !args.dry_run {
        // Fail before posting anything if the history can't be written afterwards.
        ensure_writable_parent(store.path()).await?;
    }

    let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout())?;
    let now = Utc::now();

    let report = if args.dry_run {
        let publisher = Publisher::new(DryRunSink, Duration::ZERO, Duration::ZERO);
        pipeline::run(&config, &fetcher, &publisher, &store, now, false).await?
    } else {
        let bot = TelegramBot::new(
            &config.telegram_api_base,
            &config.telegram_token,
            &config.channel_id,
            config.request_timeout(),
        )?;
        let publisher = Publisher::new(bot, config.post_delay(), config.error_delay());
        pipeline::run(&config, &fetcher, &publisher, &store, now, true).await?
    };

    log_report(&report, start_time);
    Ok(())
}

fn log_report(report: &RunReport, start_time: Instant) {
    let elapsed = start_time.elapsed();
    info!(
        sites_scraped = report.sites_scraped,
        sites_failed = report.sites_failed,
        candidates = report.candidates,
        spoilers = report.spoilers,
        duplicates = report.duplicates,
        queued = report.queued,
        published = report.published,
        send_failures = report.send_failures,
        history_entries = ?report.history_saved,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Run complete"
    );
}
