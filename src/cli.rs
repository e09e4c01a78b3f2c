//! Command-line interface definitions.
//!
//! Everything here is optional: the YAML config file carries the full
//! configuration, and these flags (or their environment variables) only
//! override individual values for a run.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the news relay.
///
/// # Examples
///
/// ```sh
/// # Scheduled run with everything in config.yaml
/// rugby_news_bot
///
/// # Credentials from the environment, alternate config
/// TELEGRAM_TOKEN=123:abc CHANNEL_ID=@RugbyNews rugby_news_bot -c /etc/rugby/config.yaml
///
/// # See what would be posted without sending anything
/// rugby_news_bot --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "RUGBY_NEWS_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Path to the posted-history JSON file (overrides `history_path`)
    #[arg(long, env = "RUGBY_NEWS_HISTORY")]
    pub history: Option<PathBuf>,

    /// Telegram bot token (overrides `telegram_token`)
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Telegram channel id (overrides `channel_id`)
    #[arg(long, env = "CHANNEL_ID")]
    pub channel_id: Option<String>,

    /// Log the messages that would be posted instead of sending them, and leave history untouched
    #[arg(long)]
    pub dry_run: bool,
}
