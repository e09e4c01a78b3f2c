//! Run configuration.
//!
//! The configuration is read once from a YAML file at startup, merged with
//! command-line and environment overrides, validated, and then passed by
//! reference to every component. Nothing mutates it afterwards.
//!
//! # Example
//!
//! ```yaml
//! telegram_token: "123456:ABC-DEF"
//! channel_id: "@RugbyNewsChannel"
//! target_urls:
//!   - https://www.rugbypass.com/news/
//! spoiler_terms:
//!   - score
//!   - '\d+-\d+'
//! per_site_limit: 5
//! ```

use serde::Deserialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

use crate::cli::Cli;
use crate::filters::dedup::TITLE_SIMILARITY_THRESHOLD;
use crate::history::RETENTION;

pub const DEFAULT_HISTORY_PATH: &str = "posted.json";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

pub const DEFAULT_TARGET_URLS: &[&str] = &[
    "https://all.rugby/news/",
    "https://www.rugbypass.com/news/",
    "https://www.bbc.com/sport/rugby-union",
    "https://www.rugby365.com/news/",
    "https://www.planetrugby.com/news",
];

pub const DEFAULT_SPOILER_TERMS: &[&str] = &[
    "score",
    "result",
    "beat",
    "defeated",
    "win",
    "loss",
    "try count",
    "tries",
    "conversion",
    r"\d+-\d+",
];

/// Immutable settings for a single run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Bot credential issued by BotFather.
    pub telegram_token: String,
    /// Target channel, e.g. `@RugbyNewsChannel` or a numeric chat id.
    pub channel_id: String,
    /// Listing pages to scrape, in order.
    pub target_urls: Vec<String>,
    /// Literal terms and regex patterns that mark a candidate as a spoiler.
    pub spoiler_terms: Vec<String>,
    /// Where the posted history is persisted.
    pub history_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Maximum candidates kept per site after ranking.
    pub per_site_limit: usize,
    /// Fuzzy title score (0-100) at or above which a candidate is a repeat.
    pub similarity_threshold: u8,
    pub retention_days: u64,
    /// Pause after every send.
    pub post_delay_ms: u64,
    /// Extra pause after a failed send.
    pub error_delay_ms: u64,
    /// Optional cap on the number of posts per run.
    pub max_posts_per_run: Option<usize>,
    pub telegram_api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_token: String::new(),
            channel_id: String::new(),
            target_urls: DEFAULT_TARGET_URLS.iter().map(|s| s.to_string()).collect(),
            spoiler_terms: DEFAULT_SPOILER_TERMS.iter().map(|s| s.to_string()).collect(),
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            request_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            per_site_limit: 5,
            similarity_threshold: TITLE_SIMILARITY_THRESHOLD,
            retention_days: RETENTION.as_secs() / 86_400,
            post_delay_ms: 2_000,
            error_delay_ms: 5_000,
            max_posts_per_run: None,
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from YAML text. Missing keys take defaults.
    pub fn from_yaml(text: &str) -> Result<Self, Box<dyn Error>> {
        let config: Config = serde_yaml::from_str(text)?;
        Ok(config)
    }

    /// Read the YAML file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        let config = Self::from_yaml(&text)?;
        info!(
            sites = config.target_urls.len(),
            spoiler_terms = config.spoiler_terms.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Apply command-line and environment overrides.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(token) = &cli.telegram_token {
            self.telegram_token = token.clone();
        }
        if let Some(channel) = &cli.channel_id {
            self.channel_id = channel.clone();
        }
        if let Some(history) = &cli.history {
            self.history_path = history.clone();
        }
        self
    }

    /// Reject configurations that cannot produce a useful run.
    ///
    /// Credentials are only required when messages will actually be sent.
    pub fn validate(&self, dry_run: bool) -> Result<(), Box<dyn Error>> {
        if self.target_urls.is_empty() {
            return Err("config lists no target_urls".into());
        }
        for site in &self.target_urls {
            url::Url::parse(site).map_err(|e| format!("invalid target url {site:?}: {e}"))?;
        }
        if self.similarity_threshold > 100 {
            return Err("similarity_threshold must be between 0 and 100".into());
        }
        if !dry_run {
            if self.telegram_token.trim().is_empty() {
                return Err("telegram_token is not set".into());
            }
            if self.channel_id.trim().is_empty() {
                return Err("channel_id is not set".into());
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn post_delay(&self) -> Duration {
        Duration::from_millis(self.post_delay_ms)
    }

    pub fn error_delay(&self) -> Duration {
        Duration::from_millis(self.error_delay_ms)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days * 24 * 60 * 60)
    }
}
