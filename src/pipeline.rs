//! One complete run: scrape every site, filter, publish, persist.
//!
//! ```text
//! fetch -> extract -> spoiler filter -> per-site rank -> dedup -> publish -> save history
//! ```
//!
//! Sites are processed strictly one after another, then the queued
//! candidates are published one after another. Nothing here runs
//! concurrently.

use chrono::{DateTime, Utc};
use std::error::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::SendMessage;
use crate::config::Config;
use crate::filters::dedup::{RunSeen, duplicate_reason};
use crate::filters::rank::rank;
use crate::filters::spoiler::SpoilerFilter;
use crate::history::HistoryStore;
use crate::models::{Article, HistoryEntry};
use crate::publish::Publisher;
use crate::scrapers::{PageSource, scrape_site};

/// What happened during a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub sites_scraped: usize,
    pub sites_failed: usize,
    pub candidates: usize,
    pub spoilers: usize,
    pub duplicates: usize,
    pub queued: usize,
    pub published: usize,
    pub send_failures: usize,
    pub history_saved: Option<usize>,
}

/// Scrape all configured sites and return the candidates worth posting.
///
/// `history` is only read; in-run repeats are tracked separately.
#[instrument(level = "info", skip_all)]
pub async fn collect_candidates<P: PageSource>(
    config: &Config,
    source: &P,
    spoilers: &SpoilerFilter,
    history: &[HistoryEntry],
    now: DateTime<Utc>,
    report: &mut RunReport,
) -> Vec<Article> {
    let mut seen = RunSeen::default();
    let mut queue = Vec::new();

    for site in &config.target_urls {
        let Some(extracted) = scrape_site(source, site, now).await else {
            report.sites_failed += 1;
            continue;
        };
        report.sites_scraped += 1;
        report.candidates += extracted.len();

        let (clean, spoiled): (Vec<_>, Vec<_>) = extracted
            .into_iter()
            .partition(|a| !spoilers.is_spoiler(&a.spoiler_text()));
        report.spoilers += spoiled.len();
        for a in &spoiled {
            debug!(title = %a.title, site = %a.site, "Skipping spoiler");
        }

        for article in rank(clean, config.per_site_limit) {
            if !seen.insert(&article) {
                debug!(title = %article.title, "Already queued this run");
                report.duplicates += 1;
                continue;
            }
            if let Some(reason) = duplicate_reason(&article, history, config.similarity_threshold) {
                debug!(title = %article.title, %reason, "Already posted");
                report.duplicates += 1;
                continue;
            }
            queue.push(article);
        }
    }

    if let Some(cap) = config.max_posts_per_run {
        if queue.len() > cap {
            info!(queued = queue.len(), cap, "Capping posts for this run");
            queue.truncate(cap);
        }
    }
    report.queued = queue.len();
    debug!(distinct = seen.len(), "Candidates considered this run");
    queue
}

/// Run the whole pipeline once.
///
/// With `persist` unset (dry runs) the history file is left untouched.
/// Errors are returned only for the history file; site and send failures
/// are logged and counted.
#[instrument(level = "info", skip_all, fields(sites = config.target_urls.len()))]
pub async fn run<P: PageSource, S: SendMessage>(
    config: &Config,
    source: &P,
    publisher: &Publisher<S>,
    store: &HistoryStore,
    now: DateTime<Utc>,
    persist: bool,
) -> Result<RunReport, Box<dyn Error>> {
    let spoilers = SpoilerFilter::new(config.spoiler_terms.as_slice())?;
    if spoilers.is_empty() {
        warn!("No spoiler terms configured; nothing will be filtered");
    }
    let mut history = store.load().await?;
    let mut report = RunReport::default();

    let queue = collect_candidates(config, source, &spoilers, &history, now, &mut report).await;
    info!(queued = queue.len(), "Publishing candidates");

    for article in &queue {
        if publisher.publish(article, &mut history, now).await {
            report.published += 1;
        } else {
            report.send_failures += 1;
        }
    }

    if persist {
        report.history_saved = Some(store.save(history, now).await?);
    } else {
        warn!("Dry run; history not saved");
    }

    Ok(report)
}
