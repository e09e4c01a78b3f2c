//! Fetching and extracting candidate articles from news listing pages.
//!
//! Each configured site goes through the same two steps:
//!
//! 1. **Fetching** ([`fetch`]): one HTTP GET with a browser-like user agent
//!    and a fixed timeout
//! 2. **Extracting** ([`extract`]): a shared list of heuristic selectors pulls
//!    title, link, snippet and a best-effort date ([`dates`]) out of the page
//!
//! A site that fails to fetch contributes no candidates; it never stops the
//! other sites from being scraped.

pub mod dates;
pub mod extract;
pub mod fetch;

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument};

use crate::models::Article;
pub use fetch::{HttpFetcher, PageSource};

/// Fetch one site and extract its candidates.
///
/// # Arguments
///
/// * `source` - Where pages come from (HTTP in production)
/// * `site` - The listing page URL
/// * `now` - Fallback date for undated candidates
///
/// # Returns
///
/// The extracted candidates, possibly empty. `None` when the page could not
/// be fetched, so callers can tell a failed site from one that simply had
/// nothing matching. Fetch errors are logged here.
#[instrument(level = "info", skip(source, now))]
pub async fn scrape_site<P: PageSource>(
    source: &P,
    site: &str,
    now: DateTime<Utc>,
) -> Option<Vec<Article>> {
    match source.fetch_page(site).await {
        Ok(html) => {
            let articles = extract::extract_articles(&html, site, now);
            info!(count = articles.len(), bytes = html.len(), "Extracted candidates");
            Some(articles)
        }
        Err(e) => {
            error!(error = %e, "Error scraping site");
            None
        }
    }
}
