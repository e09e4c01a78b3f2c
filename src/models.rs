//! Data models for scraped candidates and the published history.
//!
//! - [`Article`]: a candidate entry extracted from a news listing page
//! - [`HistoryEntry`]: a record of something already posted to the channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate article as extracted from a listing page.
///
/// Candidates carry no identity beyond the `(title, link)` pair and are
/// discarded once they are either filtered out or published.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// Headline text, whitespace collapsed.
    pub title: String,
    /// Short teaser (at most 150 chars plus `...`), or empty.
    pub snippet: String,
    /// Absolute link to the article, or the listing page if none was found.
    pub link: String,
    /// Best-effort publication date; "now" when nothing could be parsed.
    pub date: DateTime<Utc>,
    /// The listing page this candidate came from.
    pub site: String,
}

impl Article {
    /// Key used to suppress the same candidate twice within one run.
    pub fn key(&self) -> String {
        format!("{}|{}", self.title, self.link)
    }

    /// Text the spoiler filter looks at.
    pub fn spoiler_text(&self) -> String {
        format!("{} {}", self.title, self.snippet)
    }
}

/// A previously published article.
///
/// Persisted as a JSON array `[title, link, posted_at]`, where `posted_at`
/// is seconds since the Unix epoch. Fractional seconds are accepted so that
/// history files written by older deployments still load.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "(String, String, f64)", into = "(String, String, f64)")]
pub struct HistoryEntry {
    pub title: String,
    pub link: String,
    pub posted_at: f64,
}

impl HistoryEntry {
    pub fn new(title: impl Into<String>, link: impl Into<String>, posted_at: f64) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            posted_at,
        }
    }
}

impl From<(String, String, f64)> for HistoryEntry {
    fn from((title, link, posted_at): (String, String, f64)) -> Self {
        Self {
            title,
            link,
            posted_at,
        }
    }
}

impl From<HistoryEntry> for (String, String, f64) {
    fn from(entry: HistoryEntry) -> Self {
        (entry.title, entry.link, entry.posted_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, snippet: &str, link: &str) -> Article {
        Article {
            title: title.to_string(),
            snippet: snippet.to_string(),
            link: link.to_string(),
            date: Utc::now(),
            site: "https://example.com/news".to_string(),
        }
    }

    #[test]
    fn test_article_key() {
        let a = article("All Blacks name squad", "", "https://example.com/a");
        assert_eq!(a.key(), "All Blacks name squad|https://example.com/a");
    }

    #[test]
    fn test_spoiler_text_joins_title_and_snippet() {
        let a = article("Headline", "Teaser text...", "https://example.com/a");
        assert_eq!(a.spoiler_text(), "Headline Teaser text...");
    }

    #[test]
    fn test_history_entry_serializes_as_array() {
        let entry = HistoryEntry::new("Title", "https://example.com/a", 1_700_000_000.0);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"["Title","https://example.com/a",1700000000.0]"#);
    }

    #[test]
    fn test_history_entry_accepts_fractional_and_integer_timestamps() {
        let json = r#"[["A","https://a",1700000000.25],["B","https://b",1700000001]]"#;
        let entries: Vec<HistoryEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "A");
        assert_eq!(entries[0].posted_at, 1_700_000_000.25);
        assert_eq!(entries[1].link, "https://b");
        assert_eq!(entries[1].posted_at, 1_700_000_001.0);
    }
}
