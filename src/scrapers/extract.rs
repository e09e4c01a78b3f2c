//! Heuristic article extraction from listing pages.
//!
//! No site gets its own adapter. Instead a shared, ordered list of
//! [`ExtractionRule`]s is applied to every page. Each rule holds fallback
//! selectors; the first one with any matches is used for that rule. Every
//! rule contributes, in order. An element already yielded by an earlier rule
//! is skipped, and so is anything nested inside one.
//!
//! From each matched block the extractor derives:
//!
//! | Field | Source |
//! |-------|--------|
//! | title | the block itself if it is a heading, else its first heading, else its first anchor text |
//! | link | the block's anchor, a descendant anchor, or an enclosing anchor; else the page URL |
//! | snippet | first paragraph or summary-like element inside or right after the block |
//! | date | `<time datetime>` in the block, else a date in the title, else now |

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

use crate::models::Article;
use crate::scrapers::dates::{parse_datetime_attr, parse_fuzzy};
use crate::utils::{collapse_whitespace, truncate_snippet};

/// Maximum snippet length before the `...` marker.
pub const SNIPPET_MAX_CHARS: usize = 150;

/// How many following siblings of a bare heading are searched for a teaser.
const SNIPPET_SIBLING_LOOKAHEAD: usize = 3;

/// A named group of fallback selectors.
pub struct ExtractionRule {
    pub name: &'static str,
    pub selectors: Vec<Selector>,
}

impl ExtractionRule {
    fn new(name: &'static str, selectors: &[&str]) -> Self {
        Self {
            name,
            selectors: selectors
                .iter()
                .map(|s| Selector::parse(s).expect("static extraction selector"))
                .collect(),
        }
    }
}

/// The shared rule list, in priority order.
pub static RULES: Lazy<Vec<ExtractionRule>> = Lazy::new(|| {
    vec![
        ExtractionRule::new("containers", &[".article", ".news-item", "article"]),
        ExtractionRule::new("post-titles", &[".post-title"]),
        ExtractionRule::new("headings", &["h2"]),
    ]
});

static HEADING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, .post-title, .title").expect("static selector"));
static SELF_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6, .post-title").expect("static selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));
static SNIPPET: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p, .summary, .excerpt, .standfirst, .description").expect("static selector")
});
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time").expect("static selector"));

/// Extract candidate articles from one listing page.
///
/// Pure: the same HTML, site and `now` always yield the same candidates.
/// Blocks without a usable title are dropped.
///
/// # Arguments
///
/// * `html` - The listing page body
/// * `site` - The page URL; relative links are resolved against it and it
///   stands in for a missing link
/// * `now` - Date given to candidates with no recognisable date
///
/// # Returns
///
/// Candidates in extraction order: rule by rule, document order within a
/// rule.
pub fn extract_articles(html: &str, site: &str, now: DateTime<Utc>) -> Vec<Article> {
    let document = Html::parse_document(html);
    let base = Url::parse(site).ok();
    let mut visited = HashSet::new();
    let mut articles = Vec::new();

    for rule in RULES.iter() {
        let Some(blocks) = first_matching(&document, rule) else {
            tracing::trace!(rule = rule.name, site, "Rule matched nothing");
            continue;
        };
        tracing::trace!(rule = rule.name, site, matches = blocks.len(), "Rule matched");

        for block in blocks {
            // Skip the block itself or anything inside a block already taken.
            if !visited.insert(block.id())
                || block.ancestors().any(|node| visited.contains(&node.id()))
            {
                continue;
            }
            if let Some(article) = extract_block(block, site, base.as_ref(), now) {
                articles.push(article);
            }
        }
    }

    articles
}

fn first_matching<'a>(document: &'a Html, rule: &ExtractionRule) -> Option<Vec<ElementRef<'a>>> {
    rule.selectors
        .iter()
        .map(|sel| document.select(sel).collect::<Vec<_>>())
        .find(|matches| !matches.is_empty())
}

fn extract_block(
    block: ElementRef<'_>,
    site: &str,
    base: Option<&Url>,
    now: DateTime<Utc>,
) -> Option<Article> {
    let title = block_title(block);
    if title.is_empty() {
        return None;
    }

    let link = block_link(block, base).unwrap_or_else(|| site.to_string());

    let snippet = block_snippet(block)
        .map(|text| truncate_snippet(&text, SNIPPET_MAX_CHARS))
        .unwrap_or_default();

    let date = block
        .select(&TIME)
        .next()
        .and_then(|time| {
            time.value()
                .attr("datetime")
                .and_then(parse_datetime_attr)
                .or_else(|| parse_datetime_attr(&element_text(time)))
        })
        .or_else(|| parse_fuzzy(&title))
        .unwrap_or(now);

    Some(Article {
        title,
        snippet,
        link,
        date,
        site: site.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn block_title(block: ElementRef<'_>) -> String {
    if SELF_TITLE.matches(&block) {
        return element_text(block);
    }
    block
        .select(&HEADING)
        .map(element_text)
        .find(|t| !t.is_empty())
        .or_else(|| block.select(&ANCHOR).map(element_text).find(|t| !t.is_empty()))
        .unwrap_or_default()
}

/// First usable link: the block's own anchor, then descendant anchors, then
/// the nearest enclosing anchor.
fn block_link(block: ElementRef<'_>, base: Option<&Url>) -> Option<String> {
    let own = (block.value().name() == "a").then_some(block);
    let enclosing = block
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a");

    own.into_iter()
        .chain(block.select(&ANCHOR))
        .chain(enclosing)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| resolve_link(href, base))
}

/// Resolve `href` against the page URL. Fragment-only and script links are
/// not article links.
fn resolve_link(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    match base {
        Some(base) => base.join(href).ok().map(|u| u.to_string()),
        None => Some(href.to_string()),
    }
}

fn block_snippet(block: ElementRef<'_>) -> Option<String> {
    if let Some(text) = block.select(&SNIPPET).map(element_text).find(|t| !t.is_empty()) {
        return Some(text);
    }
    // Only bare headings borrow a teaser from what follows them; a container
    // must not pick up its neighbour's paragraph.
    if !SELF_TITLE.matches(&block) {
        return None;
    }
    block
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take(SNIPPET_SIBLING_LOOKAHEAD)
        .find_map(|sibling| {
            if SNIPPET.matches(&sibling) {
                Some(element_text(sibling))
            } else {
                sibling.select(&SNIPPET).next().map(element_text)
            }
        })
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SITE: &str = "https://www.rugbypass.com/news/";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_article_container() {
        let html = r#"
            <html><body>
              <div class="article">
                <h3><a href="/news/lions-squad/">Lions name touring squad</a></h3>
                <p>The British and Irish Lions have named   their squad
                   for the upcoming tour.</p>
                <time datetime="2026-10-15T08:00:00Z">Yesterday</time>
              </div>
            </body></html>
        "#;
        let articles = extract_articles(html, SITE, now());
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.title, "Lions name touring squad");
        assert_eq!(a.link, "https://www.rugbypass.com/news/lions-squad/");
        assert_eq!(
            a.snippet,
            "The British and Irish Lions have named their squad for the upcoming tour...."
        );
        assert_eq!(a.date, Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap());
        assert_eq!(a.site, SITE);
    }

    #[test]
    fn test_heading_with_following_paragraph() {
        let html = r#"
            <html><body>
              <section>
                <h2><a href="https://example.org/story">Ireland coach extends contract</a></h2>
                <div class="meta">By staff</div>
                <p class="summary">The deal runs until the next World Cup.</p>
              </section>
            </body></html>
        "#;
        let articles = extract_articles(html, SITE, now());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Ireland coach extends contract");
        assert_eq!(articles[0].link, "https://example.org/story");
        assert_eq!(articles[0].snippet, "The deal runs until the next World Cup....");
        assert_eq!(articles[0].date, now());
    }

    #[test]
    fn test_heading_inside_anchor_uses_enclosing_link() {
        let html = r#"<a href="/news/x"><h2>Wales injury update</h2></a>"#;
        let articles = extract_articles(html, SITE, now());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].link, "https://www.rugbypass.com/news/x");
    }

    #[test]
    fn test_container_does_not_borrow_neighbour_teaser() {
        let html = r#"
            <div class="article"><h3>No teaser here</h3></div>
            <div class="article"><h3>Has teaser</h3><p>Its own paragraph.</p></div>
        "#;
        let articles = extract_articles(html, SITE, now());
        assert_eq!(articles[0].snippet, "");
        assert_eq!(articles[1].snippet, "Its own paragraph....");
    }

    #[test]
    fn test_missing_link_falls_back_to_site() {
        let html = r#"<h2>Scotland announce captain</h2>"#;
        let articles = extract_articles(html, SITE, now());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].link, SITE);
        assert_eq!(articles[0].snippet, "");
    }

    #[test]
    fn test_block_without_title_dropped() {
        let html = r#"<div class="news-item"><p>Only a teaser, no heading.</p></div>"#;
        assert!(extract_articles(html, SITE, now()).is_empty());
    }

    #[test]
    fn test_no_matching_selectors_yields_nothing() {
        let html = r#"<html><body><div><span>Nothing to see</span></div></body></html>"#;
        assert!(extract_articles(html, SITE, now()).is_empty());
    }

    #[test]
    fn test_rule_fallback_uses_first_non_empty_selector() {
        // `.article` matches nothing, so `.news-item` is used and `article` is never consulted.
        let html = r#"
            <div class="news-item"><h3>First</h3></div>
            <article><h3>Second</h3></article>
        "#;
        let titles: Vec<_> = extract_articles(html, SITE, now())
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["First"]);
    }

    #[test]
    fn test_element_yielded_once_across_rules() {
        let html = r#"<h2 class="post-title"><a href="/a">Same node</a></h2>"#;
        let articles = extract_articles(html, SITE, now());
        assert_eq!(articles.len(), 1);
    }

    #[test]
    fn test_overlapping_rules_keep_extraction_order() {
        let html = r#"
            <div class="article"><h2><a href="/a">Container story</a></h2></div>
            <h2><a href="/b">Loose heading</a></h2>
        "#;
        let titles: Vec<_> = extract_articles(html, SITE, now())
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["Container story", "Loose heading"]);
    }

    #[test]
    fn test_nested_heading_keeps_container_date() {
        let items: String = (0..6)
            .map(|i| {
                format!(
                    r#"<div class="article"><h2><a href="/s{i}">Story {i}</a></h2><time datetime="2026-10-{:02}T09:00:00Z"></time></div>"#,
                    10 + i
                )
            })
            .collect();
        let html = format!("<html><body>{items}</body></html>");

        let articles = extract_articles(&html, SITE, now());
        assert_eq!(articles.len(), 6);
        assert!(articles.iter().all(|a| a.date != now()));

        let kept: Vec<_> = crate::filters::rank::rank(articles, 5)
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(kept, vec!["Story 5", "Story 4", "Story 3", "Story 2", "Story 1"]);
    }

    #[test]
    fn test_date_from_title_when_no_time_element() {
        let html = r#"<h2>Fixtures released 12 November 2026</h2>"#;
        let articles = extract_articles(html, SITE, now());
        assert_eq!(
            articles[0].date,
            Utc.with_ymd_and_hms(2026, 11, 12, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_bad_time_attr_defaults_to_now() {
        let html = r#"<article><h3>Story</h3><time datetime="soon">soon</time></article>"#;
        let articles = extract_articles(html, SITE, now());
        assert_eq!(articles[0].date, now());
    }

    #[test]
    fn test_fragment_links_ignored() {
        let html =
            r##"<article><h3><a href="#top">Story</a></h3><a href="/real">more</a></article>"##;
        let articles = extract_articles(html, SITE, now());
        assert_eq!(articles[0].link, "https://www.rugbypass.com/real");
    }
}
