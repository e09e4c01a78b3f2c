//! Per-site ranking by freshness.

use itertools::Itertools;

use crate::models::Article;

/// Keep the `limit` most recent candidates, newest first.
///
/// The sort is stable: candidates with equal dates keep their extraction
/// order.
pub fn rank(candidates: Vec<Article>, limit: usize) -> Vec<Article> {
    candidates
        .into_iter()
        .sorted_by(|a, b| b.date.cmp(&a.date))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn article(title: &str, hours_ago: i64) -> Article {
        Article {
            title: title.to_string(),
            snippet: String::new(),
            link: format!("https://example.com/{title}"),
            date: base() - Duration::hours(hours_ago),
            site: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_newest_first_and_capped() {
        let input = (0..8).map(|i| article(&format!("a{i}"), (i * 7) % 5)).collect();
        let ranked = rank(input, 5);
        assert_eq!(ranked.len(), 5);
        assert!(ranked.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_ties_keep_extraction_order() {
        let input = vec![
            article("first", 1),
            article("second", 0),
            article("third", 1),
            article("fourth", 0),
        ];
        let titles: Vec<_> = rank(input, 5).into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["second", "fourth", "first", "third"]);
    }

    #[test]
    fn test_fewer_than_limit() {
        let ranked = rank(vec![article("only", 3)], 5);
        assert_eq!(ranked.len(), 1);
        assert!(rank(Vec::new(), 5).is_empty());
    }
}
