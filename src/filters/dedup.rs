//! Duplicate suppression.
//!
//! Two separate checks run on every candidate:
//!
//! - [`RunSeen`]: exact `title|link` keys already queued during this run, so
//!   overlapping selectors on one page (or two sites syndicating the same
//!   piece) never post it twice
//! - [`duplicate_reason`]: the candidate against the persisted history,
//!   either by identical link or by a fuzzy title score at or above the
//!   threshold
//!
//! Links are compared verbatim; a trailing slash or a query string makes two
//! links different.

use std::collections::HashSet;
use std::fmt;

use crate::models::{Article, HistoryEntry};

/// Default fuzzy score (0-100) at which two titles count as the same story.
pub const TITLE_SIMILARITY_THRESHOLD: u8 = 85;

/// Why a candidate was judged a repeat.
#[derive(Debug, Clone, PartialEq)]
pub enum DuplicateReason {
    SameLink,
    SimilarTitle { score: u8, previous: String },
}

impl fmt::Display for DuplicateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateReason::SameLink => write!(f, "link already posted"),
            DuplicateReason::SimilarTitle { score, previous } => {
                write!(f, "title scores {score} against {previous:?}")
            }
        }
    }
}

/// Check a candidate against every history entry.
///
/// The fuzzy comparison is title against title.
pub fn duplicate_reason(
    candidate: &Article,
    history: &[HistoryEntry],
    threshold: u8,
) -> Option<DuplicateReason> {
    history.iter().find_map(|entry| {
        if entry.link == candidate.link {
            return Some(DuplicateReason::SameLink);
        }
        let score = token_sort_ratio(&candidate.title, &entry.title);
        (score >= threshold).then(|| DuplicateReason::SimilarTitle {
            score,
            previous: entry.title.clone(),
        })
    })
}

/// Keys of candidates already accepted in the current run.
#[derive(Debug, Default)]
pub struct RunSeen {
    keys: HashSet<String>,
}

impl RunSeen {
    /// Record the candidate; false if it was already seen this run.
    pub fn insert(&mut self, candidate: &Article) -> bool {
        self.keys.insert(candidate.key())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

/// Word-order-insensitive similarity on a 0-100 scale.
///
/// # Arguments
///
/// * `a`, `b` - The titles to compare
///
/// # Returns
///
/// A score from 0 (nothing in common) to 100 (same words in any order).
///
/// Non-ASCII characters are dropped (`Pérez` reads as `Prez`), the rest is
/// lowercased, anything that is not alphanumeric or `_` becomes a space, and
/// the tokens are sorted and rejoined before comparing.
/// The comparison counts characters in matching blocks (longest common
/// substring, then recursively on both sides of it) and scores
/// `2 * matches / total_len`, rounded half-to-even. An empty side scores 0.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = sorted_tokens(a).chars().collect();
    let b: Vec<char> = sorted_tokens(b).chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let matches = matching_chars(&a, &b);
    let percent = (200 * matches) as f64 / (a.len() + b.len()) as f64;
    percent.round_ties_even() as u8
}

fn sorted_tokens(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(char::is_ascii)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .to_lowercase();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Longest common run in `a[alo..ahi]` and `b[blo..bhi]`, earliest on ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // run[x + 1] is the length of the common run ending at b[blo + x]
    let mut prev = vec![0usize; bhi - blo + 1];
    for i in alo..ahi {
        let mut run = vec![0usize; bhi - blo + 1];
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j - blo] + 1;
                run[j - blo + 1] = k;
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        prev = run;
    }
    (best_i, best_j, best_k)
}
