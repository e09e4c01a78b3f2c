//! Spoiler detection by keyword and pattern.
//!
//! Configured terms come as one list. An entry with regex metacharacters in
//! it (`\d+-\d+` for a score line) is compiled as a case-insensitive pattern;
//! anything else is a plain lowercase substring. There is no word-boundary
//! handling, so `tries` also matches `countries`.

use regex::{Regex, RegexBuilder};
use std::error::Error;

const REGEX_METACHARS: &[char] = &[
    '\\', '.', '+', '*', '?', '(', ')', '|', '[', ']', '{', '}', '^', '$',
];

#[derive(Debug, Clone, Default)]
pub struct SpoilerFilter {
    literals: Vec<String>,
    patterns: Vec<Regex>,
}

impl SpoilerFilter {
    /// Build a filter from configured terms.
    ///
    /// Fails if an entry that looks like a pattern does not compile.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self, Box<dyn Error>> {
        let mut filter = Self::default();
        for term in terms {
            let term: &str = term.as_ref();
            if term.trim().is_empty() {
                continue;
            }
            if term.contains(REGEX_METACHARS) {
                let re = RegexBuilder::new(term)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| format!("invalid spoiler pattern {term:?}: {e}"))?;
                filter.patterns.push(re);
            } else {
                filter.literals.push(term.to_lowercase());
            }
        }
        Ok(filter)
    }

    /// True if `text` gives something away.
    pub fn is_spoiler(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.literals.iter().any(|term| lowered.contains(term.as_str()))
            || self.patterns.iter().any(|re| re.is_match(&lowered))
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.patterns.is_empty()
    }
}
