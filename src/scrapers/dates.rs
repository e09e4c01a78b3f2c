//! Best-effort publication date parsing.
//!
//! Listing pages are inconsistent about dates: some expose a machine-readable
//! `datetime` attribute, some only print a date in the headline, most show
//! nothing at all. Every function here returns `Option` and the caller falls
//! back to "now", so a bad date never drops a candidate or disturbs ranking.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

const MONTHS: &str = "jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})(?:[T ](\d{2}):(\d{2})(?::(\d{2}))?)?")
        .expect("static date pattern")
});

static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+({MONTHS})[a-z]*\.?,?\s+(\d{{4}})\b"
    ))
    .expect("static date pattern")
});

static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTHS})[a-z]*\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b"
    ))
    .expect("static date pattern")
});

/// Parse the `datetime` attribute (or text) of a `<time>` element.
///
/// Accepts RFC 3339, RFC 2822 and the common `Y-m-d[ H:M[:S]]` forms, then
/// falls back to scanning the string like a headline.
pub fn parse_datetime_attr(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return midnight(date);
    }
    parse_fuzzy(raw)
}

/// Find the first recognisable date anywhere in free text.
///
/// Handles `2026-10-16`, `2026-10-16 14:30`, `16 Oct 2026`, `16th October,
/// 2026`, and `October 16, 2026`. Bare score lines like `20-15` never match.
pub fn parse_fuzzy(text: &str) -> Option<DateTime<Utc>> {
    if let Some(caps) = ISO_DATE.captures(text) {
        let date = ymd(&caps[1], &caps[2], &caps[3])?;
        let hour = caps.get(4).map_or(Some(0), |m| m.as_str().parse().ok())?;
        let minute = caps.get(5).map_or(Some(0), |m| m.as_str().parse().ok())?;
        let second = caps.get(6).map_or(Some(0), |m| m.as_str().parse().ok())?;
        let naive = date.and_hms_opt(hour, minute, second)?;
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Some(caps) = DAY_MONTH_YEAR.captures(text) {
        let month = month_number(&caps[2])?;
        return midnight(NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            month,
            caps[1].parse().ok()?,
        )?);
    }
    if let Some(caps) = MONTH_DAY_YEAR.captures(text) {
        let month = month_number(&caps[1])?;
        return midnight(NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            month,
            caps[2].parse().ok()?,
        )?);
    }
    None
}

fn ymd(y: &str, m: &str, d: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_ascii_lowercase();
    MONTHS
        .split('|')
        .position(|m| m == prefix)
        .map(|i| i as u32 + 1)
}
