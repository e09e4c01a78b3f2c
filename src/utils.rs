//! Small helpers for text shaping, time conversion and file system checks.

use chrono::{DateTime, Utc};
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of dropped characters appended. Counts characters, not bytes, so headlines
/// with accented names never split inside a code point.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of characters to keep
///
/// # Returns
///
/// The original string if it fits, otherwise the first `max` characters
/// with `"…(+N chars)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", head, total - max)
    }
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shape a teaser paragraph into a snippet.
///
/// # Arguments
///
/// * `s` - Whitespace-collapsed teaser text
/// * `max` - Maximum number of characters kept before the marker
///
/// # Returns
///
/// The first `max` characters followed by `...`, even when nothing was cut.
/// Empty text stays empty.
pub fn truncate_snippet(s: &str, max: usize) -> String {
    let text = collapse_whitespace(s);
    if text.is_empty() {
        return String::new();
    }
    let head: String = text.chars().take(max).collect();
    format!("{head}...")
}

/// Seconds since the Unix epoch, with sub-second precision.
pub fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_micros()) / 1_000_000.0
}

/// Ensure the directory that will hold `file` exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
/// Checked before any message is sent so a run never posts and then fails
/// to record what it posted.
///
/// # Arguments
///
/// * `file` - The history file path; only its parent directory is checked
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The probe file cannot be written (permission denied, read-only filesystem)
#[instrument(level = "info", skip_all, fields(path = %file.display()))]
pub async fn ensure_writable_parent(file: &Path) -> Result<(), Box<dyn Error>> {
    let dir = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).await?;

    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!(dir = %dir.display(), "History directory is writable");
    Ok(())
}
