//! Persisted record of what has already been posted.
//!
//! The store is a single JSON file holding an array of
//! `[title, link, epoch_seconds]` triples. It is read once at the start of a
//! run and rewritten once at the end, with anything older than the retention
//! window dropped.
//!
//! A missing file is a first run and loads as empty. A malformed file is an
//! error: silently starting over would repost a week of articles.

use chrono::{DateTime, Utc};
use std::error::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::HistoryEntry;
use crate::utils::epoch_seconds;

/// Default retention window: seven days.
pub const RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    retention: Duration,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, retention: Duration) -> Self {
        Self {
            path: path.into(),
            retention,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted history. A missing file yields an empty history.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Vec<HistoryEntry>, Box<dyn Error>> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No history file yet; starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let entries: Vec<HistoryEntry> = serde_json::from_str(&text)
            .map_err(|e| format!("corrupt history file {}: {e}", self.path.display()))?;
        info!(entries = entries.len(), "Loaded history");
        Ok(entries)
    }

    /// Prune entries older than the retention window and overwrite the file.
    ///
    /// Returns the number of entries written.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn save(
        &self,
        entries: Vec<HistoryEntry>,
        now: DateTime<Utc>,
    ) -> Result<usize, Box<dyn Error>> {
        let before = entries.len();
        let kept = prune(entries, now, self.retention);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string(&kept)?;
        fs::write(&self.path, json).await?;

        info!(kept = kept.len(), pruned = before - kept.len(), "Saved history");
        Ok(kept.len())
    }
}

/// Drop entries posted before `now - retention`; keep everything else in
/// its original order.
///
/// # Arguments
///
/// * `entries` - Posted history, oldest first
/// * `now` - The run's reference time
/// * `retention` - How far back entries are kept
///
/// # Returns
///
/// The entries with `posted_at >= now - retention`. An entry exactly at the
/// cutoff is kept.
pub fn prune(
    entries: Vec<HistoryEntry>,
    now: DateTime<Utc>,
    retention: Duration,
) -> Vec<HistoryEntry> {
    let cutoff = epoch_seconds(now) - retention.as_secs_f64();
    entries
        .into_iter()
        .filter(|entry| entry.posted_at >= cutoff)
        .collect()
}
