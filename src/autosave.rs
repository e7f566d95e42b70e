use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::models::{DraftRow, FileMeta};

const DEBOUNCE: Duration = Duration::from_millis(300);
const EXPIRY_MS: i64 = 24 * 60 * 60 * 1000;

/// What gets persisted between runs: the draft rows, metadata of the file
/// they came from, and a write timestamp for expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub rows: Vec<DraftRow>,
    pub file_meta: Option<FileMeta>,
    pub timestamp: i64,
}

/// Crash-recovery cache for in-progress drafts. Writes are debounced and
/// best-effort: a failed save is logged and never surfaces to the user,
/// since losing an autosave must not interrupt a review.
pub struct AutosaveCache {
    path: PathBuf,
    last_write: Option<Instant>,
}

impl AutosaveCache {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_write: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Debounced save: skipped when the last write was under 300ms ago, so
    /// rapid successive edits coalesce. Call `flush` before exiting.
    pub fn save(&mut self, rows: &[DraftRow], file_meta: Option<&FileMeta>) {
        if let Some(last) = self.last_write {
            if last.elapsed() < DEBOUNCE {
                return;
            }
        }
        self.flush(rows, file_meta);
    }

    /// Unconditional save. An empty draft clears the cache file instead,
    /// so stale snapshots never outlive the draft they captured.
    pub fn flush(&mut self, rows: &[DraftRow], file_meta: Option<&FileMeta>) {
        self.last_write = Some(Instant::now());
        if rows.is_empty() {
            self.clear();
            return;
        }
        let snapshot = DraftSnapshot {
            rows: rows.to_vec(),
            file_meta: file_meta.cloned(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        let result = serde_json::to_string(&snapshot)
            .map_err(std::io::Error::other)
            .and_then(|json| std::fs::write(&self.path, json));
        if let Err(e) = result {
            log::warn!("autosave write failed ({}): {e}", self.path.display());
        }
    }

    /// Load a previous snapshot if one exists and is under 24 hours old.
    /// Expired or unreadable snapshots are discarded silently.
    pub fn load(&self) -> Option<DraftSnapshot> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("autosave read failed ({}): {e}", self.path.display());
                }
                return None;
            }
        };
        let snapshot: DraftSnapshot = match serde_json::from_str(&json) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("autosave parse failed ({}): {e}", self.path.display());
                self.remove_file();
                return None;
            }
        };
        let age = chrono::Utc::now().timestamp_millis() - snapshot.timestamp;
        if age > EXPIRY_MS {
            self.remove_file();
            return None;
        }
        Some(snapshot)
    }

    pub fn clear(&self) {
        self.remove_file();
    }

    fn remove_file(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("autosave remove failed ({}): {e}", self.path.display());
            }
        }
    }
}
