//! The persisted scan-cache slot.
//!
//! A single named slot holding the last-scanned item list. It is written
//! after a successful scan, read to restore state on startup, and removed
//! once a delete batch completes. There is deliberately no richer storage:
//! the slot is only ever overwritten or cleared, never merged.

use crate::config::AppConfig;
use crate::error::CacheError;
use crate::types::RepostItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the slot inside the data directory.
const SLOT_FILE: &str = "last_scan.json";

/// Snapshot stored in the slot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScanSnapshot {
    items: Vec<RepostItem>,
    scanned_at: DateTime<Utc>,
}

/// Handle to the persisted scan slot.
#[derive(Debug, Clone)]
pub struct ScanCache {
    path: PathBuf,
}

impl ScanCache {
    /// Create a cache handle backed by an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a cache handle at the default XDG location
    /// (`~/.local/share/unrepost/last_scan.json`).
    pub fn default_location() -> Result<Self, CacheError> {
        let dir = AppConfig::data_dir().map_err(|_| CacheError::NoDataDir)?;
        Ok(Self::new(dir.join(SLOT_FILE)))
    }

    /// Path of the backing slot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the slot with a freshly scanned item list.
    pub fn store(&self, items: &[RepostItem]) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let snapshot = ScanSnapshot {
            items: items.to_vec(),
            scanned_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&snapshot).map_err(CacheError::Serialize)?;
        fs::write(&self.path, contents)?;

        tracing::debug!(count = items.len(), path = %self.path.display(), "scan cache written");
        Ok(())
    }

    /// Load the cached item list, or `None` when the slot is empty.
    pub fn load(&self) -> Result<Option<Vec<RepostItem>>, CacheError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot: ScanSnapshot =
            serde_json::from_str(&contents).map_err(|source| CacheError::Malformed {
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(Some(snapshot.items))
    }

    /// Remove the slot. Clearing an already-empty slot is not an error.
    pub fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "scan cache cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemId;
    use tempfile::TempDir;

    fn sample_items() -> Vec<RepostItem> {
        vec![
            RepostItem {
                id: ItemId::new("111").expect("valid item ID"),
                author_handle: "@alice".to_string(),
                description: "first".to_string(),
                canonical_url: "https://www.tiktok.com/@alice/video/111".to_string(),
            },
            RepostItem {
                id: ItemId::new("222").expect("valid item ID"),
                author_handle: "@bob".to_string(),
                description: "second".to_string(),
                canonical_url: "https://www.tiktok.com/@bob/video/222".to_string(),
            },
        ]
    }

    #[test]
    fn test_store_load_round_trip() {
        let tmp = TempDir::new().expect("create temp dir");
        let cache = ScanCache::new(tmp.path().join("slot").join(SLOT_FILE));

        let items = sample_items();
        cache.store(&items).expect("store items");

        let loaded = cache.load().expect("load items");
        assert_eq!(loaded, Some(items));
    }

    #[test]
    fn test_load_empty_slot() {
        let tmp = TempDir::new().expect("create temp dir");
        let cache = ScanCache::new(tmp.path().join(SLOT_FILE));

        assert!(cache.load().expect("load empty slot").is_none());
    }

    #[test]
    fn test_store_overwrites() {
        let tmp = TempDir::new().expect("create temp dir");
        let cache = ScanCache::new(tmp.path().join(SLOT_FILE));

        cache.store(&sample_items()).expect("store items");
        cache.store(&[]).expect("overwrite with empty list");

        let loaded = cache.load().expect("load items");
        assert_eq!(loaded, Some(vec![]));
    }

    #[test]
    fn test_clear_removes_slot() {
        let tmp = TempDir::new().expect("create temp dir");
        let cache = ScanCache::new(tmp.path().join(SLOT_FILE));

        cache.store(&sample_items()).expect("store items");
        cache.clear().expect("clear slot");

        assert!(cache.load().expect("load cleared slot").is_none());
        // Clearing again is a no-op
        cache.clear().expect("clear empty slot");
    }

    #[test]
    fn test_malformed_slot() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join(SLOT_FILE);
        std::fs::write(&path, "not json").expect("write garbage");

        let cache = ScanCache::new(path);
        assert!(matches!(cache.load(), Err(CacheError::Malformed { .. })));
    }
}
