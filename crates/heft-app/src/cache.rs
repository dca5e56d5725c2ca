//! Completed-scan cache keyed by root path.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use heft_core::ScanResult;

/// Caches finished scan results so revisiting a root can skip the disk.
///
/// Entries are keyed by the exact root path. An optional maximum age
/// turns stale entries into misses; without one, entries live until
/// they are invalidated.
#[derive(Debug, Default)]
pub struct ScanCache {
    entries: DashMap<PathBuf, CachedScan>,
    max_age: Option<Duration>,
}

#[derive(Debug)]
struct CachedScan {
    result: ScanResult,
    cached_at: Instant,
}

impl ScanCache {
    /// Create a cache whose entries never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache whose entries expire after `max_age`.
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_age: Some(max_age),
        }
    }

    /// Look up a fresh result for `root`. A stale entry is removed and
    /// reported as a miss.
    pub fn get_fresh(&self, root: &Path) -> Option<ScanResult> {
        let entry = self.entries.get(root)?;
        if let Some(max_age) = self.max_age {
            if entry.cached_at.elapsed() > max_age {
                drop(entry);
                self.entries.remove(root);
                return None;
            }
        }
        Some(entry.result.clone())
    }

    /// Store a finished result, replacing any previous entry for the
    /// same root.
    pub fn insert(&self, result: ScanResult) {
        let root = result.root.clone();
        self.entries.insert(
            root,
            CachedScan {
                result,
                cached_at: Instant::now(),
            },
        );
    }

    /// Drop the entry for `root`. Returns `true` if one existed.
    pub fn invalidate(&self, root: &Path) -> bool {
        self.entries.remove(root).is_some()
    }

    /// Number of cached roots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
