//! Scan progress reporting.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Progress snapshot during a scan.
///
/// `completed` and `total` count root-level entries only; subtree work
/// never advances them. `current_path` is a best-effort hint of what is
/// being processed and may be a nested path or slightly stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Root entries fully processed.
    pub completed: usize,
    /// Total root entries in this scan.
    pub total: usize,
    /// Files successfully stat'd so far, at any depth.
    pub scanned_files: u64,
    /// Total bytes of those files.
    pub scanned_bytes: u64,
    /// Path most recently being processed.
    pub current_path: PathBuf,
}

impl ScanProgress {
    /// Fraction of root entries processed, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Whether every root entry has been processed.
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}
