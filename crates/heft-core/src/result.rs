//! Terminal scan output.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::item::{Item, ItemStatus};

/// Outcome of one complete traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// The scanned root path.
    pub root: PathBuf,

    /// Items in root listing order. Sorting is a presentation concern.
    pub items: Vec<Item>,

    /// Count of every regular file successfully stat'd anywhere in the
    /// traversal, root files and nested descendants alike.
    pub scanned_files: u64,

    /// Total bytes of those files.
    pub scanned_bytes: u64,

    /// Whether cancellation was observed before the traversal finished.
    pub cancelled: bool,

    /// Outcome of listing the root itself: `Ok` normally, or the
    /// classified failure when the listing failed and `items` is empty.
    pub root_status: ItemStatus,

    /// Wall-clock time the traversal took.
    pub duration: Duration,
}

impl ScanResult {
    /// Create the empty result returned when listing the root fails.
    pub fn empty(root: impl Into<PathBuf>, root_status: ItemStatus, duration: Duration) -> Self {
        Self {
            root: root.into(),
            items: Vec::new(),
            scanned_files: 0,
            scanned_bytes: 0,
            cancelled: false,
            root_status,
            duration,
        }
    }

    /// Number of items discovered under the root.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
