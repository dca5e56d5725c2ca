//! Scan item types and the status taxonomy.

use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Kind of a scanned entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
}

impl ItemKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, ItemKind::Dir)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, ItemKind::File)
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Dir => write!(f, "dir"),
        }
    }
}

/// Outcome of scanning one item.
///
/// Every item starts `Pending` and moves to exactly one terminal status
/// during its scan. `Partial` is the terminal status of a directory whose
/// aggregation was interrupted by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Not yet processed.
    Pending,
    /// Fully scanned.
    Ok,
    /// Generic I/O failure.
    Error,
    /// Permission denied listing the directory.
    NoAccess,
    /// Path vanished between discovery and access.
    NotFound,
    /// Aggregation cut short by cancellation.
    Partial,
    /// Entry type the engine does not model (device, socket, FIFO).
    Unsupported,
}

impl ItemStatus {
    /// Classify an I/O failure into a status.
    ///
    /// Maps permission failures to `NoAccess` and missing paths to
    /// `NotFound`; any other failure is the generic `Error`.
    pub fn from_io_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::NoAccess,
            io::ErrorKind::NotFound => Self::NotFound,
            _ => Self::Error,
        }
    }

    /// Check whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Ok => write!(f, "ok"),
            Self::Error => write!(f, "error"),
            Self::NoAccess => write!(f, "no_access"),
            Self::NotFound => write!(f, "not_found"),
            Self::Partial => write!(f, "partial"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// One entry directly under a scanned root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Base name of the entry.
    pub name: CompactString,

    /// Absolute path; unique key within one scan.
    pub path: PathBuf,

    /// Entry kind.
    pub kind: ItemKind,

    /// Size in bytes; for a directory, the aggregate regular-file bytes
    /// of its subtree. `None` while pending or when unknown.
    pub size: Option<u64>,

    /// Immediate child count after symlink exclusion (directories only),
    /// `None` until the directory has been listed.
    pub child_count: Option<usize>,

    /// Last-modified date, files only.
    pub mtime: Option<NaiveDate>,

    /// Scan status.
    pub status: ItemStatus,
}

impl Item {
    /// Create a pending file item.
    pub fn pending_file(name: impl Into<CompactString>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: ItemKind::File,
            size: None,
            child_count: None,
            mtime: None,
            status: ItemStatus::Pending,
        }
    }

    /// Create a pending directory item.
    pub fn pending_dir(name: impl Into<CompactString>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: ItemKind::Dir,
            size: None,
            child_count: None,
            mtime: None,
            status: ItemStatus::Pending,
        }
    }

    /// Check if this item is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this item is a file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_file() {
        let item = Item::pending_file("a.txt", "/tmp/a.txt");
        assert!(item.is_file());
        assert!(!item.is_dir());
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.size, None);
        assert_eq!(item.mtime, None);
    }

    #[test]
    fn test_pending_dir() {
        let item = Item::pending_dir("src", "/tmp/src");
        assert!(item.is_dir());
        assert_eq!(item.child_count, None);
        assert_eq!(item.status, ItemStatus::Pending);
    }

    #[test]
    fn test_status_from_io_error() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(ItemStatus::from_io_error(&denied), ItemStatus::NoAccess);

        let missing = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(ItemStatus::from_io_error(&missing), ItemStatus::NotFound);

        let other = io::Error::other("disk on fire");
        assert_eq!(ItemStatus::from_io_error(&other), ItemStatus::Error);
    }

    #[test]
    fn test_status_terminality() {
        assert!(!ItemStatus::Pending.is_terminal());
        assert!(ItemStatus::Ok.is_terminal());
        assert!(ItemStatus::Partial.is_terminal());
        assert!(ItemStatus::NoAccess.is_terminal());
    }

    #[test]
    fn test_status_display_names() {
        assert_eq!(ItemStatus::NoAccess.to_string(), "no_access");
        assert_eq!(ItemStatus::NotFound.to_string(), "not_found");
        assert_eq!(ItemKind::Dir.to_string(), "dir");
    }
}
