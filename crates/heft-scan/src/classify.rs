//! Directory entry classification.

use std::fs::FileType;

/// What one directory entry is, as far as the engine cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Symbolic link; excluded at every level of the traversal.
    Symlink,
    /// Anything else (device, socket, FIFO).
    Other,
}

impl EntryKind {
    /// Check if entries of this kind are traversed into.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Dir)
    }

    /// Check if entries of this kind contribute bytes.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }
}

/// Classify a directory entry's file type.
///
/// The symlink check comes first so links are excluded even when they
/// point at regular files or directories.
pub fn classify(file_type: FileType) -> EntryKind {
    if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Dir
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}
