//! Enumerate scannable top-level locations.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// One mount point or volume offered as a scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveInfo {
    /// Path to hand to a scan.
    pub path: PathBuf,
    /// Short human-readable label.
    pub label: CompactString,
}

/// List the locations a scan can reasonably start from.
///
/// Enumeration failures degrade to a shorter list rather than an
/// error; the primary filesystem root is always present.
pub fn list_drives() -> Vec<DriveInfo> {
    platform_drives()
}

#[cfg(target_os = "windows")]
fn platform_drives() -> Vec<DriveInfo> {
    let mut drives = Vec::new();
    for letter in 'A'..='Z' {
        let path = PathBuf::from(format!("{letter}:\\"));
        if path.exists() {
            drives.push(DriveInfo {
                path,
                label: CompactString::new(format!("{letter}:")),
            });
        }
    }
    drives
}

#[cfg(target_os = "macos")]
fn platform_drives() -> Vec<DriveInfo> {
    let mut drives = vec![DriveInfo {
        path: PathBuf::from("/"),
        label: CompactString::new("Macintosh HD"),
    }];
    if let Ok(entries) = std::fs::read_dir("/Volumes") {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                let label = CompactString::new(entry.file_name().to_string_lossy());
                drives.push(DriveInfo { path, label });
            }
        }
    }
    drives
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_drives() -> Vec<DriveInfo> {
    vec![DriveInfo {
        path: PathBuf::from("/"),
        label: CompactString::new("/"),
    }]
}
