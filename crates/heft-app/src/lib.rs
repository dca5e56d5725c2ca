//! Application services for heft.
//!
//! This crate sits between the scan engine and a front end: it keys
//! scans by generation so late events from superseded scans can be
//! dropped, replays cached results, and carries the small platform
//! helpers (drive listing, file-manager reveal).

mod cache;
mod drives;
mod reveal;
mod session;

pub use cache::ScanCache;
pub use drives::{list_drives, DriveInfo};
pub use reveal::{reveal, RevealError};
pub use session::{ScanGeneration, ScanHandle, ScanService, SessionEvent};

// Re-export engine types for convenience
pub use heft_scan::{ScanConfig, ScanEvent, ScanProgress, ScanResult};

/// Default channel buffer size for session event streams.
pub const SESSION_CHANNEL_SIZE: usize = 100;
