//! Directory scanning engine for heft.
//!
//! This crate walks one level of a root directory, aggregates the size
//! of every subtree behind it, and streams the results as typed events.
//!
//! # Overview
//!
//! `heft-scan` is responsible for the traversal itself. Key features:
//!
//! - **Streaming updates** over a bounded channel, one event per settled item
//! - **Iterative traversal** with an explicit work list, safe on deep trees
//! - **Cooperative cancellation** via `CancellationToken`
//! - **Throttled progress** so consumers are never flooded
//!
//! # Example
//!
//! ```rust,no_run
//! use heft_scan::{start_scan, ScanConfig, ScanEvent};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() {
//! let config = ScanConfig::new("/var/log");
//! let mut stream = start_scan(config, CancellationToken::new());
//!
//! while let Some(event) = stream.recv().await {
//!     if let ScanEvent::Done(result) = event {
//!         println!("{} files, {} bytes", result.scanned_files, result.scanned_bytes);
//!     }
//! }
//! # }
//! ```
//!
//! # Cancellation
//!
//! Keep a clone of the token to stop the traversal from anywhere. The
//! stream still ends with a `Done` event so no consumer is left hanging:
//!
//! ```rust,no_run
//! use heft_scan::{start_scan, ScanConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let stream = start_scan(ScanConfig::new("/var/log"), cancel.clone());
//!
//! cancel.cancel();
//! ```

mod classify;
mod event;
mod progress;
mod scanner;
mod throttle;

pub use classify::{classify, EntryKind};
pub use event::{ScanEvent, ScanStream};
pub use progress::ScanProgress;
pub use scanner::start_scan;

// Re-export core types for convenience
pub use heft_core::{
    Item, ItemKind, ItemStatus, ScanConfig, ScanConfigBuilder, ScanResult,
    DEFAULT_PROGRESS_INTERVAL,
};

/// Default channel buffer size for scan event streams.
pub const EVENT_CHANNEL_SIZE: usize = 100;
