//! Core types for heft.
//!
//! This crate provides the fundamental data structures shared across the
//! heft workspace: scan items and their status taxonomy, the terminal
//! scan result, and scan configuration.

mod config;
mod item;
mod result;

pub use config::{DEFAULT_PROGRESS_INTERVAL, ScanConfig, ScanConfigBuilder};
pub use item::{Item, ItemKind, ItemStatus};
pub use result::ScanResult;
