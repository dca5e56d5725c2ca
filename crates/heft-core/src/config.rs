//! Scan configuration types.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default minimum wall-clock spacing between throttled progress emissions.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// Configuration for one scan invocation.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path whose immediate children become the scanned items.
    pub root: PathBuf,

    /// Minimum spacing between throttled progress emissions.
    #[builder(default = "DEFAULT_PROGRESS_INTERVAL")]
    #[serde(default = "default_progress_interval")]
    pub progress_interval: Duration,

    /// Force an unthrottled progress emission each time a root entry
    /// completes. The initial and final emissions are always forced.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub boundary_progress: bool,
}

fn default_progress_interval() -> Duration {
    DEFAULT_PROGRESS_INTERVAL
}

fn default_true() -> bool {
    true
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Scan root cannot be empty".to_string());
            }
        } else {
            return Err("Scan root is required".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a config with the default throttle policy.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            boundary_progress: true,
        }
    }
}
