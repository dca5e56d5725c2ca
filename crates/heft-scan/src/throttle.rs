//! Wall-clock throttling of progress emissions.

use std::time::{Duration, Instant};

/// Minimum-interval gate over progress emissions.
///
/// Every granted emission, forced or not, resets the clock, so two
/// throttled emissions are never closer together than the interval.
#[derive(Debug)]
pub(crate) struct ProgressThrottle {
    interval: Duration,
    last_emit: Option<Instant>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
        }
    }

    /// Check whether an emission is due, recording it if so.
    pub fn should_emit(&mut self, force: bool) -> bool {
        if !force
            && self
                .last_emit
                .is_some_and(|last| last.elapsed() < self.interval)
        {
            return false;
        }
        self.last_emit = Some(Instant::now());
        true
    }
}
