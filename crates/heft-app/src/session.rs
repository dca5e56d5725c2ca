//! Scan session orchestration.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use heft_scan::{start_scan, ScanConfig, ScanEvent, ScanProgress, ScanResult, ScanStream};

use crate::cache::ScanCache;
use crate::SESSION_CHANNEL_SIZE;

/// Identifier of one scan session, unique within a [`ScanService`].
///
/// Generations increase monotonically, so a consumer holding the latest
/// one can discard events from any scan it has superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanGeneration(pub u64);

impl fmt::Display for ScanGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One scan event tagged with the generation that produced it.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub generation: ScanGeneration,
    pub event: ScanEvent,
}

/// Handle to one started scan session.
#[derive(Debug)]
pub struct ScanHandle {
    /// Generation backing this session.
    pub generation: ScanGeneration,
    /// Generation-tagged event feed, ending with `Done`.
    pub events: mpsc::Receiver<SessionEvent>,
}

#[derive(Debug)]
struct ActiveScan {
    generation: ScanGeneration,
    cancel: CancellationToken,
}

/// Serializes scans against a shared result cache.
///
/// At most one scan is in flight per service: starting a new one
/// cancels the previous one first. Finished, uncancelled results are
/// cached and can be replayed without touching the disk again.
#[derive(Debug, Default)]
pub struct ScanService {
    generations: AtomicU64,
    current: Arc<Mutex<Option<ActiveScan>>>,
    cache: Arc<ScanCache>,
}

impl ScanService {
    /// Create a service whose cache never expires.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service around an existing cache.
    pub fn with_cache(cache: ScanCache) -> Self {
        Self {
            cache: Arc::new(cache),
            ..Default::default()
        }
    }

    /// The result cache backing this service.
    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    /// Start scanning, cancelling any scan already in flight.
    ///
    /// A fresh cached result for the same root is replayed as a
    /// synthetic event sequence instead of re-reading the disk, unless
    /// `force` demands a live rescan. Either way the handle's feed
    /// yields the full `Initial`/`Progress`/`Done` shape, every event
    /// tagged with the new generation.
    pub fn start(&self, config: ScanConfig, force: bool) -> ScanHandle {
        let generation = self.next_generation();
        self.cancel_current();

        if !force {
            if let Some(result) = self.cache.get_fresh(&config.root) {
                debug!(root = %config.root.display(), %generation, "replaying cached scan");
                return ScanHandle {
                    generation,
                    events: replay_cached(generation, result),
                };
            }
        }

        info!(root = %config.root.display(), %generation, "starting scan");
        let cancel = CancellationToken::new();
        *self.current_slot() = Some(ActiveScan {
            generation,
            cancel: cancel.clone(),
        });

        let stream = start_scan(config, cancel.clone());
        ScanHandle {
            generation,
            events: self.forward_tagged(generation, cancel, stream),
        }
    }

    /// Cancel the scan in flight, if any. Returns whether one was
    /// running.
    pub fn cancel_current(&self) -> bool {
        let slot = self.current_slot();
        if let Some(active) = slot.as_ref() {
            info!(generation = %active.generation, "cancelling scan");
            active.cancel.cancel();
            true
        } else {
            false
        }
    }

    /// Generation of the scan currently in flight, if any.
    pub fn current_generation(&self) -> Option<ScanGeneration> {
        self.current_slot().as_ref().map(|active| active.generation)
    }

    fn next_generation(&self) -> ScanGeneration {
        ScanGeneration(self.generations.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn current_slot(&self) -> MutexGuard<'_, Option<ActiveScan>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Tag engine events with the generation and forward them. The task
    /// also caches the terminal result and frees the in-flight slot.
    fn forward_tagged(
        &self,
        generation: ScanGeneration,
        cancel: CancellationToken,
        mut stream: ScanStream,
    ) -> mpsc::Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel(SESSION_CHANNEL_SIZE);
        let current = Arc::clone(&self.current);
        let cache = Arc::clone(&self.cache);

        tokio::spawn(async move {
            while let Some(event) = stream.recv().await {
                if let ScanEvent::Done(result) = &event {
                    if !result.cancelled {
                        cache.insert(result.clone());
                    }
                    release_slot(&current, generation);
                }
                if tx.send(SessionEvent { generation, event }).await.is_err() {
                    // The consumer went away; stop the traversal too.
                    cancel.cancel();
                    release_slot(&current, generation);
                    break;
                }
            }
        });

        rx
    }
}

/// Clear the in-flight slot when it still belongs to `generation`.
fn release_slot(current: &Mutex<Option<ActiveScan>>, generation: ScanGeneration) {
    let mut slot = current
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if slot
        .as_ref()
        .is_some_and(|active| active.generation == generation)
    {
        *slot = None;
    }
}

/// Re-emit a finished result as the event sequence a live scan would
/// produce, so consumers never special-case cache hits.
fn replay_cached(
    generation: ScanGeneration,
    result: ScanResult,
) -> mpsc::Receiver<SessionEvent> {
    let (tx, rx) = mpsc::channel(SESSION_CHANNEL_SIZE);

    tokio::spawn(async move {
        let total = result.items.len();
        let initial = ScanEvent::Initial {
            root: result.root.clone(),
            items: result.items.clone(),
        };
        let progress = ScanEvent::Progress(ScanProgress {
            completed: total,
            total,
            scanned_files: result.scanned_files,
            scanned_bytes: result.scanned_bytes,
            current_path: result.root.clone(),
        });

        for event in [initial, progress, ScanEvent::Done(result)] {
            if tx.send(SessionEvent { generation, event }).await.is_err() {
                break;
            }
        }
    });

    rx
}
