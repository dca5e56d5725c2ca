//! Root scan driver and subtree size accumulator.

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use compact_str::CompactString;
use indexmap::IndexMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use heft_core::{Item, ItemStatus, ScanConfig, ScanResult};

use crate::classify::{classify, EntryKind};
use crate::event::{ScanEvent, ScanStream};
use crate::progress::ScanProgress;
use crate::throttle::ProgressThrottle;
use crate::EVENT_CHANNEL_SIZE;

/// Start a scan and return its event stream.
///
/// The traversal runs on a spawned task. The stream yields one
/// `Initial`, interleaved `ItemUpdate`/`Progress` messages, and a final
/// `Done` carrying the [`ScanResult`]. Cancelling the token stops the
/// traversal at its next checkpoint; the `Done` event still arrives,
/// with `cancelled` set.
pub fn start_scan(config: ScanConfig, cancel: CancellationToken) -> ScanStream {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
    tokio::spawn(async move {
        let task = ScanTask::new(config, cancel, tx.clone());
        let result = task.run().await;
        let _ = tx.send(ScanEvent::Done(result)).await;
    });
    ScanStream::new(rx)
}

/// One directory entry after classification.
#[derive(Debug)]
struct ChildEntry {
    name: CompactString,
    path: PathBuf,
    kind: EntryKind,
}

/// Outcome of one subtree aggregation.
#[derive(Debug, PartialEq, Eq)]
struct SubtreeTotal {
    size: u64,
    cancelled_early: bool,
}

/// State for one traversal: the item table in listing order, the global
/// counters, the throttle, and the outbound event channel.
struct ScanTask {
    config: ScanConfig,
    cancel: CancellationToken,
    events: mpsc::Sender<ScanEvent>,
    throttle: ProgressThrottle,
    items: IndexMap<PathBuf, Item>,
    scanned_files: u64,
    scanned_bytes: u64,
    completed: usize,
    total: usize,
    started: Instant,
}

impl ScanTask {
    fn new(config: ScanConfig, cancel: CancellationToken, events: mpsc::Sender<ScanEvent>) -> Self {
        let throttle = ProgressThrottle::new(config.progress_interval);
        Self {
            config,
            cancel,
            events,
            throttle,
            items: IndexMap::new(),
            scanned_files: 0,
            scanned_bytes: 0,
            completed: 0,
            total: 0,
            started: Instant::now(),
        }
    }

    async fn run(mut self) -> ScanResult {
        let root = self.config.root.clone();

        let children = match read_children(&root).await {
            Ok(children) => children,
            Err(err) => {
                // A failed root listing is a normal terminal state, not a
                // fault: empty snapshot, zero progress, classified status.
                let status = ItemStatus::from_io_error(&err);
                warn!(root = %root.display(), %err, "root listing failed");
                let _ = self
                    .events
                    .send(ScanEvent::Initial {
                        root: root.clone(),
                        items: Vec::new(),
                    })
                    .await;
                self.report_progress(&root, true).await;
                return ScanResult::empty(root, status, self.started.elapsed());
            }
        };

        self.total = children.len();
        for child in &children {
            let item = match child.kind {
                EntryKind::Dir => Item::pending_dir(child.name.clone(), child.path.clone()),
                _ => Item::pending_file(child.name.clone(), child.path.clone()),
            };
            self.items.insert(child.path.clone(), item);
        }

        let snapshot: Vec<Item> = self.items.values().cloned().collect();
        let _ = self
            .events
            .send(ScanEvent::Initial {
                root: root.clone(),
                items: snapshot,
            })
            .await;
        self.report_progress(&root, true).await;

        for child in children {
            if self.cancel.is_cancelled() {
                break;
            }
            match child.kind {
                EntryKind::File => self.scan_root_file(child).await,
                EntryKind::Dir => {
                    if self.scan_root_dir(child).await {
                        break;
                    }
                }
                // Symlinks never survive read_children.
                EntryKind::Symlink => {}
                EntryKind::Other => self.mark_unsupported(child).await,
            }
        }

        self.report_progress(&root, true).await;

        ScanResult {
            root,
            items: self.items.into_values().collect(),
            scanned_files: self.scanned_files,
            scanned_bytes: self.scanned_bytes,
            cancelled: self.cancel.is_cancelled(),
            root_status: ItemStatus::Ok,
            duration: self.started.elapsed(),
        }
    }

    /// Stat one root-level file and settle its item.
    async fn scan_root_file(&mut self, child: ChildEntry) {
        match tokio::fs::metadata(&child.path).await {
            Ok(meta) => {
                let size = meta.len();
                self.scanned_files += 1;
                self.scanned_bytes += size;
                self.update_item(&child.path, |item| {
                    item.size = Some(size);
                    item.mtime = modified_date(&meta);
                    item.status = ItemStatus::Ok;
                })
                .await;
            }
            Err(err) => {
                debug!(path = %child.path.display(), %err, "stat failed");
                self.update_item(&child.path, |item| {
                    item.status = ItemStatus::Error;
                })
                .await;
            }
        }
        self.finish_root_entry(&child.path).await;
    }

    /// Process one root-level directory: list its children, aggregate
    /// the subtree, settle the item. Returns true when cancellation was
    /// observed and the scan must stop.
    async fn scan_root_dir(&mut self, child: ChildEntry) -> bool {
        let children = match read_children(&child.path).await {
            Ok(children) => children,
            Err(err) => {
                // The subtree is omitted from the aggregate; the scan
                // itself carries on with the next root entry.
                let status = ItemStatus::from_io_error(&err);
                debug!(path = %child.path.display(), %err, "listing failed");
                self.update_item(&child.path, |item| {
                    item.size = None;
                    item.child_count = Some(0);
                    item.status = status;
                })
                .await;
                self.finish_root_entry(&child.path).await;
                return false;
            }
        };

        let child_count = children.len();
        self.update_item(&child.path, |item| {
            item.child_count = Some(child_count);
        })
        .await;

        let total = self.accumulate_subtree(&child.path, children).await;
        if total.cancelled_early {
            self.update_item(&child.path, |item| {
                item.size = Some(total.size);
                item.status = ItemStatus::Partial;
            })
            .await;
            return true;
        }

        self.update_item(&child.path, |item| {
            item.size = Some(total.size);
            item.status = ItemStatus::Ok;
        })
        .await;
        self.finish_root_entry(&child.path).await;
        false
    }

    /// Settle a root entry the engine does not model.
    async fn mark_unsupported(&mut self, child: ChildEntry) {
        self.update_item(&child.path, |item| {
            item.status = ItemStatus::Unsupported;
        })
        .await;
        self.finish_root_entry(&child.path).await;
    }

    /// Sum regular-file bytes under `dir`, expanding directories from an
    /// explicit work list instead of recursing, so deep trees cannot
    /// exhaust the call stack.
    ///
    /// The work list is seeded with the already-listed children to avoid
    /// listing `dir` twice. A listing failure skips that whole subtree;
    /// a stat failure skips that file; neither disturbs the rest of the
    /// aggregate.
    async fn accumulate_subtree(&mut self, dir: &Path, children: Vec<ChildEntry>) -> SubtreeTotal {
        let mut size = 0u64;
        let mut pending_dirs: Vec<PathBuf> = Vec::new();

        for child in children {
            if self.cancel.is_cancelled() {
                return SubtreeTotal {
                    size,
                    cancelled_early: true,
                };
            }
            match child.kind {
                EntryKind::Dir => pending_dirs.push(child.path),
                EntryKind::File => size += self.stat_descendant(&child.path).await,
                EntryKind::Symlink | EntryKind::Other => {}
            }
            self.report_progress(dir, false).await;
        }

        while let Some(current) = pending_dirs.pop() {
            if self.cancel.is_cancelled() {
                return SubtreeTotal {
                    size,
                    cancelled_early: true,
                };
            }
            let children = match read_children(&current).await {
                Ok(children) => children,
                Err(err) => {
                    debug!(path = %current.display(), %err, "skipping unreadable subtree");
                    continue;
                }
            };
            for child in children {
                if self.cancel.is_cancelled() {
                    return SubtreeTotal {
                        size,
                        cancelled_early: true,
                    };
                }
                match child.kind {
                    EntryKind::Dir => pending_dirs.push(child.path),
                    EntryKind::File => size += self.stat_descendant(&child.path).await,
                    EntryKind::Symlink | EntryKind::Other => {}
                }
                self.report_progress(&current, false).await;
            }
        }

        SubtreeTotal {
            size,
            cancelled_early: false,
        }
    }

    /// Stat one descendant file, feeding the global counters. Returns
    /// the bytes to add to the local aggregate, zero when the stat
    /// failed.
    async fn stat_descendant(&mut self, path: &Path) -> u64 {
        match tokio::fs::metadata(path).await {
            Ok(meta) => {
                let size = meta.len();
                self.scanned_files += 1;
                self.scanned_bytes += size;
                size
            }
            Err(err) => {
                debug!(path = %path.display(), %err, "stat failed");
                0
            }
        }
    }

    /// Apply a mutation to one item and emit the updated snapshot.
    async fn update_item<F>(&mut self, path: &Path, apply: F)
    where
        F: FnOnce(&mut Item),
    {
        let Some(item) = self.items.get_mut(path) else {
            return;
        };
        apply(item);
        let snapshot = item.clone();
        let _ = self.events.send(ScanEvent::ItemUpdate(snapshot)).await;
    }

    /// Count a root entry as processed and emit boundary progress.
    async fn finish_root_entry(&mut self, path: &Path) {
        self.completed += 1;
        self.report_progress(path, self.config.boundary_progress)
            .await;
    }

    /// Emit a progress snapshot when forced or the throttle interval has
    /// elapsed.
    async fn report_progress(&mut self, current: &Path, force: bool) {
        if !self.throttle.should_emit(force) {
            return;
        }
        let progress = ScanProgress {
            completed: self.completed,
            total: self.total,
            scanned_files: self.scanned_files,
            scanned_bytes: self.scanned_bytes,
            current_path: current.to_path_buf(),
        };
        let _ = self.events.send(ScanEvent::Progress(progress)).await;
    }
}

/// List a directory's entries with their classification, excluding
/// symlinks. An entry whose file type cannot be read is kept as `Other`.
async fn read_children(dir: &Path) -> io::Result<Vec<ChildEntry>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut children = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let kind = match entry.file_type().await {
            Ok(file_type) => classify(file_type),
            Err(_) => EntryKind::Other,
        };
        if kind == EntryKind::Symlink {
            continue;
        }
        let name = CompactString::new(entry.file_name().to_string_lossy());
        children.push(ChildEntry {
            name,
            path: entry.path(),
            kind,
        });
    }
    Ok(children)
}

/// Modification time of a stat result as a UTC calendar date.
fn modified_date(meta: &Metadata) -> Option<NaiveDate> {
    meta.modified()
        .ok()
        .map(|modified| DateTime::<Utc>::from(modified).date_naive())
}
