//! Typed event stream delivered to scan consumers.

use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::Stream;

use heft_core::{Item, ScanResult};

use crate::progress::ScanProgress;

/// One message from an in-flight scan.
///
/// A scan emits exactly one `Initial`, any number of interleaved
/// `ItemUpdate` and `Progress` messages, and exactly one terminal
/// `Done`; nothing follows `Done`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// The pending item snapshot, sent before any per-item work.
    Initial {
        /// Root path being scanned.
        root: PathBuf,
        /// All root items in listing order, each still pending.
        items: Vec<Item>,
    },
    /// A single item changed. Carries the full updated item; consumers
    /// merge it into their view by path.
    ItemUpdate(Item),
    /// Throttled progress snapshot.
    Progress(ScanProgress),
    /// Terminal result of the traversal.
    Done(ScanResult),
}

/// Receiving half of a scan's event channel.
///
/// Consume it with [`recv`](Self::recv) or as a [`Stream`].
#[derive(Debug)]
pub struct ScanStream {
    rx: mpsc::Receiver<ScanEvent>,
}

impl ScanStream {
    pub(crate) fn new(rx: mpsc::Receiver<ScanEvent>) -> Self {
        Self { rx }
    }

    /// Receive the next event, or `None` once the scan has finished and
    /// the final `Done` has been taken.
    pub async fn recv(&mut self) -> Option<ScanEvent> {
        self.rx.recv().await
    }
}

impl Stream for ScanStream {
    type Item = ScanEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<ScanEvent>> {
        self.rx.poll_recv(cx)
    }
}
