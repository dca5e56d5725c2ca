use std::fs;
use std::time::Duration;

use heft_scan::{
    start_scan, Item, ItemStatus, ScanConfig, ScanEvent, ScanResult, ScanStream,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_scan_aggregates_sizes_and_counters() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("a.txt"), vec![0u8; 100]).unwrap();
    fs::create_dir(root.join("c")).unwrap();
    fs::write(root.join("c/d.txt"), vec![0u8; 50]).unwrap();
    fs::create_dir(root.join("c/sub")).unwrap();
    fs::write(root.join("c/sub/e.txt"), vec![0u8; 25]).unwrap();

    let stream = start_scan(ScanConfig::new(root), CancellationToken::new());
    let events = collect_events(stream).await;
    let result = final_result(&events);

    assert_eq!(result.items.len(), 2);
    assert!(!result.cancelled);
    assert_eq!(result.root_status, ItemStatus::Ok);

    let a = item_named(result, "a.txt");
    assert_eq!(a.size, Some(100));
    assert_eq!(a.status, ItemStatus::Ok);
    assert!(a.mtime.is_some());

    // The directory's size covers the whole subtree, its child count
    // only the immediate level.
    let c = item_named(result, "c");
    assert_eq!(c.size, Some(75));
    assert_eq!(c.child_count, Some(2));
    assert_eq!(c.status, ItemStatus::Ok);

    assert_eq!(result.scanned_files, 3);
    assert_eq!(result.scanned_bytes, 175);
    assert!(result.items.iter().all(|item| item.status.is_terminal()));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinks_never_listed_counted_or_sized() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("a.txt"), vec![0u8; 100]).unwrap();
    std::os::unix::fs::symlink(root.join("a.txt"), root.join("link")).unwrap();
    fs::create_dir(root.join("c")).unwrap();
    fs::write(root.join("c/d.txt"), vec![0u8; 50]).unwrap();
    std::os::unix::fs::symlink(root.join("c/d.txt"), root.join("c/link2")).unwrap();

    let stream = start_scan(ScanConfig::new(root), CancellationToken::new());
    let events = collect_events(stream).await;
    let result = final_result(&events);

    // Links appear nowhere: not as items, not in c's child count, not
    // in any byte total.
    assert_eq!(result.items.len(), 2);
    assert!(result.items.iter().all(|item| item.name != "link"));

    let c = item_named(result, "c");
    assert_eq!(c.size, Some(50));
    assert_eq!(c.child_count, Some(1));

    assert_eq!(result.scanned_files, 2);
    assert_eq!(result.scanned_bytes, 150);
}

#[tokio::test]
async fn test_missing_root_yields_empty_classified_result() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("no-such-dir");

    let stream = start_scan(ScanConfig::new(&root), CancellationToken::new());
    let events = collect_events(stream).await;

    let Some(ScanEvent::Initial { items, .. }) = events.first() else {
        panic!("expected Initial as the first event");
    };
    assert!(items.is_empty());

    let result = final_result(&events);
    assert_eq!(result.root_status, ItemStatus::NotFound);
    assert!(result.items.is_empty());
    assert_eq!(result.scanned_files, 0);
    assert_eq!(result.scanned_bytes, 0);
    assert!(!result.cancelled);
}

#[tokio::test]
async fn test_empty_root_completes_clean() {
    let temp = TempDir::new().unwrap();

    let stream = start_scan(ScanConfig::new(temp.path()), CancellationToken::new());
    let events = collect_events(stream).await;
    let result = final_result(&events);

    assert_eq!(result.root_status, ItemStatus::Ok);
    assert!(result.items.is_empty());
    assert_eq!(result.scanned_files, 0);
    assert_eq!(result.scanned_bytes, 0);
}

#[tokio::test]
async fn test_event_stream_shape_and_item_order() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    for name in ["zeta.txt", "alpha.txt", "mid.txt"] {
        fs::write(root.join(name), b"data").unwrap();
    }
    fs::create_dir(root.join("nested")).unwrap();
    fs::write(root.join("nested/inner.txt"), b"data").unwrap();

    let stream = start_scan(ScanConfig::new(root), CancellationToken::new());
    let events = collect_events(stream).await;

    assert!(matches!(events.first(), Some(ScanEvent::Initial { .. })));
    assert!(matches!(events.last(), Some(ScanEvent::Done(_))));
    let initials = events
        .iter()
        .filter(|event| matches!(event, ScanEvent::Initial { .. }))
        .count();
    let dones = events
        .iter()
        .filter(|event| matches!(event, ScanEvent::Done(_)))
        .count();
    assert_eq!(initials, 1);
    assert_eq!(dones, 1);

    // Every listed item starts pending and keeps its listing position
    // through to the final result.
    let Some(ScanEvent::Initial { items: listed, .. }) = events.first() else {
        unreachable!();
    };
    assert!(listed.iter().all(|item| item.status == ItemStatus::Pending));

    let result = final_result(&events);
    let listed_paths: Vec<_> = listed.iter().map(|item| item.path.clone()).collect();
    let final_paths: Vec<_> = result.items.iter().map(|item| item.path.clone()).collect();
    assert_eq!(listed_paths, final_paths);
}

#[tokio::test]
async fn test_progress_counters_are_monotonic() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir(root.join("d")).unwrap();
    for i in 0..20 {
        fs::write(root.join(format!("d/f{i}.bin")), vec![0u8; 10]).unwrap();
    }
    fs::write(root.join("top.bin"), vec![0u8; 5]).unwrap();

    let config = ScanConfig::builder()
        .root(root)
        .progress_interval(Duration::ZERO)
        .build()
        .unwrap();
    let stream = start_scan(config, CancellationToken::new());
    let events = collect_events(stream).await;

    let mut seen = 0usize;
    let mut last = (0usize, 0u64, 0u64);
    for event in &events {
        if let ScanEvent::Progress(progress) = event {
            seen += 1;
            assert!(progress.completed >= last.0);
            assert!(progress.scanned_files >= last.1);
            assert!(progress.scanned_bytes >= last.2);
            last = (progress.completed, progress.scanned_files, progress.scanned_bytes);
        }
    }
    // Zero interval disables throttling, so at least one update per file.
    assert!(seen >= 20, "expected frequent progress, got {seen}");

    let result = final_result(&events);
    let final_progress = events
        .iter()
        .rev()
        .find_map(|event| match event {
            ScanEvent::Progress(progress) => Some(progress),
            _ => None,
        })
        .unwrap();
    assert!(final_progress.is_complete());
    assert_eq!(final_progress.scanned_files, result.scanned_files);
    assert_eq!(final_progress.scanned_bytes, result.scanned_bytes);
}

#[tokio::test]
async fn test_pre_cancelled_scan_settles_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("a.txt"), vec![0u8; 100]).unwrap();
    fs::create_dir(root.join("c")).unwrap();
    fs::write(root.join("c/d.txt"), vec![0u8; 50]).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let stream = start_scan(ScanConfig::new(root), cancel);
    let events = collect_events(stream).await;
    let result = final_result(&events);

    assert!(result.cancelled);
    assert_eq!(result.scanned_files, 0);
    assert_eq!(result.scanned_bytes, 0);
    assert!(result
        .items
        .iter()
        .all(|item| item.status == ItemStatus::Pending));
}

#[tokio::test]
async fn test_cancel_mid_scan_reports_cancelled() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    // Enough root entries that the bounded event channel fills and the
    // scanner parks long before finishing.
    for i in 0..300 {
        fs::write(root.join(format!("f{i:04}.bin")), b"x").unwrap();
    }

    let cancel = CancellationToken::new();
    let mut stream = start_scan(ScanConfig::new(root), cancel.clone());

    let first = stream.recv().await.unwrap();
    assert!(matches!(first, ScanEvent::Initial { .. }));
    cancel.cancel();

    let mut done: Option<ScanResult> = None;
    while let Some(event) = stream.recv().await {
        if let ScanEvent::Done(result) = event {
            done = Some(result);
        }
    }
    let result = done.expect("scan must end with Done even when cancelled");
    assert!(result.cancelled);
    assert!(
        result
            .items
            .iter()
            .any(|item| item.status == ItemStatus::Pending),
        "cancellation should leave later entries unsettled"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_socket_entries_are_unsupported() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("plain.txt"), b"data").unwrap();
    let _listener = std::os::unix::net::UnixListener::bind(root.join("ipc.sock")).unwrap();

    let stream = start_scan(ScanConfig::new(root), CancellationToken::new());
    let events = collect_events(stream).await;
    let result = final_result(&events);

    let sock = item_named(result, "ipc.sock");
    assert_eq!(sock.status, ItemStatus::Unsupported);
    assert_eq!(sock.size, None);

    let plain = item_named(result, "plain.txt");
    assert_eq!(plain.status, ItemStatus::Ok);
    assert_eq!(result.scanned_files, 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_directory_is_no_access() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("ok.txt"), vec![0u8; 10]).unwrap();
    let locked = root.join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("hidden.bin"), vec![0u8; 99]).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root bypasses permission bits entirely; nothing to observe then.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let stream = start_scan(ScanConfig::new(root), CancellationToken::new());
    let events = collect_events(stream).await;
    let result = final_result(&events);

    let item = item_named(result, "locked");
    assert_eq!(item.status, ItemStatus::NoAccess);
    assert_eq!(item.size, None);
    assert_eq!(item.child_count, Some(0));

    // The failure stays contained; the sibling file still scans.
    assert_eq!(item_named(result, "ok.txt").status, ItemStatus::Ok);
    assert_eq!(result.scanned_files, 1);
    assert_eq!(result.scanned_bytes, 10);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn test_unstattable_file_is_error() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let parent = temp.path().join("listable");
    fs::create_dir(&parent).unwrap();
    fs::write(parent.join("b.txt"), vec![0u8; 40]).unwrap();

    // Read without execute: the listing succeeds, statting entries does not.
    fs::set_permissions(&parent, fs::Permissions::from_mode(0o444)).unwrap();
    if fs::metadata(parent.join("b.txt")).is_ok() {
        fs::set_permissions(&parent, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let stream = start_scan(ScanConfig::new(&parent), CancellationToken::new());
    let events = collect_events(stream).await;
    let result = final_result(&events);

    let b = item_named(result, "b.txt");
    assert_eq!(b.status, ItemStatus::Error);
    assert_eq!(b.size, None);
    assert_eq!(result.scanned_files, 0);
    assert_eq!(result.scanned_bytes, 0);

    fs::set_permissions(&parent, fs::Permissions::from_mode(0o755)).unwrap();
}

async fn collect_events(mut stream: ScanStream) -> Vec<ScanEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.recv().await {
        events.push(event);
    }
    events
}

fn final_result(events: &[ScanEvent]) -> &ScanResult {
    match events.last() {
        Some(ScanEvent::Done(result)) => result,
        other => panic!("expected Done as the last event, got {other:?}"),
    }
}

fn item_named<'a>(result: &'a ScanResult, name: &str) -> &'a Item {
    result
        .items
        .iter()
        .find(|item| item.name == name)
        .unwrap_or_else(|| panic!("no item named {name}"))
}
