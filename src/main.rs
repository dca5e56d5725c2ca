//! heft - find out where your disk space went.
//!
//! Usage:
//!   heft [PATH]              Scan a directory and print its space layout
//!   heft scan [PATH]         Same, as an explicit subcommand
//!   heft drives              List scannable drives and volumes
//!   heft reveal <PATH>       Show a path in the system file manager
//!   heft --help              Show help

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Context, Result};
use itertools::Itertools;
use tracing_subscriber::EnvFilter;

use heft_app::{list_drives, reveal, ScanConfig, ScanEvent, ScanResult, ScanService};
use heft_core::{ItemKind, ItemStatus};

#[derive(Parser)]
#[command(
    name = "heft",
    version,
    about = "Streaming disk usage scanner",
    long_about = "heft scans one directory level at a time, sizing every \
                  subtree behind it.\n\nRun `heft [PATH]` for a quick look, \
                  press Ctrl-C to stop a long scan early; whatever was \
                  measured so far is still reported."
)]
struct Cli {
    /// Directory to scan (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Print the final result as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Milliseconds between progress updates (0 disables throttling)
    #[arg(long, default_value = "200")]
    interval_ms: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory and print its space layout
    Scan {
        /// Directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Print the final result as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Milliseconds between progress updates (0 disables throttling)
        #[arg(long, default_value = "200")]
        interval_ms: u64,
    },

    /// List scannable drives and volumes
    Drives {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a path in the system file manager
    Reveal {
        /// Path to reveal
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Command::Scan {
            path,
            json,
            interval_ms,
        }) => run_scan(&path, json, interval_ms).await,
        Some(Command::Drives { format }) => run_drives(format),
        Some(Command::Reveal { path }) => run_reveal(&path),
        None => run_scan(&cli.path, cli.json, cli.interval_ms).await,
    }
}

/// Scan a root and render the event stream.
async fn run_scan(path: &Path, json: bool, interval_ms: u64) -> Result<()> {
    let root = path.canonicalize().context("Invalid path")?;

    let config = ScanConfig::builder()
        .root(&root)
        .progress_interval(Duration::from_millis(interval_ms))
        .build()?;

    let service = Arc::new(ScanService::new());
    let mut events = service.start(config, false).events;

    // Ctrl-C stops the traversal; the stream still ends with a result.
    let signal_service = Arc::clone(&service);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_service.cancel_current();
        }
    });

    if !json {
        eprintln!("Scanning {}...", root.display());
    }

    let mut done: Option<ScanResult> = None;
    while let Some(session) = events.recv().await {
        match session.event {
            ScanEvent::Progress(progress) if !json => {
                eprint!(
                    "\r {:>4}/{:<4} {} in {} files   ",
                    progress.completed,
                    progress.total,
                    format_size(progress.scanned_bytes),
                    progress.scanned_files
                );
            }
            ScanEvent::Done(result) => done = Some(result),
            _ => {}
        }
    }

    let result = done.ok_or_else(|| eyre!("scan ended without a result"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        eprintln!();
        print_result(&root, &result);
    }
    Ok(())
}

/// Render the final table the way the scan left it, largest first.
fn print_result(root: &Path, result: &ScanResult) {
    if result.root_status != ItemStatus::Ok {
        println!("Could not list {}: {}", root.display(), result.root_status);
        return;
    }

    println!();
    println!("{}", "─".repeat(60));
    println!(" {} - {}", root.display(), format_size(result.scanned_bytes));
    println!(
        " {} files scanned in {:.2}s",
        result.scanned_files,
        result.duration.as_secs_f64()
    );
    if result.cancelled {
        println!(" Cancelled early; sizes below may be incomplete");
    }
    println!("{}", "─".repeat(60));
    println!();

    let mut items: Vec<_> = result.items.iter().collect();
    items.sort_by_key(|item| std::cmp::Reverse(item.size.unwrap_or(0)));

    for item in items {
        let marker = if item.is_dir() { "▼ " } else { "  " };
        let name = if item.is_dir() {
            format!("{}/", item.name)
        } else {
            item.name.to_string()
        };
        let size = match item.size {
            Some(size) => format_size(size),
            None => "-".to_string(),
        };
        let ratio = match (item.size, result.scanned_bytes) {
            (Some(size), total) if total > 0 => size as f64 / total as f64,
            _ => 0.0,
        };
        let note = match item.status {
            ItemStatus::Ok => String::new(),
            other => format!("  [{other}]"),
        };

        println!(
            "{}{:<40} {:>10} {:>5.1}% {}{}",
            marker,
            truncate(&name, 40),
            size,
            ratio * 100.0,
            make_bar(ratio, 10),
            note
        );
    }

    let mut problems: Vec<String> = result
        .items
        .iter()
        .map(|item| item.status)
        .counts()
        .into_iter()
        .filter(|(status, _)| *status != ItemStatus::Ok)
        .map(|(status, count)| format!("{count} {status}"))
        .collect();
    if !problems.is_empty() {
        problems.sort();
        println!();
        println!(" Issues: {}", problems.join(", "));
    }
}

/// List scannable drives.
fn run_drives(format: OutputFormat) -> Result<()> {
    let drives = list_drives();
    match format {
        OutputFormat::Text => {
            for drive in &drives {
                println!("{:<20} {}", drive.label, drive.path.display());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&drives)?);
        }
    }
    Ok(())
}

/// Reveal a path in the platform file manager.
fn run_reveal(path: &Path) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;
    let kind = if path.is_dir() {
        ItemKind::Dir
    } else {
        ItemKind::File
    };
    reveal(&path, kind).context("Could not reveal path")?;
    eprintln!("Revealed {}", path.display());
    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let keep: String = s.chars().take(max_len - 1).collect();
        format!("{keep}…")
    }
}
