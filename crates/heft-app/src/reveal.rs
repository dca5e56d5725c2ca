//! Reveal paths in the platform file manager.

use std::io;
use std::path::Path;

use heft_core::ItemKind;
use thiserror::Error;

/// Failure to hand a path to the file manager.
#[derive(Debug, Error)]
pub enum RevealError {
    /// The path no longer exists on disk.
    #[error("path does not exist: {0}")]
    Missing(String),
    /// The file manager process could not be launched.
    #[error("failed to launch file manager: {0}")]
    Launch(#[from] io::Error),
    /// The system handler rejected the path.
    #[error("failed to open {path}: {message}")]
    Open { path: String, message: String },
}

/// Show `path` in the platform file manager.
///
/// Directories are opened directly; files are selected in their
/// containing folder where the platform supports selection.
pub fn reveal(path: &Path, kind: ItemKind) -> Result<(), RevealError> {
    if !path.exists() {
        return Err(RevealError::Missing(path.display().to_string()));
    }
    match kind {
        ItemKind::Dir => open_directory(path),
        ItemKind::File => select_in_folder(path),
    }
}

fn open_directory(path: &Path) -> Result<(), RevealError> {
    open::that(path).map_err(|err| RevealError::Open {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

#[cfg(target_os = "macos")]
fn select_in_folder(path: &Path) -> Result<(), RevealError> {
    std::process::Command::new("open").arg("-R").arg(path).spawn()?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn select_in_folder(path: &Path) -> Result<(), RevealError> {
    let mut select = std::ffi::OsString::from("/select,");
    select.push(path);
    std::process::Command::new("explorer").arg(select).spawn()?;
    Ok(())
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn select_in_folder(path: &Path) -> Result<(), RevealError> {
    // No portable selection support; open the containing directory.
    open_directory(path.parent().unwrap_or(path))
}
