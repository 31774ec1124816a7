//! # Smart File Organizer
//!
//! Sorts the files at the top level of a directory into sub-folders by
//! extension, by modification time or by keyword rules, and can put every
//! file back where it was.
//!
//! ## Core Philosophy
//! - **Never overwrite** - Name clashes get a ` (n)` suffix
//! - **Every run is undoable** - Each batch is recorded before the user sees the result
//! - **Only clean up what we made** - Undo removes directories this tool created, if empty
//!
//! ## Architecture
//! - `core` - Classification, planning, moving, history and undo (GUI-agnostic)
//! - `app` - The session a frontend drives, with a single background worker
//! - `events` - Event-driven progress reporting
//! - `config` - Persisted settings
//! - `error` - User-facing error types

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrganizerError, Result};

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Activity log file name, reserved from scans
pub const LOG_FILE_NAME: &str = "organizer.log";

/// `<local data dir>/smart-file-organizer/organizer.log`
pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(config::APP_DIR_NAME)
        .join(LOG_FILE_NAME)
}

/// Initialize tracing, appending plain-text lines to `log_file`.
///
/// This should be called once by the application entry point. `RUST_LOG`
/// overrides the default `info` level.
pub fn init_logging(log_file: &Path) -> io::Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}
