//! # Error Module
//!
//! Error types for the file organizer.
//!
//! ## Categories
//! - **Validation** (`RuleError`) - bad keyword rules, nothing executed
//! - **Preflight** (`PreflightError`) - target directory missing or unreadable, nothing executed
//! - **Per-file** (`MoveError`) - recorded in the summary, the batch continues
//! - **Persistence** (`HistoryError`) - contained to the history store, never rolls back moves
//!
//! "Nothing to undo" is not an error; see [`crate::core::undo::UndoOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Invalid keyword rules: {0}")]
    Rules(#[from] RuleError),

    #[error("Cannot organize: {0}")]
    Preflight(#[from] PreflightError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Another organize or undo operation is still running")]
    Busy,

    #[error("No directory selected. Choose a folder first.")]
    NoDirectorySelected,

    #[error("Failed to start background worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("Background worker stopped unexpectedly")]
    WorkerGone,
}

/// Errors in the keyword-groups / destination-folders syntax
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Keyword and folder rules cannot be empty")]
    EmptyRules,

    #[error("Keyword group {index} has no keywords")]
    EmptyKeywordGroup { index: usize },

    #[error("Folder name {index} is empty")]
    EmptyFolderName { index: usize },

    #[error("Folder name '{name}' is not a plain folder name")]
    InvalidFolderName { name: String },

    #[error("Found {groups} keyword groups but {folders} folders. They must match.")]
    RuleCountMismatch { groups: usize, folders: usize },
}

/// Checks made on the target directory before anything is touched
#[derive(Error, Debug)]
pub enum PreflightError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single file move that could not be performed
#[derive(Error, Debug)]
pub enum MoveError {
    #[error("{path}: file not found")]
    SourceMissing { path: PathBuf },

    #[error("{path}: destination already exists")]
    DestinationOccupied { path: PathBuf },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reading or writing the persisted history
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History file {path} is corrupt ({reason}). Starting with an empty history.")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Failed to read history file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write history file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize history: {0}")]
    Serialize(String),
}

/// Errors loading or saving the application config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;
