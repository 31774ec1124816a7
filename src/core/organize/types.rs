//! Types for the organize module.

use crate::error::MoveError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file that could not be handled, with a readable reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl FileFailure {
    pub fn new(path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            path,
            reason: reason.into(),
        }
    }

    pub(crate) fn from_move(path: PathBuf, error: &MoveError) -> Self {
        Self::new(path, error.to_string())
    }
}

/// One planned move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Destination name was disambiguated to avoid a collision
    pub renamed: bool,
}

/// The organization plan (preview)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizePlan {
    pub id: String,
    pub directory: PathBuf,
    /// Sort mode label recorded with the batch
    pub mode: String,
    /// In directory scan order
    pub moves: Vec<PlannedMove>,
    /// Directories absent at planning time, parents before children
    pub directories_to_create: Vec<PathBuf>,
    /// Files classification left in place
    pub skipped: usize,
    pub conflict_count: usize,
    /// Entries whose metadata could not be read during the scan
    pub unreadable: Vec<FileFailure>,
}

impl OrganizePlan {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Result of executing a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Id of the recorded batch, `None` when nothing was moved
    pub batch_id: Option<String>,
    pub moved: usize,
    pub skipped: usize,
    pub failed: Vec<FileFailure>,
    /// Directories created and still in use, recorded for undo
    pub directories_created: Vec<PathBuf>,
    /// Directories created then removed again because every move into them failed
    pub directories_pruned: Vec<PathBuf>,
    pub duration_ms: u64,
    /// History could not be read or written; the moves themselves stand
    pub history_warning: Option<String>,
}
