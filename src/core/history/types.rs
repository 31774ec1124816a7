//! Types for the persisted undo history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Current on-disk format version
pub const HISTORY_FORMAT_VERSION: u32 = 1;

/// One executed move, source to destination (absolute paths)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// The unit of undo: every successful move of one organize run plus the
/// directories that run brought into existence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// The organized directory
    pub directory: PathBuf,
    /// Human-readable sort mode label
    pub mode: String,
    /// In execution order
    pub moves: Vec<MoveRecord>,
    /// Directories that did not exist before this batch, parents first
    #[serde(default)]
    pub created_directories: Vec<PathBuf>,
}

impl Batch {
    pub fn new(
        directory: PathBuf,
        mode: String,
        moves: Vec<MoveRecord>,
        created_directories: Vec<PathBuf>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            directory,
            mode,
            moves,
            created_directories,
        }
    }
}

/// On-disk representation of the history file
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum HistoryFile {
    Current {
        version: u32,
        batches: Vec<Batch>,
    },
    /// Bare stack of `[source, destination]` pair lists, no created-directory tracking
    Legacy(Vec<Vec<(PathBuf, PathBuf)>>),
}

impl HistoryFile {
    pub(crate) fn into_batches(self, directory: &std::path::Path) -> Vec<Batch> {
        match self {
            HistoryFile::Current { batches, .. } => batches,
            HistoryFile::Legacy(stack) => stack
                .into_iter()
                .map(|pairs| {
                    let moves = pairs
                        .into_iter()
                        .map(|(source, destination)| MoveRecord {
                            source,
                            destination,
                        })
                        .collect();
                    Batch::new(directory.to_path_buf(), "legacy".to_string(), moves, Vec::new())
                })
                .collect(),
        }
    }
}
