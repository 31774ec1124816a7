//! # Undo Module
//!
//! Reverses the most recent recorded batch.
//!
//! Moves are reversed newest first. Afterwards every directory the batch
//! created is removed if, and only if, it is empty at that moment,
//! deepest first so a parent is only considered once its children are
//! gone. Directories the batch did not create are never touched.

use crate::core::fs_ops::{is_empty_dir, move_file};
use crate::core::history::{Batch, HistoryStore};
use crate::core::organize::FileFailure;
use crate::error::HistoryError;
use crate::events::{Event, EventSender, MoveProgress, UndoEvent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// Result of reversing one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoResult {
    pub batch_id: String,
    pub restored: usize,
    pub failed: Vec<FileFailure>,
    pub directories_removed: Vec<PathBuf>,
    /// Created by the batch but still holding something
    pub directories_kept: Vec<PathBuf>,
    pub duration_ms: u64,
}

/// What an undo request produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UndoOutcome {
    /// The history was empty; nothing changed
    NothingToUndo {
        /// Set when the history file was unreadable and treated as empty
        history_warning: Option<String>,
    },
    Undone(UndoResult),
}

/// Reverses recorded batches
pub struct UndoEngine;

impl UndoEngine {
    /// Pop the most recent batch and reverse it.
    ///
    /// Fails only when the shortened history cannot be written, in which
    /// case the batch stays recorded and no file is touched.
    pub fn undo_last(
        history: &mut HistoryStore,
        events: &EventSender,
    ) -> Result<UndoOutcome, HistoryError> {
        let history_warning = history.take_warning().map(|e| e.to_string());

        let Some(batch) = history.pop()? else {
            tracing::warn!("History is empty. Nothing to undo.");
            events.send(Event::Undo(UndoEvent::NothingToUndo));
            return Ok(UndoOutcome::NothingToUndo { history_warning });
        };

        Ok(UndoOutcome::Undone(Self::reverse_batch(&batch, events)))
    }

    /// Move every file of `batch` back and clean up its empty directories
    pub fn reverse_batch(batch: &Batch, events: &EventSender) -> UndoResult {
        let start = Instant::now();
        let total = batch.moves.len();
        let mut restored = 0;
        let mut failed = Vec::new();

        tracing::info!(batch = %batch.id, moves = total, "Undoing batch");
        events.send(Event::Undo(UndoEvent::Started {
            batch_id: batch.id.clone(),
            moves: total,
        }));

        for (i, record) in batch.moves.iter().rev().enumerate() {
            match move_file(&record.destination, &record.source) {
                Ok(()) => {
                    tracing::info!(
                        "UNDO: Moved {} -> {}",
                        record.destination.display(),
                        record.source.display()
                    );
                    restored += 1;
                }
                Err(e) => {
                    tracing::warn!("UNDO: could not restore {}", e);
                    events.send(Event::Undo(UndoEvent::FileFailed {
                        path: record.destination.clone(),
                        message: e.to_string(),
                    }));
                    failed.push(FileFailure::from_move(record.destination.clone(), &e));
                }
            }

            events.send(Event::Undo(UndoEvent::Progress(MoveProgress {
                completed: i + 1,
                total,
                current_path: record.source.clone(),
            })));
        }

        let (directories_removed, directories_kept) = Self::remove_created_directories(batch, events);

        events.send(Event::Undo(UndoEvent::Completed {
            restored,
            failed: failed.len(),
        }));

        UndoResult {
            batch_id: batch.id.clone(),
            restored,
            failed,
            directories_removed,
            directories_kept,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn remove_created_directories(
        batch: &Batch,
        events: &EventSender,
    ) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let mut dirs: Vec<&PathBuf> = batch
            .created_directories
            .iter()
            .filter(|dir| **dir != batch.directory)
            .collect();
        dirs.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));

        let mut removed = Vec::new();
        let mut kept = Vec::new();

        for dir in dirs {
            if !dir.is_dir() {
                continue;
            }
            match is_empty_dir(dir) {
                Ok(true) => match fs::remove_dir(dir) {
                    Ok(()) => {
                        tracing::info!("Removed empty folder: {}", dir.display());
                        events.send(Event::Undo(UndoEvent::DirectoryRemoved { path: dir.clone() }));
                        removed.push(dir.clone());
                    }
                    Err(e) => {
                        tracing::warn!("Could not remove folder {}: {}", dir.display(), e);
                        kept.push(dir.clone());
                    }
                },
                Ok(false) => {
                    tracing::debug!(dir = %dir.display(), "Folder not empty, keeping");
                    kept.push(dir.clone());
                }
                Err(e) => {
                    tracing::warn!("Could not inspect folder {}: {}", dir.display(), e);
                    kept.push(dir.clone());
                }
            }
        }

        (removed, kept)
    }
}
