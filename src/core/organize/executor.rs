//! Executor for organization plans.

use super::scanner::DirectoryScanner;
use super::types::*;
use crate::core::fs_ops::{is_empty_dir, move_file};
use crate::core::history::{Batch, HistoryStore, MoveRecord};
use crate::error::PreflightError;
use crate::events::{Event, EventSender, MoveProgress, OrganizeEvent};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

/// Executes organization plans
pub struct OrganizeExecutor;

impl OrganizeExecutor {
    /// Execute a plan and record the successful moves as one batch.
    ///
    /// Individual failures are collected and the batch carries on. Created
    /// directories that end up empty because every move into them failed
    /// are removed again before the batch is recorded.
    pub fn execute(
        plan: &OrganizePlan,
        history: &mut HistoryStore,
        events: &EventSender,
    ) -> Result<BatchResult, PreflightError> {
        DirectoryScanner::check_directory(&plan.directory)?;

        let start = Instant::now();
        let total = plan.moves.len();
        let mut failed = plan.unreadable.clone();
        let mut records = Vec::with_capacity(total);

        events.send(Event::Organize(OrganizeEvent::Planned {
            moves: total,
            skipped: plan.skipped,
        }));

        let mut created = Self::create_directories(&plan.directories_to_create);

        for (i, planned) in plan.moves.iter().enumerate() {
            match move_file(&planned.source, &planned.destination) {
                Ok(()) => {
                    tracing::info!(
                        "Moved: {} -> {}",
                        planned.source.display(),
                        planned.destination.display()
                    );
                    records.push(MoveRecord {
                        source: planned.source.clone(),
                        destination: planned.destination.clone(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Error moving {}", e);
                    events.send(Event::Organize(OrganizeEvent::FileFailed {
                        path: planned.source.clone(),
                        message: e.to_string(),
                    }));
                    failed.push(FileFailure::from_move(planned.source.clone(), &e));
                }
            }

            events.send(Event::Organize(OrganizeEvent::Progress(MoveProgress {
                completed: i + 1,
                total,
                current_path: planned.source.clone(),
            })));
        }

        let pruned = Self::prune_unused(&mut created);

        let moved = records.len();
        let mut history_warning = history.take_warning().map(|e| e.to_string());
        let batch_id = if records.is_empty() {
            None
        } else {
            let batch = Batch::new(
                plan.directory.clone(),
                plan.mode.clone(),
                records,
                created.clone(),
            );
            let id = batch.id.clone();
            if let Err(e) = history.push(batch) {
                // The files stay where they are; only the durable record is missing
                tracing::error!("Error saving history: {}", e);
                history_warning = Some(e.to_string());
            }
            Some(id)
        };

        tracing::info!(
            moved,
            failed = failed.len(),
            skipped = plan.skipped,
            "Organization complete"
        );
        events.send(Event::Organize(OrganizeEvent::Completed {
            moved,
            failed: failed.len(),
        }));

        Ok(BatchResult {
            batch_id,
            moved,
            skipped: plan.skipped,
            failed,
            directories_created: created,
            directories_pruned: pruned,
            duration_ms: start.elapsed().as_millis() as u64,
            history_warning,
        })
    }

    /// Create planned directories in order, returning the ones this call
    /// actually brought into existence
    fn create_directories(dirs: &[PathBuf]) -> Vec<PathBuf> {
        let mut created = Vec::new();
        for dir in dirs {
            match fs::create_dir(dir) {
                Ok(()) => {
                    tracing::debug!(dir = %dir.display(), "Created directory");
                    created.push(dir.clone());
                }
                // Appeared since planning; it is not ours to remove later
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {}
                Err(e) => {
                    // Moves into it will fail and be reported per file
                    tracing::warn!("Failed to create {}: {}", dir.display(), e);
                }
            }
        }
        created
    }

    /// Remove created directories left empty, deepest first
    fn prune_unused(created: &mut Vec<PathBuf>) -> Vec<PathBuf> {
        let mut pruned = Vec::new();
        for dir in created.iter().rev() {
            if matches!(is_empty_dir(dir), Ok(true)) && fs::remove_dir(dir).is_ok() {
                tracing::debug!(dir = %dir.display(), "Removed unused directory");
                pruned.push(dir.clone());
            }
        }
        created.retain(|dir| !pruned.contains(dir));
        pruned
    }
}
