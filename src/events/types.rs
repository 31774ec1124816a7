//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while organizing or undoing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Organize run events
    Organize(OrganizeEvent),
    /// Undo run events
    Undo(UndoEvent),
}

/// Events during an organize run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrganizeEvent {
    /// Planning has started
    Started { directory: PathBuf },
    /// The plan is ready and moves are about to start
    Planned { moves: usize, skipped: usize },
    /// A file was moved (or failed to move)
    Progress(MoveProgress),
    /// A file could not be moved; the batch continues
    FileFailed { path: PathBuf, message: String },
    /// The batch finished
    Completed { moved: usize, failed: usize },
}

/// Events during an undo run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UndoEvent {
    /// Reversing a batch has started
    Started { batch_id: String, moves: usize },
    /// A file was restored (or failed to restore)
    Progress(MoveProgress),
    /// A file could not be restored; undo continues
    FileFailed { path: PathBuf, message: String },
    /// An empty directory created by the batch was removed
    DirectoryRemoved { path: PathBuf },
    /// There was no batch to undo
    NothingToUndo,
    /// Undo finished
    Completed { restored: usize, failed: usize },
}

/// Progress through the moves of a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveProgress {
    /// Moves attempted so far
    pub completed: usize,
    /// Moves in the batch
    pub total: usize,
    /// File just handled
    pub current_path: PathBuf,
}

impl MoveProgress {
    /// Completion percentage, 0-100
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Organize(OrganizeEvent::Progress(MoveProgress {
            completed: 3,
            total: 12,
            current_path: PathBuf::from("/data/a.pdf"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Organize(OrganizeEvent::Progress(p)) => {
                assert_eq!(p.completed, 3);
                assert_eq!(p.total, 12);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn progress_percent_handles_empty_batch() {
        let progress = MoveProgress {
            completed: 0,
            total: 0,
            current_path: PathBuf::new(),
        };
        assert_eq!(progress.percent(), 100.0);

        let half = MoveProgress {
            completed: 5,
            total: 10,
            current_path: PathBuf::new(),
        };
        assert_eq!(half.percent(), 50.0);
    }
}
