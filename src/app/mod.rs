//! # App Module
//!
//! The session a frontend drives: which directory is selected, whether an
//! operation is running, and the history store for that directory.
//!
//! Organize and undo run one at a time on a background worker. The history
//! store is handed to the worker with the job and returned on completion,
//! so while an operation is running there is no store to touch and every
//! other command answers [`OrganizerError::Busy`].

mod worker;

pub use worker::Completion;

use crate::core::classify::{SortMode, TimeGranularity};
use crate::core::history::{Batch, HistoryStore};
use crate::core::organize::{BatchResult, DirectoryScanner, MovePlanner, OrganizePlan};
use crate::core::rules;
use crate::core::undo::UndoOutcome;
use crate::error::{OrganizerError, Result, RuleError};
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use worker::{Finished, Job, Worker};

/// A sort request as entered by the user, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OrganizeRequest {
    ByExtension,
    ByTime {
        granularity: TimeGranularity,
        nested: bool,
    },
    ByKeyword {
        /// Groups separated by `;`, keywords within a group by `,`
        groups: String,
        /// Folder names separated by `;`, one per group
        folders: String,
    },
}

impl OrganizeRequest {
    pub fn into_mode(self) -> std::result::Result<SortMode, RuleError> {
        match self {
            OrganizeRequest::ByExtension => Ok(SortMode::ByExtension),
            OrganizeRequest::ByTime {
                granularity,
                nested,
            } => Ok(SortMode::ByTime {
                granularity,
                nested,
            }),
            OrganizeRequest::ByKeyword { groups, folders } => {
                Ok(SortMode::ByKeyword(rules::parse(&groups, &folders)?))
            }
        }
    }
}

/// One user session
pub struct Session {
    directory: Option<PathBuf>,
    /// `None` while the worker holds it
    history: Option<HistoryStore>,
    in_flight: bool,
    worker: Worker,
}

impl Session {
    /// Start a session. Progress events go to `events`.
    pub fn new(events: EventSender) -> Result<Self> {
        let worker = Worker::spawn(events).map_err(OrganizerError::WorkerSpawn)?;
        Ok(Self {
            directory: None,
            history: None,
            in_flight: false,
            worker,
        })
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Make `path` the target of later organize and undo requests
    pub fn select_directory(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.ensure_idle()?;
        let path = path.into();
        DirectoryScanner::check_directory(&path)?;

        tracing::info!(directory = %path.display(), "Directory selected");
        self.history = Some(HistoryStore::for_directory(&path));
        self.directory = Some(path);
        Ok(())
    }

    /// Validate `request` and start organizing the selected directory.
    ///
    /// Rule and directory errors are returned here, before the worker is
    /// involved, and leave the directory untouched.
    pub fn organize(&mut self, request: OrganizeRequest) -> Result<()> {
        self.ensure_idle()?;
        let directory = self
            .directory
            .clone()
            .ok_or(OrganizerError::NoDirectorySelected)?;

        let mode = request.into_mode()?;
        DirectoryScanner::check_directory(&directory)?;

        let history = self.take_history(&directory);
        self.dispatch(Job::Organize {
            directory,
            mode,
            history,
        })
    }

    /// Plan `request` without moving anything
    pub fn preview(&self, request: OrganizeRequest) -> Result<OrganizePlan> {
        self.ensure_idle()?;
        let directory = self
            .directory
            .as_deref()
            .ok_or(OrganizerError::NoDirectorySelected)?;
        let mode = request.into_mode()?;
        Ok(MovePlanner::plan(directory, &mode)?)
    }

    /// Start undoing the most recent batch of the selected directory
    pub fn undo(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let directory = self
            .directory
            .clone()
            .ok_or(OrganizerError::NoDirectorySelected)?;

        let history = self.take_history(&directory);
        self.dispatch(Job::Undo { history })
    }

    /// Block until the running operation finishes.
    ///
    /// Returns `Ok(None)` when nothing is running.
    pub fn wait(&mut self) -> Result<Option<Completion>> {
        if !self.in_flight {
            return Ok(None);
        }
        match self.worker.recv() {
            Some(finished) => Ok(Some(self.finish(finished))),
            None => Err(self.worker_lost()),
        }
    }

    /// Non-blocking variant of [`Session::wait`] for event loops
    pub fn try_complete(&mut self) -> Result<Option<Completion>> {
        if !self.in_flight {
            return Ok(None);
        }
        match self.worker.try_recv() {
            Some(finished) => Ok(Some(self.finish(finished))),
            None => Ok(None),
        }
    }

    /// Organize and wait for the result
    pub fn organize_and_wait(&mut self, request: OrganizeRequest) -> Result<BatchResult> {
        self.organize(request)?;
        match self.wait()? {
            Some(Completion::Organized(result)) => result,
            _ => Err(OrganizerError::WorkerGone),
        }
    }

    /// Undo and wait for the result
    pub fn undo_and_wait(&mut self) -> Result<UndoOutcome> {
        self.undo()?;
        match self.wait()? {
            Some(Completion::Undone(result)) => result,
            _ => Err(OrganizerError::WorkerGone),
        }
    }

    /// Number of batches that can currently be undone
    pub fn pending_undos(&mut self) -> Result<usize> {
        Ok(self.history_mut()?.len())
    }

    /// Recorded batches, oldest first
    pub fn batches(&mut self) -> Result<Vec<Batch>> {
        Ok(self.history_mut()?.batches().to_vec())
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.in_flight {
            return Err(OrganizerError::Busy);
        }
        Ok(())
    }

    fn history_mut(&mut self) -> Result<&mut HistoryStore> {
        self.ensure_idle()?;
        self.history
            .as_mut()
            .ok_or(OrganizerError::NoDirectorySelected)
    }

    fn take_history(&mut self, directory: &Path) -> HistoryStore {
        self.history
            .take()
            .unwrap_or_else(|| HistoryStore::for_directory(directory))
    }

    fn dispatch(&mut self, job: Job) -> Result<()> {
        match self.worker.submit(job) {
            Ok(()) => {
                self.in_flight = true;
                Ok(())
            }
            Err(history) => {
                self.history = Some(history);
                Err(OrganizerError::WorkerGone)
            }
        }
    }

    fn finish(&mut self, finished: Finished) -> Completion {
        self.in_flight = false;
        self.history = Some(finished.history);
        finished.completion
    }

    fn worker_lost(&mut self) -> OrganizerError {
        tracing::error!("Background worker stopped while an operation was running");
        self.in_flight = false;
        // Reload from disk; the file reflects whatever was last persisted
        self.history = self.directory.as_deref().map(HistoryStore::for_directory);
        OrganizerError::WorkerGone
    }
}
