//! Single background worker for organize and undo jobs.

use crate::core::classify::SortMode;
use crate::core::history::HistoryStore;
use crate::core::organize::{BatchResult, MovePlanner, OrganizeExecutor};
use crate::core::undo::{UndoEngine, UndoOutcome};
use crate::error::OrganizerError;
use crate::events::{Event, EventSender, OrganizeEvent};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

/// Work handed to the worker. The history store travels with the job and
/// comes back in [`Finished`].
pub(crate) enum Job {
    Organize {
        directory: PathBuf,
        mode: SortMode,
        history: HistoryStore,
    },
    Undo {
        history: HistoryStore,
    },
}

impl Job {
    fn into_history(self) -> HistoryStore {
        match self {
            Job::Organize { history, .. } | Job::Undo { history } => history,
        }
    }
}

/// Outcome of a finished job
#[derive(Debug)]
pub enum Completion {
    Organized(Result<BatchResult, OrganizerError>),
    Undone(Result<UndoOutcome, OrganizerError>),
}

pub(crate) struct Finished {
    pub history: HistoryStore,
    pub completion: Completion,
}

pub(crate) struct Worker {
    jobs: Option<Sender<Job>>,
    finished: Receiver<Finished>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(events: EventSender) -> io::Result<Self> {
        let (job_tx, job_rx) = unbounded::<Job>();
        let (done_tx, done_rx) = unbounded::<Finished>();

        let handle = thread::Builder::new()
            .name("organizer-worker".to_string())
            .spawn(move || run(job_rx, done_tx, events))?;

        Ok(Self {
            jobs: Some(job_tx),
            finished: done_rx,
            handle: Some(handle),
        })
    }

    /// Queue a job. Hands the history back if the worker is gone.
    pub fn submit(&self, job: Job) -> Result<(), HistoryStore> {
        match &self.jobs {
            Some(jobs) => jobs.send(job).map_err(|e| e.into_inner().into_history()),
            None => Err(job.into_history()),
        }
    }

    pub fn recv(&self) -> Option<Finished> {
        self.finished.recv().ok()
    }

    pub fn try_recv(&self) -> Option<Finished> {
        self.finished.try_recv().ok()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop once the current job is done
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(jobs: Receiver<Job>, finished: Sender<Finished>, events: EventSender) {
    for job in jobs.iter() {
        let done = match job {
            Job::Organize {
                directory,
                mode,
                mut history,
            } => {
                let result = organize(directory, &mode, &mut history, &events);
                Finished {
                    history,
                    completion: Completion::Organized(result),
                }
            }
            Job::Undo { mut history } => {
                let result = UndoEngine::undo_last(&mut history, &events).map_err(Into::into);
                Finished {
                    history,
                    completion: Completion::Undone(result),
                }
            }
        };

        if finished.send(done).is_err() {
            break;
        }
    }
    tracing::debug!("Worker stopped");
}

fn organize(
    directory: PathBuf,
    mode: &SortMode,
    history: &mut HistoryStore,
    events: &EventSender,
) -> Result<BatchResult, OrganizerError> {
    tracing::info!(directory = %directory.display(), mode = %mode, "Starting organization");
    events.send(Event::Organize(OrganizeEvent::Started {
        directory: directory.clone(),
    }));

    let plan = MovePlanner::plan(&directory, mode)?;
    tracing::info!(files = plan.moves.len(), skipped = plan.skipped, "Plan ready");

    Ok(OrganizeExecutor::execute(&plan, history, events)?)
}
