//! JSON-file backed history stack.

use super::types::{Batch, HistoryFile, HISTORY_FORMAT_VERSION};
use crate::error::HistoryError;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// History file name inside every organized directory
pub const HISTORY_FILE_NAME: &str = ".organizer_history.json";

/// Temp sibling used for atomic saves
pub(crate) const HISTORY_TEMP_FILE_NAME: &str = ".organizer_history.json.tmp";

#[derive(Serialize)]
struct HistoryFileRef<'a> {
    version: u32,
    batches: &'a [Batch],
}

/// Owner of the undo stack for one directory.
///
/// The file is the single source of truth: it is read on first access and
/// rewritten after every [`push`](Self::push) and [`pop`](Self::pop).
/// Callers serialize access (one writer at a time); the store does no
/// locking of its own.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    directory: PathBuf,
    batches: Option<Vec<Batch>>,
    warning: Option<HistoryError>,
}

impl HistoryStore {
    /// Store for the history file inside `directory`. Nothing is read yet.
    pub fn for_directory(directory: &Path) -> Self {
        Self {
            path: directory.join(HISTORY_FILE_NAME),
            directory: directory.to_path_buf(),
            batches: None,
            warning: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Record a newly executed batch.
    ///
    /// If writing fails the batch is still kept in memory, so it can be
    /// undone during this run, but it will not survive a restart.
    pub fn push(&mut self, batch: Batch) -> Result<(), HistoryError> {
        tracing::debug!(batch = %batch.id, moves = batch.moves.len(), "Recording batch");
        self.stack().push(batch);
        self.save()
    }

    /// Remove and return the most recent batch, `None` when there is
    /// nothing to undo.
    ///
    /// If the shortened stack cannot be written the batch is put back and
    /// the error returned, so nothing is undone without being forgotten.
    pub fn pop(&mut self) -> Result<Option<Batch>, HistoryError> {
        let Some(batch) = self.stack().pop() else {
            return Ok(None);
        };
        if let Err(e) = self.save() {
            self.stack().push(batch);
            return Err(e);
        }
        Ok(Some(batch))
    }

    /// Most recent batch without removing it
    pub fn peek(&mut self) -> Option<&Batch> {
        self.stack().last()
    }

    /// All batches, oldest first
    pub fn batches(&mut self) -> &[Batch] {
        self.stack()
    }

    pub fn len(&mut self) -> usize {
        self.stack().len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.stack().is_empty()
    }

    /// Problem found while loading, reported once
    pub fn take_warning(&mut self) -> Option<HistoryError> {
        self.stack();
        self.warning.take()
    }

    fn stack(&mut self) -> &mut Vec<Batch> {
        if self.batches.is_none() {
            let batches = match self.load() {
                Ok(batches) => batches,
                Err(e) => {
                    tracing::warn!("{}", e);
                    self.warning = Some(e);
                    Vec::new()
                }
            };
            self.batches = Some(batches);
        }
        self.batches.get_or_insert_with(Vec::new)
    }

    fn load(&self) -> Result<Vec<Batch>, HistoryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(HistoryError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let file: HistoryFile =
            serde_json::from_str(&content).map_err(|e| HistoryError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        if let HistoryFile::Current { version, .. } = &file {
            if *version > HISTORY_FORMAT_VERSION {
                return Err(HistoryError::Corrupt {
                    path: self.path.clone(),
                    reason: format!("unsupported format version {}", version),
                });
            }
        }

        Ok(file.into_batches(&self.directory))
    }

    fn save(&self) -> Result<(), HistoryError> {
        let batches = self.batches.as_deref().unwrap_or(&[]);

        if batches.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(HistoryError::Write {
                    path: self.path.clone(),
                    source,
                }),
            };
        }

        let json = serde_json::to_string_pretty(&HistoryFileRef {
            version: HISTORY_FORMAT_VERSION,
            batches,
        })
        .map_err(|e| HistoryError::Serialize(e.to_string()))?;

        let temp_path = self.directory.join(HISTORY_TEMP_FILE_NAME);
        let write_err = |source: io::Error| HistoryError::Write {
            path: self.path.clone(),
            source,
        };
        fs::write(&temp_path, json).map_err(write_err)?;
        fs::rename(&temp_path, &self.path).map_err(write_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::MoveRecord;
    use tempfile::TempDir;

    fn create_test_batch(dir: &Path, name: &str) -> Batch {
        Batch::new(
            dir.to_path_buf(),
            "By Extension".to_string(),
            vec![MoveRecord {
                source: dir.join(name),
                destination: dir.join("txt").join(name),
            }],
            vec![dir.join("txt")],
        )
    }

    #[test]
    fn test_push_and_pop_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let mut store = HistoryStore::for_directory(temp_dir.path());
        store.push(create_test_batch(temp_dir.path(), "a.txt")).unwrap();
        store.push(create_test_batch(temp_dir.path(), "b.txt")).unwrap();
        drop(store);

        let mut reopened = HistoryStore::for_directory(temp_dir.path());
        assert_eq!(reopened.len(), 2);

        let last = reopened.pop().unwrap().unwrap();
        assert_eq!(last.moves[0].source, temp_dir.path().join("b.txt"));
        drop(reopened);

        let mut again = HistoryStore::for_directory(temp_dir.path());
        assert_eq!(again.len(), 1);
        assert_eq!(
            again.peek().unwrap().moves[0].source,
            temp_dir.path().join("a.txt")
        );
    }

    #[test]
    fn test_failed_save_keeps_stack_in_memory() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = HistoryStore::for_directory(temp_dir.path());
        store.push(create_test_batch(temp_dir.path(), "a.txt")).unwrap();
        store.push(create_test_batch(temp_dir.path(), "b.txt")).unwrap();

        // A directory in the temp file's place makes every write fail
        fs::create_dir(temp_dir.path().join(HISTORY_TEMP_FILE_NAME)).unwrap();

        let pushed = store.push(create_test_batch(temp_dir.path(), "c.txt"));
        assert!(matches!(pushed, Err(HistoryError::Write { .. })));
        assert_eq!(store.len(), 3);

        let popped = store.pop();
        assert!(matches!(popped, Err(HistoryError::Write { .. })));
        assert_eq!(store.len(), 3);
        assert_eq!(
            store.peek().unwrap().moves[0].source,
            temp_dir.path().join("c.txt")
        );

        let mut reopened = HistoryStore::for_directory(temp_dir.path());
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn test_pop_empty_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = HistoryStore::for_directory(temp_dir.path());

        assert!(store.pop().unwrap().is_none());
        assert!(store.take_warning().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_removed_when_stack_empties() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = HistoryStore::for_directory(temp_dir.path());

        store.push(create_test_batch(temp_dir.path(), "a.txt")).unwrap();
        assert!(store.path().exists());

        store.pop().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(HISTORY_FILE_NAME), "{ not json").unwrap();

        let mut store = HistoryStore::for_directory(temp_dir.path());
        assert!(store.is_empty());

        let warning = store.take_warning();
        assert!(matches!(warning, Some(HistoryError::Corrupt { .. })));
        assert!(store.take_warning().is_none());
    }

    #[test]
    fn test_file_is_human_readable() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = HistoryStore::for_directory(temp_dir.path());
        store.push(create_test_batch(temp_dir.path(), "a.txt")).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"version\": 1"));
        assert!(content.contains("\"created_directories\""));
        assert!(content.contains("a.txt"));
        assert!(!temp_dir.path().join(HISTORY_TEMP_FILE_NAME).exists());
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(HISTORY_FILE_NAME),
            r#"{"version": 99, "batches": []}"#,
        )
        .unwrap();

        let mut store = HistoryStore::for_directory(temp_dir.path());
        assert!(store.is_empty());
        assert!(store.take_warning().is_some());
    }
}
