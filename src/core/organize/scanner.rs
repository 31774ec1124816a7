//! Top-level directory scanner.

use super::types::FileFailure;
use crate::config::CONFIG_FILE_NAME;
use crate::core::classify::FileEntry;
use crate::core::history::{HISTORY_FILE_NAME, HISTORY_TEMP_FILE_NAME};
use crate::error::PreflightError;
use crate::LOG_FILE_NAME;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Files the organizer itself writes. Never scanned, never moved.
pub const RESERVED_FILE_NAMES: &[&str] = &[
    HISTORY_FILE_NAME,
    HISTORY_TEMP_FILE_NAME,
    CONFIG_FILE_NAME,
    LOG_FILE_NAME,
];

/// Files found directly inside a directory
#[derive(Debug, Default)]
pub struct ScannedDirectory {
    /// Regular files in file-name order
    pub entries: Vec<FileEntry>,
    pub unreadable: Vec<FileFailure>,
}

/// Lists the direct children of a directory that are candidates for moving
pub struct DirectoryScanner;

impl DirectoryScanner {
    /// Make sure `directory` exists, is a directory and can be listed
    pub fn check_directory(directory: &Path) -> Result<(), PreflightError> {
        let metadata = fs::metadata(directory).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PreflightError::DirectoryNotFound {
                path: directory.to_path_buf(),
            },
            _ => PreflightError::Unreadable {
                path: directory.to_path_buf(),
                source: e,
            },
        })?;

        if !metadata.is_dir() {
            return Err(PreflightError::NotADirectory {
                path: directory.to_path_buf(),
            });
        }

        fs::read_dir(directory).map_err(|source| PreflightError::Unreadable {
            path: directory.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    pub fn is_reserved(filename: &str) -> bool {
        RESERVED_FILE_NAMES.contains(&filename)
    }

    /// Scan the top level of `directory`.
    ///
    /// Subdirectories and symlinks are ignored, as are reserved files.
    pub fn scan(directory: &Path) -> Result<ScannedDirectory, PreflightError> {
        Self::check_directory(directory)?;

        let mut scanned = ScannedDirectory::default();

        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(directory).to_path_buf();
                    tracing::warn!(path = %path.display(), "Skipping unreadable entry: {}", e);
                    scanned.unreadable.push(FileFailure::new(path, e.to_string()));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if Self::is_reserved(&name) {
                tracing::debug!(file = %name, "Skipping reserved file");
                continue;
            }

            match FileEntry::from_path(entry.path()) {
                Ok(file) => scanned.entries.push(file),
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), "Cannot read metadata: {}", e);
                    scanned
                        .unreadable
                        .push(FileFailure::new(entry.path().to_path_buf(), e.to_string()));
                }
            }
        }

        tracing::debug!(
            directory = %directory.display(),
            files = scanned.entries.len(),
            "Scanned directory"
        );
        Ok(scanned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_lists_top_level_files_only() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.txt"), b"b").unwrap();
        fs::write(temp.path().join("a.pdf"), b"a").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested").join("deep.txt"), b"d").unwrap();

        let scanned = DirectoryScanner::scan(temp.path()).unwrap();
        let names: Vec<_> = scanned.entries.iter().map(|e| e.filename.as_str()).collect();

        assert_eq!(names, vec!["a.pdf", "b.txt"]);
    }

    #[test]
    fn test_scan_skips_reserved_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(HISTORY_FILE_NAME), b"[]").unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), b"{}").unwrap();
        fs::write(temp.path().join(LOG_FILE_NAME), b"log").unwrap();
        fs::write(temp.path().join("keep.txt"), b"k").unwrap();

        let scanned = DirectoryScanner::scan(temp.path()).unwrap();

        assert_eq!(scanned.entries.len(), 1);
        assert_eq!(scanned.entries[0].filename, "keep.txt");
    }

    #[test]
    fn test_missing_directory_fails_preflight() {
        let result = DirectoryScanner::scan(Path::new("/nonexistent/organizer/dir"));
        assert!(matches!(result, Err(PreflightError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, b"x").unwrap();

        let result = DirectoryScanner::check_directory(&file);
        assert!(matches!(result, Err(PreflightError::NotADirectory { .. })));
    }
}
