//! Filesystem primitives shared by the executor and the undo engine.

use crate::error::MoveError;
use std::fs;
use std::io;
use std::path::Path;

/// Move `source` to `destination` without ever overwriting an existing file.
///
/// Tries a rename first. If that fails for a reason other than a missing
/// source or a permission problem (typically a cross-device move), falls
/// back to copy, verifies the copied size, then deletes the source.
pub fn move_file(source: &Path, destination: &Path) -> Result<(), MoveError> {
    if !source.exists() {
        return Err(MoveError::SourceMissing {
            path: source.to_path_buf(),
        });
    }
    if destination.symlink_metadata().is_ok() {
        return Err(MoveError::DestinationOccupied {
            path: destination.to_path_buf(),
        });
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound && !source.exists() => {
            Err(MoveError::SourceMissing {
                path: source.to_path_buf(),
            })
        }
        // Missing destination folder or no permission: copying would fail the same way
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied) => Err(MoveError::Io {
            path: source.to_path_buf(),
            source: e,
        }),
        Err(_) => copy_then_remove(source, destination).map_err(|e| MoveError::Io {
            path: source.to_path_buf(),
            source: e,
        }),
    }
}

fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    copy_then_remove_with(source, destination, |path| fs::remove_file(path))
}

/// Copy, verify, then remove the source with `remove_source`. On any
/// failure the copy is deleted again so the file only exists at `source`.
fn copy_then_remove_with(
    source: &Path,
    destination: &Path,
    remove_source: impl FnOnce(&Path) -> io::Result<()>,
) -> io::Result<()> {
    let source_size = fs::metadata(source)?.len();
    if let Err(e) = fs::copy(source, destination) {
        let _ = fs::remove_file(destination);
        return Err(e);
    }

    // Verify destination size matches source before deleting
    let dest_size = fs::metadata(destination)?.len();
    if dest_size != source_size {
        let _ = fs::remove_file(destination);
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!(
                "Copy verification failed: source {} bytes, dest {} bytes",
                source_size, dest_size
            ),
        ));
    }

    if let Err(e) = remove_source(source) {
        if let Err(cleanup) = fs::remove_file(destination) {
            tracing::warn!(
                "Could not remove copy {} after failed move: {}",
                destination.display(),
                cleanup
            );
        }
        return Err(e);
    }
    Ok(())
}

/// Whether `dir` exists and has no entries
pub fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn moves_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        let dst = temp.path().join("b.txt");
        fs::write(&src, b"hello").unwrap();

        move_file(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"hello");
    }

    #[test]
    fn refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        let dst = temp.path().join("b.txt");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();

        let err = move_file(&src, &dst).unwrap_err();

        assert!(matches!(err, MoveError::DestinationOccupied { .. }));
        assert_eq!(fs::read(&dst).unwrap(), b"old");
        assert!(src.exists());
    }

    #[test]
    fn missing_source_is_reported() {
        let temp = TempDir::new().unwrap();
        let err = move_file(&temp.path().join("gone.txt"), &temp.path().join("x.txt")).unwrap_err();
        assert!(matches!(err, MoveError::SourceMissing { .. }));
    }

    #[test]
    fn copy_fallback_copies_and_removes_source() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        let dst = temp.path().join("b.txt");
        fs::write(&src, b"hello").unwrap();

        copy_then_remove(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"hello");
    }

    #[test]
    fn copy_fallback_discards_copy_when_source_cannot_be_removed() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        let dst = temp.path().join("b.txt");
        fs::write(&src, b"hello").unwrap();

        let err = copy_then_remove_with(&src, &dst, |_| {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        })
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(fs::read(&src).unwrap(), b"hello");
        assert!(!dst.exists());
    }

    #[test]
    fn empty_dir_detection() {
        let temp = TempDir::new().unwrap();
        assert!(is_empty_dir(temp.path()).unwrap());
        fs::write(temp.path().join("f"), b"").unwrap();
        assert!(!is_empty_dir(temp.path()).unwrap());
    }
}
