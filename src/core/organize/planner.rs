//! Plan generator for organization operations.

use super::scanner::DirectoryScanner;
use super::types::*;
use crate::core::classify::{classify, Classification, FileEntry, SortMode};
use crate::error::PreflightError;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Generates organization plans
pub struct MovePlanner;

impl MovePlanner {
    /// Scan `directory` and plan a move for every file `mode` classifies
    pub fn plan(directory: &Path, mode: &SortMode) -> Result<OrganizePlan, PreflightError> {
        let scanned = DirectoryScanner::scan(directory)?;
        let mut plan = Self::plan_entries(directory, scanned.entries, mode);
        plan.unreadable = scanned.unreadable;
        Ok(plan)
    }

    /// Plan moves for already scanned entries, keeping their order
    pub fn plan_entries(directory: &Path, entries: Vec<FileEntry>, mode: &SortMode) -> OrganizePlan {
        let mut moves = Vec::new();
        let mut skipped = 0;
        let mut conflict_count = 0;
        let mut claimed: HashSet<PathBuf> = HashSet::new();
        // Next suffix to try per original destination, so repeated clashes
        // don't rescan from (1)
        let mut next_suffix: HashMap<PathBuf, usize> = HashMap::new();
        let mut to_create: BTreeSet<PathBuf> = BTreeSet::new();

        for entry in entries {
            let folder = match classify(&entry, mode) {
                Classification::Destination(folder) => folder,
                Classification::Skip => {
                    tracing::debug!(file = %entry.filename, "No rule matched, leaving in place");
                    skipped += 1;
                    continue;
                }
            };

            let dest_dir = directory.join(&folder);
            to_create.extend(Self::missing_directories(directory, &dest_dir));

            let wanted = dest_dir.join(&entry.filename);
            let destination =
                Self::unique_destination(&wanted, &entry.path, &claimed, &mut next_suffix);
            let renamed = destination != wanted;
            if renamed {
                conflict_count += 1;
                tracing::debug!(
                    file = %entry.filename,
                    destination = %destination.display(),
                    "Destination taken, renaming"
                );
            }

            claimed.insert(destination.clone());
            moves.push(PlannedMove {
                source: entry.path,
                destination,
                renamed,
            });
        }

        // BTreeSet orders a parent before any of its children
        let directories_to_create = to_create.into_iter().collect();

        OrganizePlan {
            id: Uuid::new_v4().to_string(),
            directory: directory.to_path_buf(),
            mode: mode.to_string(),
            moves,
            directories_to_create,
            skipped,
            conflict_count,
            unreadable: Vec::new(),
        }
    }

    /// Directories between `root` (exclusive) and `dest_dir` (inclusive)
    /// that do not exist yet
    fn missing_directories(root: &Path, dest_dir: &Path) -> Vec<PathBuf> {
        dest_dir
            .ancestors()
            .take_while(|dir| *dir != root)
            .filter(|dir| dir.symlink_metadata().is_err())
            .map(Path::to_path_buf)
            .collect()
    }

    /// First free variant of `wanted`: `name.ext`, `name (1).ext`, `name (2).ext`, ...
    ///
    /// A path is free when no planned move claims it and nothing exists
    /// there on disk (other than the source file itself).
    fn unique_destination(
        wanted: &Path,
        source: &Path,
        claimed: &HashSet<PathBuf>,
        next_suffix: &mut HashMap<PathBuf, usize>,
    ) -> PathBuf {
        let is_free = |candidate: &Path| {
            !claimed.contains(candidate)
                && (candidate == source || candidate.symlink_metadata().is_err())
        };

        if is_free(wanted) {
            return wanted.to_path_buf();
        }

        let counter = next_suffix.entry(wanted.to_path_buf()).or_insert(1);
        loop {
            let candidate = wanted.with_file_name(Self::numbered_name(wanted, *counter));
            *counter += 1;
            if is_free(&candidate) {
                return candidate;
            }
        }
    }

    fn numbered_name(path: &Path, n: usize) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match path.extension() {
            Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
            None => format!("{} ({})", stem, n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::TimeGranularity;
    use crate::core::rules;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_plan_by_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.pdf"), b"a").unwrap();
        fs::write(temp.path().join("b.jpg"), b"b").unwrap();

        let plan = MovePlanner::plan(temp.path(), &SortMode::ByExtension).unwrap();

        assert_eq!(plan.moves.len(), 2);
        assert_eq!(plan.moves[0].destination, temp.path().join("pdf").join("a.pdf"));
        assert_eq!(plan.moves[1].destination, temp.path().join("jpg").join("b.jpg"));
        assert_eq!(
            plan.directories_to_create,
            vec![temp.path().join("jpg"), temp.path().join("pdf")]
        );
        assert_eq!(plan.skipped, 0);
    }

    #[test]
    fn test_existing_names_get_next_free_suffix() {
        let temp = TempDir::new().unwrap();
        let txt_dir = temp.path().join("txt");
        fs::create_dir(&txt_dir).unwrap();
        fs::write(txt_dir.join("report.txt"), b"1").unwrap();
        fs::write(txt_dir.join("report (1).txt"), b"2").unwrap();
        fs::write(temp.path().join("report.txt"), b"3").unwrap();

        let plan = MovePlanner::plan(temp.path(), &SortMode::ByExtension).unwrap();

        assert_eq!(plan.moves.len(), 1);
        assert_eq!(plan.moves[0].destination, txt_dir.join("report (2).txt"));
        assert!(plan.moves[0].renamed);
        assert_eq!(plan.conflict_count, 1);
    }

    #[test]
    fn test_preexisting_directory_is_not_planned_for_creation() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("pdf")).unwrap();
        fs::write(temp.path().join("a.pdf"), b"a").unwrap();

        let plan = MovePlanner::plan(temp.path(), &SortMode::ByExtension).unwrap();

        assert!(plan.directories_to_create.is_empty());
    }

    #[test]
    fn test_nested_time_directories_listed_parent_first() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("report.txt"), b"r").unwrap();
        let mode = SortMode::ByTime {
            granularity: TimeGranularity::Day,
            nested: true,
        };

        let plan = MovePlanner::plan(temp.path(), &mode).unwrap();

        assert_eq!(plan.directories_to_create.len(), 3);
        for pair in plan.directories_to_create.windows(2) {
            assert!(pair[1].starts_with(&pair[0]));
        }
    }

    #[test]
    fn test_unmatched_keyword_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("invoice-1.pdf"), b"i").unwrap();
        fs::write(temp.path().join("holiday.jpg"), b"h").unwrap();
        let mode = SortMode::ByKeyword(rules::parse("invoice", "Finance").unwrap());

        let plan = MovePlanner::plan(temp.path(), &mode).unwrap();

        assert_eq!(plan.moves.len(), 1);
        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.directories_to_create, vec![temp.path().join("Finance")]);
    }

    #[test]
    fn test_claimed_destinations_never_collide_within_a_plan() {
        let wanted = PathBuf::from("/nonexistent/dest/photo.jpg");
        let mut claimed = HashSet::new();
        let mut counters = HashMap::new();

        for i in 0..3 {
            let source = PathBuf::from(format!("/nonexistent/src{}/photo.jpg", i));
            let dest = MovePlanner::unique_destination(&wanted, &source, &claimed, &mut counters);
            assert!(claimed.insert(dest));
        }

        assert!(claimed.contains(Path::new("/nonexistent/dest/photo (1).jpg")));
        assert!(claimed.contains(Path::new("/nonexistent/dest/photo (2).jpg")));
    }

    #[test]
    fn test_planning_twice_gives_distinct_destinations() {
        let temp = TempDir::new().unwrap();
        for name in ["a.txt", "b.txt", "c.md", "noext"] {
            fs::write(temp.path().join(name), b"x").unwrap();
        }

        for _ in 0..2 {
            let plan = MovePlanner::plan(temp.path(), &SortMode::ByExtension).unwrap();
            let unique: HashSet<_> = plan.moves.iter().map(|m| &m.destination).collect();
            assert_eq!(unique.len(), plan.moves.len());
        }
    }

    #[test]
    fn test_numbered_name_without_extension() {
        assert_eq!(MovePlanner::numbered_name(Path::new("/d/README"), 3), "README (3)");
        assert_eq!(MovePlanner::numbered_name(Path::new("/d/a.tar.gz"), 1), "a.tar (1).gz");
    }
}
