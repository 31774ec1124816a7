//! # Classification
//!
//! Decides the relative destination folder for a single file under the
//! active sort mode.
//!
//! ## Modes
//! - **Extension** - `pdf/`, `jpg/`, or `other/` for files without one
//! - **Time** - last-modified time in local time, flat (`2023-07`) or nested (`2023/07`)
//! - **Keyword** - first matching keyword group; unmatched files are skipped

use crate::core::rules::KeywordRuleSet;
use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Bucket for files whose name has no extension
pub const NO_EXTENSION_FOLDER: &str = "other";

/// Snapshot of a top-level file taken at scan time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub filename: String,
    /// Lower-cased, without the leading dot
    pub extension: Option<String>,
    pub modified: SystemTime,
}

impl FileEntry {
    /// Read the metadata of `path` into an entry
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .filter(|e| !e.is_empty());

        Ok(Self {
            path: path.to_path_buf(),
            filename,
            extension,
            modified: metadata.modified()?,
        })
    }
}

/// Coarseness of time-based grouping, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeGranularity {
    Decade,
    #[default]
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeGranularity::Decade => "Decade",
            TimeGranularity::Year => "Year",
            TimeGranularity::Month => "Month",
            TimeGranularity::Day => "Day",
            TimeGranularity::Hour => "Hour",
            TimeGranularity::Minute => "Minute",
            TimeGranularity::Second => "Second",
        };
        write!(f, "{}", name)
    }
}

/// The active organization rule set. Exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortMode {
    ByExtension,
    ByTime {
        granularity: TimeGranularity,
        /// One folder level per component instead of a single folder name
        nested: bool,
    },
    ByKeyword(KeywordRuleSet),
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::ByExtension => write!(f, "By Extension"),
            SortMode::ByTime { granularity, nested } => {
                let layout = if *nested { "nested" } else { "flat" };
                write!(f, "By Time ({}, {})", granularity, layout)
            }
            SortMode::ByKeyword(rules) => write!(f, "By Keyword ({} groups)", rules.len()),
        }
    }
}

/// Outcome of classifying one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Folder path relative to the organized directory
    Destination(PathBuf),
    /// Leave the file where it is
    Skip,
}

/// Compute where `entry` belongs under `mode`
pub fn classify(entry: &FileEntry, mode: &SortMode) -> Classification {
    match mode {
        SortMode::ByExtension => {
            let folder = entry.extension.as_deref().unwrap_or(NO_EXTENSION_FOLDER);
            Classification::Destination(PathBuf::from(folder))
        }
        SortMode::ByTime { granularity, nested } => match local_time(entry.modified) {
            Some(local) => Classification::Destination(time_destination(
                local.naive_local(),
                *granularity,
                *nested,
            )),
            None => {
                tracing::warn!(file = %entry.filename, "Modification time out of range, leaving in place");
                Classification::Skip
            }
        },
        SortMode::ByKeyword(rules) => match rules.folder_for(&entry.filename) {
            Some(folder) => Classification::Destination(PathBuf::from(folder)),
            None => Classification::Skip,
        },
    }
}

/// Checked `SystemTime` to local time conversion, `None` when the time is
/// outside the range chrono can represent
fn local_time(time: SystemTime) -> Option<DateTime<Local>> {
    let utc = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => {
            DateTime::<Utc>::from_timestamp(i64::try_from(after.as_secs()).ok()?, after.subsec_nanos())?
        }
        Err(e) => {
            let before = e.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => DateTime::<Utc>::from_timestamp(-secs, 0)?,
                nanos => DateTime::<Utc>::from_timestamp(-secs - 1, 1_000_000_000 - nanos)?,
            }
        }
    };
    Some(utc.with_timezone(&Local))
}

/// Folder path for a timestamp at the given granularity.
///
/// Nested: `2023/07/15/16h/30m/05s` (decade alone is `2020s`).
/// Flat: `2023-07-15_16h30m05s`, truncated to the granularity.
pub fn time_destination(time: NaiveDateTime, granularity: TimeGranularity, nested: bool) -> PathBuf {
    use TimeGranularity::*;

    let decade = format!("{:04}s", time.year().div_euclid(10) * 10);
    let year = format!("{:04}", time.year());
    let month = format!("{:02}", time.month());
    let day = format!("{:02}", time.day());
    let hour = format!("{:02}h", time.hour());
    let minute = format!("{:02}m", time.minute());
    let second = format!("{:02}s", time.second());

    if granularity == Decade {
        return PathBuf::from(decade);
    }

    if nested {
        let mut path = PathBuf::from(year);
        let levels = [(Month, month), (Day, day), (Hour, hour), (Minute, minute), (Second, second)];
        for (level, part) in levels {
            if granularity < level {
                break;
            }
            path.push(part);
        }
        return path;
    }

    let date = format!("{}-{}-{}", year, month, day);
    let name = match granularity {
        Decade => decade,
        Year => year,
        Month => format!("{}-{}", year, month),
        Day => date,
        Hour => format!("{}_{}", date, hour),
        Minute => format!("{}_{}{}", date, hour, minute),
        Second => format!("{}_{}{}{}", date, hour, minute, second),
    };
    PathBuf::from(name)
}
