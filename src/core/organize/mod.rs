//! File organization module.
//!
//! Scans the top level of a directory, plans a destination for every
//! file under the active sort mode, then moves them as one recorded batch.

mod executor;
mod planner;
mod scanner;
mod types;

pub use executor::OrganizeExecutor;
pub use planner::MovePlanner;
pub use scanner::{DirectoryScanner, ScannedDirectory, RESERVED_FILE_NAMES};
pub use types::*;
