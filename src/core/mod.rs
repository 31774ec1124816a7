//! # Core Module
//!
//! The GUI-agnostic organizing engine.
//!
//! ## Modules
//! - `rules` - Parses keyword groups and destination folders
//! - `classify` - Picks a destination folder for one file
//! - `organize` - Scans a directory, plans and executes a batch of moves
//! - `history` - Persists executed batches for undo
//! - `undo` - Reverses the most recent batch
//! - `fs_ops` - The move primitive shared by organize and undo

pub mod classify;
pub mod fs_ops;
pub mod history;
pub mod organize;
pub mod rules;
pub mod undo;

// Re-export commonly used types
pub use classify::{FileEntry, SortMode, TimeGranularity};
pub use history::{Batch, HistoryStore, MoveRecord};
pub use organize::{BatchResult, FileFailure, MovePlanner, OrganizeExecutor, OrganizePlan};
pub use rules::{KeywordRule, KeywordRuleSet};
pub use undo::{UndoEngine, UndoOutcome, UndoResult};
