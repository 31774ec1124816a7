//! # Undo History Module
//!
//! Durable stack of executed batches, one history file per organized
//! directory.
//!
//! ## Features
//! - Pretty-printed JSON file, loaded lazily on first access
//! - Written back synchronously after every push and pop
//! - Corrupt files degrade to an empty history with a warning
//! - Reads the bare pair-list format written by earlier versions

mod store;
mod types;

pub use store::{HistoryStore, HISTORY_FILE_NAME};
pub(crate) use store::HISTORY_TEMP_FILE_NAME;
pub use types::{Batch, MoveRecord, HISTORY_FORMAT_VERSION};
