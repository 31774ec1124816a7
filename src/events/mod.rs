//! # Events Module
//!
//! Progress and completion events for organize and undo runs.
//!
//! ## Design
//! The worker emits events through a channel so any presentation layer
//! (terminal, window) can show progress without sharing state with it.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let mut session = Session::new(sender)?;
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Organize(OrganizeEvent::Progress(p)) = event {
//!             println!("{:.0}%", p.percent());
//!         }
//!     }
//! });
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
