//! Infrastructure layer
//!
//! Child processes and filesystem notifications.

pub mod process;
pub mod watcher;
