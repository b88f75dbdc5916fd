//! Process runner capability
//!
//! The coordinator never spawns processes itself. It hands a
//! [`RebuildCommand`] and a completion callback to a [`ProcessRunner`]; the
//! runner calls back exactly once when the process terminates.

use std::fmt;
use std::sync::Arc;

use crate::core::command::RebuildCommand;
use crate::error::RunnerError;

/// Identifier of a launched build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildId(pub u64);

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Called once with the exit code, `None` if the process had no exit code
pub type CompletionCallback = Box<dyn FnOnce(Option<i32>) + Send + 'static>;

/// Delivers completions back to whoever owns the coordinator
pub type CompletionNotifier = Arc<dyn Fn(BuildId, Option<i32>) + Send + Sync + 'static>;

/// Launches rebuild processes
pub trait ProcessRunner {
    /// Start `command` without blocking
    ///
    /// On `Ok`, `on_exit` must eventually be invoked exactly once. On `Err`,
    /// it must never be invoked.
    fn launch(
        &mut self,
        command: &RebuildCommand,
        on_exit: CompletionCallback,
    ) -> Result<(), RunnerError>;
}
