//! Debounced rebuild coordination
//!
//! Serializes and coalesces rebuild requests for the external stylesheet
//! build step: at most one rebuild process runs at a time, and at most one
//! rebuild is queued behind it.
//!
//! ```text
//!              trigger                 trigger
//!   Idle ─────────────────▶ Building ─────────────▶ BuildingWithPendingRebuild ─┐
//!    ▲                        │  │                      │          ▲  trigger   │
//!    │  completion            │  │ fatal failure        │          └────────────┘
//!    └────────────────────────┘  ▼                      │ completion
//!                             Aborted                   ▼ (relaunch)
//!                                                    Building
//! ```
//!
//! The coordinator is driven from a single control task. Completions arrive
//! through [`RebuildCoordinator::on_completion`], normally forwarded by the
//! [`CompletionNotifier`] given at construction.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::command::{Artifacts, RebuildCommand};
use crate::core::events::{EventSink, NullSink, RebuildEvent};
use crate::core::mode::BuildMode;
use crate::core::runner::{BuildId, CompletionCallback, CompletionNotifier, ProcessRunner};
use crate::error::RebuildError;

/// Observable coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No build running
    Idle,
    /// One build running, nothing queued
    Building,
    /// One build running, one rebuild queued behind it
    BuildingWithPendingRebuild,
    /// A fatal failure ended the session
    Aborted,
}

/// Result of the most recent build attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded { elapsed: Duration },
    Failed { code: i32 },
    /// Process ended without an exit code (killed by a signal)
    Terminated,
    /// Process could not be started
    SpawnFailed,
}

impl BuildOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveBuild {
    id: BuildId,
    started: Instant,
}

/// Mutable coordinator state
///
/// `pending` is only ever set while `active` is set.
#[derive(Debug, Default)]
struct RebuildState {
    active: Option<ActiveBuild>,
    pending: bool,
    aborted: bool,
}

/// Coordinates launches of a single external rebuild step
pub struct RebuildCoordinator<R> {
    runner: R,
    command: RebuildCommand,
    artifacts: Artifacts,
    mode: BuildMode,
    sink: Arc<dyn EventSink>,
    notifier: CompletionNotifier,
    state: RebuildState,
    next_id: u64,
    launches: u64,
    last_outcome: Option<BuildOutcome>,
}

impl<R: ProcessRunner> RebuildCoordinator<R> {
    /// Create an idle coordinator
    pub fn new(runner: R, command: RebuildCommand, artifacts: Artifacts, mode: BuildMode) -> Self {
        Self {
            runner,
            command,
            artifacts,
            mode,
            sink: Arc::new(NullSink),
            notifier: Arc::new(|_, _| {}),
            state: RebuildState::default(),
            next_id: 1,
            launches: 0,
            last_outcome: None,
        }
    }

    /// Report events to `sink`
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Deliver process completions to `notifier`
    #[must_use]
    pub fn with_notifier(mut self, notifier: CompletionNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Request a rebuild
    ///
    /// Launches the rebuild step when idle. While a build runs, the request
    /// is folded into a single pending rebuild. Never blocks and never
    /// reports failure to the caller.
    pub fn trigger(&mut self) {
        if self.state.aborted {
            tracing::debug!("Ignoring trigger after fatal rebuild failure");
            return;
        }

        if let Some(active) = self.state.active {
            if !self.state.pending {
                tracing::debug!("Build {} running, queueing rebuild", active.id);
                self.state.pending = true;
                self.sink.emit(&RebuildEvent::Coalesced);
            }
            return;
        }

        self.state.pending = false;
        self.launch();
        self.debug_check();
    }

    /// Handle termination of a launched build
    ///
    /// Completions for anything other than the active build are ignored.
    /// In production mode a non-zero exit aborts the coordinator and is
    /// returned as an error.
    pub fn on_completion(&mut self, id: BuildId, exit_code: Option<i32>) -> Result<(), RebuildError> {
        let Some(active) = self.state.active.filter(|a| a.id == id) else {
            tracing::debug!("Ignoring completion of inactive build {id}");
            return Ok(());
        };
        self.state.active = None;

        match exit_code {
            Some(0) => {
                let elapsed = active.started.elapsed();
                self.last_outcome = Some(BuildOutcome::Succeeded { elapsed });
                tracing::info!("Build {id} finished in {}ms", elapsed.as_millis());
                self.sink.emit(&RebuildEvent::Succeeded {
                    build: id.0,
                    elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    source: self.artifacts.source.display().to_string(),
                    output: self.artifacts.output.display().to_string(),
                    sourcemap: self
                        .artifacts
                        .sourcemap
                        .as_ref()
                        .map(|p| p.display().to_string()),
                });
            }
            Some(code) => {
                let fatal = self.mode.failures_are_fatal();
                self.last_outcome = Some(BuildOutcome::Failed { code });
                self.sink.emit(&RebuildEvent::Failed {
                    build: id.0,
                    code,
                    fatal,
                });

                if fatal {
                    tracing::error!("Build {id} exited with code {code}, aborting");
                    self.state.aborted = true;
                    self.state.pending = false;
                    return Err(RebuildError::BuildFailed { code });
                }
                tracing::warn!("Build {id} exited with code {code}");
            }
            None => {
                tracing::debug!("Build {id} ended without an exit code");
                self.last_outcome = Some(BuildOutcome::Terminated);
            }
        }

        if self.state.pending {
            self.state.pending = false;
            self.sink.emit(&RebuildEvent::Rebuilding);
            self.trigger();
        }

        self.debug_check();
        Ok(())
    }

    /// Drop a queued rebuild without touching the running build
    pub fn discard_pending(&mut self) {
        if self.state.pending {
            tracing::debug!("Discarding queued rebuild");
            self.state.pending = false;
        }
    }

    fn launch(&mut self) {
        let id = BuildId(self.next_id);
        self.next_id += 1;

        let notifier = Arc::clone(&self.notifier);
        let on_exit: CompletionCallback = Box::new(move |code| notifier(id, code));

        let started = Instant::now();
        match self.runner.launch(&self.command, on_exit) {
            Ok(()) => {
                self.state.active = Some(ActiveBuild { id, started });
                self.launches += 1;
                tracing::info!("Started build {id}: {}", self.command.display());
                self.sink.emit(&RebuildEvent::BuildStarted {
                    build: id.0,
                    command: self.command.display(),
                });
            }
            Err(e) => {
                tracing::warn!("Could not start rebuild: {e}");
                self.last_outcome = Some(BuildOutcome::SpawnFailed);
                self.sink.emit(&RebuildEvent::SpawnFailed {
                    message: e.to_string(),
                });
            }
        }
    }

    fn debug_check(&self) {
        debug_assert!(
            !self.state.pending || self.state.active.is_some(),
            "pending rebuild without an active build"
        );
    }

    /// Current state
    pub fn state(&self) -> CoordinatorState {
        match (&self.state.active, self.state.pending, self.state.aborted) {
            (_, _, true) => CoordinatorState::Aborted,
            (None, _, false) => CoordinatorState::Idle,
            (Some(_), false, false) => CoordinatorState::Building,
            (Some(_), true, false) => CoordinatorState::BuildingWithPendingRebuild,
        }
    }

    /// Id of the running build
    pub fn active_build(&self) -> Option<BuildId> {
        self.state.active.map(|a| a.id)
    }

    /// Whether a rebuild is queued
    pub fn is_pending(&self) -> bool {
        self.state.pending
    }

    /// Result of the most recent finished or failed-to-start build
    pub fn last_outcome(&self) -> Option<BuildOutcome> {
        self.last_outcome
    }

    /// Number of processes launched so far
    pub fn launches(&self) -> u64 {
        self.launches
    }
}
