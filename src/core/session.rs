//! Watch session event loop
//!
//! Owns the coordinator and feeds it from one channel. Triggers, file
//! changes and process completions all arrive as [`SessionEvent`]s, so the
//! coordinator is only ever touched from the loop's task.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::core::coordinator::{BuildOutcome, RebuildCoordinator};
use crate::core::events::{EventSink, RebuildEvent};
use crate::core::runner::{BuildId, CompletionNotifier, ProcessRunner};
use crate::error::RebuildError;

/// Why a rebuild was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// Session start
    Startup,
    /// A batch of watched file changes settled
    FileChange,
    /// Explicit request
    Manual,
}

/// Input to the session loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Trigger(TriggerSource),
    FileChanged(PathBuf),
    Completed {
        build: BuildId,
        exit_code: Option<i32>,
    },
    Shutdown,
}

/// Cloneable handle for sending events into a session
#[derive(Debug, Clone)]
pub struct SessionSender {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionSender {
    /// Send an event; dropped silently once the session has ended
    pub fn send(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Session closed, dropping event");
        }
    }

    pub fn trigger(&self, source: TriggerSource) {
        self.send(SessionEvent::Trigger(source));
    }

    pub fn file_changed(&self, path: PathBuf) {
        self.send(SessionEvent::FileChanged(path));
    }

    pub fn shutdown(&self) {
        self.send(SessionEvent::Shutdown);
    }

    /// Completion notifier that routes process exits back into the session
    pub fn notifier(&self) -> CompletionNotifier {
        let tx = self.tx.clone();
        Arc::new(move |build, exit_code| {
            let _ = tx.send(SessionEvent::Completed { build, exit_code });
        })
    }
}

/// Create the channel between event sources and a session
pub fn channel() -> (SessionSender, mpsc::UnboundedReceiver<SessionEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SessionSender { tx }, rx)
}

/// File changes waiting for a quiet period
#[derive(Debug, Default)]
pub struct ChangeBatch {
    paths: BTreeSet<PathBuf>,
    last_change: Option<Instant>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: PathBuf, now: Instant) {
        self.paths.insert(path);
        self.last_change = Some(now);
    }

    /// When the batch settles, if anything is queued
    pub fn deadline(&self, window: Duration) -> Option<Instant> {
        self.last_change
            .filter(|_| !self.paths.is_empty())
            .map(|last| last + window)
    }

    pub fn is_ready(&self, now: Instant, window: Duration) -> bool {
        self.deadline(window).is_some_and(|deadline| now >= deadline)
    }

    /// Unique changed paths, in order
    pub fn take(&mut self) -> Vec<PathBuf> {
        self.last_change = None;
        std::mem::take(&mut self.paths).into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// A rebuild session driven by events
pub struct WatchSession<R> {
    coordinator: RebuildCoordinator<R>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    sink: Arc<dyn EventSink>,
    debounce: Duration,
    batch: ChangeBatch,
    shutting_down: bool,
}

impl<R: ProcessRunner> WatchSession<R> {
    pub fn new(
        coordinator: RebuildCoordinator<R>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        sink: Arc<dyn EventSink>,
        debounce: Duration,
    ) -> Self {
        Self {
            coordinator,
            events,
            sink,
            debounce,
            batch: ChangeBatch::new(),
            shutting_down: false,
        }
    }

    /// Process events until shutdown or a fatal rebuild failure
    ///
    /// On shutdown a running build is awaited, a queued rebuild is not.
    pub async fn run(mut self) -> Result<(), RebuildError> {
        loop {
            let deadline = self.batch.deadline(self.debounce);

            let event = tokio::select! {
                event = self.events.recv() => event,
                () = sleep_until(deadline) => {
                    self.flush_changes();
                    continue;
                }
            };

            let Some(event) = event else {
                tracing::debug!("All event sources closed");
                break;
            };

            self.handle(event)?;

            if self.shutting_down && self.coordinator.active_build().is_none() {
                break;
            }
        }

        self.sink.emit(&RebuildEvent::Shutdown);
        Ok(())
    }

    /// Run a single rebuild and wait for it
    ///
    /// Returns the outcome, or the error in production mode.
    pub async fn run_once(mut self) -> Result<Option<BuildOutcome>, RebuildError> {
        self.coordinator.trigger();

        while self.coordinator.active_build().is_some() {
            match self.events.recv().await {
                Some(SessionEvent::Completed { build, exit_code }) => {
                    self.coordinator.on_completion(build, exit_code)?;
                }
                Some(other) => tracing::debug!("Ignoring {other:?} during single build"),
                None => break,
            }
        }

        Ok(self.coordinator.last_outcome())
    }

    fn handle(&mut self, event: SessionEvent) -> Result<(), RebuildError> {
        match event {
            SessionEvent::Trigger(source) => {
                if self.shutting_down {
                    return Ok(());
                }
                tracing::debug!("Trigger from {source:?}");
                self.coordinator.trigger();
            }
            SessionEvent::FileChanged(path) => {
                if !self.shutting_down {
                    tracing::debug!("Changed: {}", path.display());
                    self.batch.add(path, Instant::now());
                }
            }
            SessionEvent::Completed { build, exit_code } => {
                self.coordinator.on_completion(build, exit_code)?;
            }
            SessionEvent::Shutdown => {
                tracing::info!("Shutting down watch session");
                self.shutting_down = true;
                self.batch.take();
                self.coordinator.discard_pending();
            }
        }
        Ok(())
    }

    fn flush_changes(&mut self) {
        let changed = self.batch.take();
        if changed.is_empty() {
            return;
        }
        for path in &changed {
            self.sink.emit(&RebuildEvent::FileChanged {
                path: path.display().to_string(),
            });
        }
        self.coordinator.trigger();
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
