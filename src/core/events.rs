//! Rebuild events
//!
//! Everything the coordinator and the watch session report goes through an
//! [`EventSink`]. The CLI renders events for humans or as NDJSON.

use serde::Serialize;

/// Events reported during a build or watch session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RebuildEvent {
    WatchStarted {
        files: Vec<String>,
    },
    FileChanged {
        path: String,
    },
    BuildStarted {
        build: u64,
        command: String,
    },
    Succeeded {
        build: u64,
        elapsed_ms: u64,
        source: String,
        output: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        sourcemap: Option<String>,
    },
    Failed {
        build: u64,
        code: i32,
        fatal: bool,
    },
    SpawnFailed {
        message: String,
    },
    /// A trigger arrived while a build was running
    Coalesced,
    /// A coalesced trigger is being served
    Rebuilding,
    Shutdown,
}

impl RebuildEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Receiver of rebuild events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &RebuildEvent);
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &RebuildEvent) {}
}
