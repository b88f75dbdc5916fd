//! Restyle - debounced global stylesheet rebuilds
//!
//! Runs an external stylesheet build step whenever watched files change,
//! with at most one build running and at most one queued behind it.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Rebuild coordination (no I/O operations)
//! - [`infra`] - Process spawning and file watching
//! - [`config`] - Constants and defaults
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
