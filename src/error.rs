//! Error types for restyle
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: PathBuf, error: String },

    /// Failed to write config file
    #[error("Failed to write config file '{path}': {error}")]
    WriteError { path: PathBuf, error: String },

    /// Invalid value in an otherwise well-formed config
    #[error("Invalid configuration: {field} {message}")]
    Invalid { field: String, message: String },

    /// Invalid sourcemap mode value
    #[error("Invalid sourcemap mode '{value}': expected true, false or \"inline\"")]
    InvalidSourcemap { value: String },
}

/// Errors raised while launching the external rebuild process
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The process could not be started
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

/// Errors surfaced by the rebuild coordinator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RebuildError {
    /// Rebuild step exited with a non-zero code in production mode
    #[error("global css builder exited with code {code}")]
    BuildFailed { code: i32 },
}

/// Top-level restyle error type
#[derive(Error, Debug)]
pub enum RestyleError {
    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Runner error
    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    /// Rebuild error
    #[error(transparent)]
    Rebuild(#[from] RebuildError),

    /// File watcher error
    #[error("Watch error: {0}")]
    Watch(String),

    /// IO error
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
