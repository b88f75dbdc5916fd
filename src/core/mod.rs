//! Core rebuild logic
//!
//! The coordinator and its session loop know nothing about real processes or
//! the filesystem watcher; those are plugged in from [`crate::infra`].
//!
//! # Submodules
//!
//! - [`coordinator`] - Coalescing rebuild state machine
//! - [`session`] - Event loop that owns the coordinator
//! - [`runner`] - Process runner abstraction
//! - [`command`] - Rebuild command line and artifact paths
//! - [`mode`] - Development/production mode and sourcemap handling
//! - [`config`] - Project configuration (restyle.toml)
//! - [`events`] - Events reported to the user

pub mod command;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod mode;
pub mod runner;
pub mod session;
