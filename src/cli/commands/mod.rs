//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod check;
pub mod init;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::cli::output::{event_sink, OutputConfig};
use crate::config::defaults;
use crate::core::command::{Artifacts, RebuildCommand};
use crate::core::config::ProjectConfig;
use crate::core::coordinator::RebuildCoordinator;
use crate::core::events::EventSink;
use crate::core::mode::BuildMode;
use crate::core::session::{self, SessionSender, WatchSession};
use crate::infra::process::{OutputForwarding, TokioProcessRunner};

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default restyle.toml
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Rebuild the global stylesheet once
    Build,

    /// Rebuild on startup and whenever a watched file changes
    Watch,

    /// Validate configuration without building
    Check,
}

/// Settings shared by all commands
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Directory the rebuild step runs in
    pub project_dir: PathBuf,
    /// Resolved configuration file path
    pub config_path: PathBuf,
    /// Mode given on the command line or in `RESTYLE_MODE`
    pub mode: Option<BuildMode>,
}

impl CommandContext {
    /// Load the project configuration, or the defaults if there is none
    pub fn load_config(&self) -> Result<ProjectConfig> {
        ProjectConfig::load_from_path(&self.config_path)
            .with_context(|| format!("Failed to load {}", self.config_path.display()))
    }

    /// Build mode, falling back to `NODE_ENV`
    pub fn resolve_mode(&self) -> BuildMode {
        let node_env = std::env::var(defaults::ENV_NODE_ENV).ok();
        BuildMode::resolve(self.mode, node_env.as_deref())
    }
}

impl Commands {
    /// Execute the command
    pub async fn run(self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Init { force } => init::execute(ctx, force).await,
            Self::Build => build::execute(ctx).await,
            Self::Watch => watch::execute(ctx).await,
            Self::Check => check::execute(ctx).await,
        }
    }
}

/// Wire a session to a real process runner and the global output
pub(crate) fn prepare_session(
    ctx: &CommandContext,
    config: &ProjectConfig,
    mode: BuildMode,
) -> (
    WatchSession<TokioProcessRunner>,
    SessionSender,
    Arc<dyn EventSink>,
) {
    let output = OutputConfig::current();
    let runner = TokioProcessRunner::new(OutputForwarding::for_output(output.quiet, output.json));
    let sink = event_sink();
    let (tx, rx) = session::channel();

    let command = RebuildCommand::from_config(config, mode, &ctx.project_dir);
    let artifacts = Artifacts::from_config(config, mode);
    tracing::debug!("Rebuild command: {}", command.display());

    let coordinator = RebuildCoordinator::new(runner, command, artifacts, mode)
        .with_sink(Arc::clone(&sink))
        .with_notifier(tx.notifier());

    let session = WatchSession::new(
        coordinator,
        rx,
        Arc::clone(&sink),
        Duration::from_millis(config.watch.debounce_ms),
    );

    (session, tx, sink)
}
