//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no rebuild logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::defaults;
use crate::core::mode::BuildMode;
use commands::{CommandContext, Commands};

/// Restyle - debounced global stylesheet rebuilds
///
/// Runs the project's global CSS build step once, or on every change to the
/// watched files.
#[derive(Parser, Debug)]
#[command(name = "restyle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Project configuration file
    #[arg(long, global = true, default_value = defaults::CONFIG_FILE)]
    pub config: PathBuf,

    /// Build mode (defaults to development when NODE_ENV=development)
    #[arg(long, global = true, value_enum, env = defaults::ENV_MODE)]
    pub mode: Option<BuildMode>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(cmd) = self.command {
            let project_dir = std::env::current_dir()?;
            let ctx = CommandContext {
                config_path: project_dir.join(&self.config),
                project_dir,
                mode: self.mode,
            };
            cmd.run(&ctx).await
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
