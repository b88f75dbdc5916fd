//! Check command implementation
//!
//! Implements `restyle check` to validate configuration without building.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::cli::commands::CommandContext;
use crate::cli::output::{is_json, print_info, print_success, print_warning, status};
use crate::core::command::{Artifacts, RebuildCommand};
use crate::core::config::ProjectConfig;
use crate::core::mode::BuildMode;

/// Result of checking a project
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckReport {
    pub config: String,
    pub config_found: bool,
    pub mode: String,
    pub command: String,
    /// Resolved program location, if found
    pub program: Option<String>,
    pub source: String,
    pub source_exists: bool,
    pub output: String,
    pub sourcemap: Option<String>,
    pub missing_watch_files: Vec<String>,
}

impl CheckReport {
    /// Whether a build could run
    pub fn is_ok(&self) -> bool {
        self.program.is_some() && self.source_exists
    }
}

/// Inspect a loaded configuration
pub fn inspect(ctx: &CommandContext, config: &ProjectConfig, mode: BuildMode) -> CheckReport {
    let command = RebuildCommand::from_config(config, mode, &ctx.project_dir);
    let artifacts = Artifacts::from_config(config, mode);

    let program = which::which_in(
        &command.program,
        std::env::var_os("PATH"),
        &ctx.project_dir,
    )
    .ok()
    .map(|path| path.display().to_string());

    let missing_watch_files = config
        .watch
        .files
        .iter()
        .filter(|file| !ctx.project_dir.join(file).exists())
        .map(|file| file.display().to_string())
        .collect();

    CheckReport {
        config: ctx.config_path.display().to_string(),
        config_found: ctx.config_path.exists(),
        mode: mode.to_string(),
        command: command.display(),
        program,
        source: artifacts.source.display().to_string(),
        source_exists: ctx.project_dir.join(&artifacts.source).exists(),
        output: artifacts.output.display().to_string(),
        sourcemap: artifacts.sourcemap.map(|map| map.display().to_string()),
        missing_watch_files,
    }
}

/// Execute the check command
pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let config = ctx.load_config()?;
    let mode = ctx.resolve_mode();

    tracing::info!("Checking {}", ctx.config_path.display());

    let report = inspect(ctx, &config, mode);

    if is_json() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_report(&report);
    }

    if !report.is_ok() {
        bail!("Check failed");
    }
    Ok(())
}

fn display_report(report: &CheckReport) {
    if report.config_found {
        print_success(&format!("Configuration is valid ({})", report.config));
    } else {
        print_info(&format!("No {} found, using defaults", report.config));
    }
    print_info(&format!("Mode: {}", report.mode));
    print_info(&format!("Command: {}", report.command));

    match &report.program {
        Some(path) => print_success(&format!("Found program at {path}")),
        None => eprintln!(
            "{} Program not found: {}",
            status::ERROR,
            report.command.split(' ').next().unwrap_or_default()
        ),
    }

    if report.source_exists {
        print_success(&format!("Source stylesheet {}", report.source));
    } else {
        eprintln!("{} Source stylesheet missing: {}", status::ERROR, report.source);
    }

    for file in &report.missing_watch_files {
        print_warning(&format!("Watch file does not exist yet: {file}"));
    }
}
