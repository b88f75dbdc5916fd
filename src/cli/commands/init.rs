//! CLI implementation for `restyle init`

use anyhow::{bail, Context, Result};

use crate::cli::commands::CommandContext;
use crate::cli::output::{print_detail, print_success};
use crate::core::command::RebuildCommand;
use crate::core::config::ProjectConfig;
use crate::core::mode::BuildMode;

/// Execute the init command
pub async fn execute(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = &ctx.config_path;

    if path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }

    let config = ProjectConfig::default();
    config
        .save_to_path(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let command = RebuildCommand::from_config(&config, BuildMode::Development, &ctx.project_dir);

    print_success(&format!("Created {}", path.display()));
    print_detail(&format!("Rebuild command: {}", command.display()));
    print_detail(&format!(
        "Watching: {}",
        config
            .watch
            .files
            .iter()
            .map(|file| file.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    Ok(())
}
