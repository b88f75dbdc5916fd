//! Build command implementation
//!
//! Implements `restyle build`: one rebuild, reported like a watch session
//! build. Exits non-zero unless the rebuild step succeeded.

use anyhow::{bail, Result};

use crate::cli::commands::{prepare_session, CommandContext};
use crate::core::coordinator::BuildOutcome;

/// Execute the build command
pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let config = ctx.load_config()?;
    let mode = ctx.resolve_mode();

    tracing::info!("Building global css ({mode})");

    let (session, _tx, _sink) = prepare_session(ctx, &config, mode);

    // Production failures come back as the error itself
    match session.run_once().await? {
        Some(BuildOutcome::Succeeded { .. }) => Ok(()),
        Some(BuildOutcome::Failed { .. }) => bail!("global css build failed"),
        Some(BuildOutcome::Terminated) => {
            bail!("global css builder was terminated before it exited")
        }
        Some(BuildOutcome::SpawnFailed) => {
            bail!("Could not start '{}'", config.rebuild.program)
        }
        None => bail!("No build was run"),
    }
}
