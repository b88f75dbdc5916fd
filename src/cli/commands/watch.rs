//! Watch command implementation
//!
//! Implements `restyle watch`: an initial build, then a rebuild whenever one
//! of the watched files changes, until Ctrl+C.

use anyhow::Result;

use crate::cli::commands::{prepare_session, CommandContext};
use crate::core::events::RebuildEvent;
use crate::core::session::TriggerSource;
use crate::infra::watcher::FileWatcher;

/// Execute the watch command
pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let config = ctx.load_config()?;
    let mode = ctx.resolve_mode();

    tracing::info!("Watching global css inputs ({mode})");

    let (session, tx, sink) = prepare_session(ctx, &config, mode);

    // Kept alive for the whole session
    let _watcher = FileWatcher::start(&ctx.project_dir, &config.watch.files, tx.clone())?;

    let shutdown = tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => shutdown.shutdown(),
            Err(e) => tracing::warn!("Cannot listen for Ctrl+C: {e}"),
        }
    });

    sink.emit(&RebuildEvent::WatchStarted {
        files: config
            .watch
            .files
            .iter()
            .map(|file| file.display().to_string())
            .collect(),
    });
    tx.trigger(TriggerSource::Startup);

    session.run().await?;
    Ok(())
}
