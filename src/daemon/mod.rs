// src/daemon/mod.rs

//! Daemon startup and shutdown orchestration.

mod context;
mod spawner;

use crate::config::Config;
use crate::core::tailer::LogTailer;
use anyhow::Result;
use tracing::{error, info};

/// The main entry point, orchestrating all setup phases.
pub async fn run(config: Config) -> Result<()> {
    let log_file = config.server.log_file.clone();

    // 1. Connect the RCON channel, open the store, build the daemon handle.
    let mut ctx = context::setup(config).await?;

    // 2. Spawn all background tasks.
    spawner::spawn_all(&mut ctx);

    // 3. Tail the games log until shutdown. The tailer is the foreground
    //    loop; everything else reacts to what it feeds into the model.
    let tailer = LogTailer::new(ctx.daemon.clone(), log_file);
    let tailer_shutdown = ctx.shutdown_tx.subscribe();
    tokio::select! {
        result = tailer.run(tailer_shutdown) => {
            if let Err(e) = result {
                error!("log tailer failed: {e}");
                ctx.shutdown_tx.send(()).ok();
                drain(ctx).await;
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    // 4. Stop the workers; the dispatcher drains its queue before exiting.
    ctx.shutdown_tx.send(()).ok();
    drain(ctx).await;
    info!("daemon stopped");
    Ok(())
}

/// Waits for every background task; the database handle closes last, when
/// the daemon handle is dropped.
async fn drain(mut ctx: context::DaemonContext) {
    while ctx.background_tasks.join_next().await.is_some() {}
}
