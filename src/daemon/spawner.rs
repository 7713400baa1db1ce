// src/daemon/spawner.rs

//! Phase two of startup: spawn the long-lived background workers.

use super::context::DaemonContext;
use crate::core::rcon::RconDispatcher;
use crate::core::tasks::ban_points::BanPointsPurgeTask;
use crate::core::tasks::housekeeping::HousekeepingTask;
use crate::core::tasks::rules::RulesTask;
use std::time::Duration;
use tracing::info;

pub fn spawn_all(ctx: &mut DaemonContext) {
    let daemon = &ctx.daemon;

    // --- RCON dispatcher ---
    let delay = Duration::from_secs_f64(daemon.config.server.rcon_delay);
    let dispatcher = RconDispatcher::new(daemon.rcon.clone(), daemon.client.clone(), delay);
    let shutdown_rx = ctx.shutdown_tx.subscribe();
    ctx.background_tasks.spawn(async move {
        dispatcher.run(shutdown_rx).await;
    });

    // --- Housekeeping ---
    let housekeeping = HousekeepingTask::new(daemon.clone());
    let shutdown_rx = ctx.shutdown_tx.subscribe();
    ctx.background_tasks.spawn(async move {
        housekeeping.run(shutdown_rx).await;
    });

    // --- Ban-point purge ---
    let purge = BanPointsPurgeTask::new(daemon.clone());
    let shutdown_rx = ctx.shutdown_tx.subscribe();
    ctx.background_tasks.spawn(async move {
        purge.run(shutdown_rx).await;
    });

    // --- Rotating messages ---
    if daemon.config.rules.show_rules {
        let rules = RulesTask::new(daemon.clone());
        let shutdown_rx = ctx.shutdown_tx.subscribe();
        ctx.background_tasks.spawn(async move {
            rules.run(shutdown_rx).await;
        });
    } else {
        info!("rotating messages are disabled in the configuration");
    }
}
