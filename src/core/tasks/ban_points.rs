// src/core/tasks/ban_points.rs

//! Periodic purge of expired ban-point rows.

use crate::core::Daemon;
use crate::core::game::now_secs;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const PURGE_INTERVAL: Duration = Duration::from_secs(2 * 3600);

pub struct BanPointsPurgeTask {
    daemon: Arc<Daemon>,
}

impl BanPointsPurgeTask {
    pub fn new(daemon: Arc<Daemon>) -> Self {
        BanPointsPurgeTask { daemon }
    }

    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!("ban-point purge task started (every 2h)");
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup stays quiet.
        interval.tick().await;
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => return,
                _ = interval.tick() => {
                    match self.daemon.db.purge_expired_ban_points(now_secs()) {
                        Ok(purged) if purged > 0 => debug!("purged {purged} expired ban points"),
                        Ok(_) => {}
                        Err(e) => warn!("ban-point purge failed: {e}"),
                    }
                }
            }
        }
    }
}
