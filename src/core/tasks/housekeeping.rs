// src/core/tasks/housekeeping.rs

//! The periodic housekeeping pass: warning expiry, warning kicks, spectator
//! and score checks, and the ping watch.
//!
//! The pass never preempts an event handler; it waits its turn on the
//! players lock like everything else.

use crate::core::Daemon;
use crate::core::game::gametype::Team;
use crate::core::game::now_secs;
use crate::core::game::player::{SPEC_WARNING, WORLD_SLOT};
use crate::core::game::roles::AdminRole;
use crate::core::rcon::StatusPlayer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Grace period after joining before the spectator check applies.
const SPEC_GRACE: f64 = 30.0;
/// Kill/death ratio below which the noob check warns.
const MIN_RATIO: f64 = 0.33;

pub struct HousekeepingTask {
    daemon: Arc<Daemon>,
}

impl HousekeepingTask {
    pub fn new(daemon: Arc<Daemon>) -> Self {
        HousekeepingTask { daemon }
    }

    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let frequency = self.daemon.config.bot.task_frequency.max(10);
        info!("housekeeping task started (every {frequency}s)");
        let mut interval = tokio::time::interval(Duration::from_secs(frequency));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => return,
                _ = interval.tick() => self.pass().await,
            }
        }
    }

    async fn pass(&self) {
        if !self.daemon.rcon.is_live() {
            return;
        }
        // The ping snapshot needs a request/response exchange, so it is
        // fetched before the lock is taken.
        let ping_rows: Vec<StatusPlayer> = if self.daemon.config.bot.max_ping > 0 {
            self.daemon.client.player_status().await.unwrap_or_default()
        } else {
            Vec::new()
        };

        let now = now_secs();
        let cfg = &self.daemon.config.bot;
        let mut game = self.daemon.game.lock();
        let rcon = game.rcon.clone();
        let connected = game.connected_count();
        let warn_expiration = cfg.warn_expiration as f64;

        let slots: Vec<u16> = game
            .players()
            .filter(|p| !p.is_world())
            .map(|p| p.slot())
            .collect();

        for slot in slots {
            let (name, role, warnings, last_warning) = {
                let Some(p) = game.player_mut(slot) else {
                    continue;
                };
                p.expire_warnings(now, warn_expiration);
                (
                    p.name().to_string(),
                    p.admin_role,
                    p.warning_count(),
                    p.warnings.last().cloned(),
                )
            };

            // Too many active warnings: kick, admins excluded.
            if warnings > 2 && role < AdminRole::Admin {
                let reason = last_warning.unwrap_or_else(|| "too many warnings".to_string());
                rcon.say(&format!("^2{name} ^7was kicked, {reason}"));
                game.kick_player(slot, &reason);
                continue;
            }

            // Spectator watch on a full server.
            if cfg.kick_spec_full_server > 0 && !name.starts_with("GTV-") {
                let Some(p) = game.player_mut(slot) else {
                    continue;
                };
                if p.team == Team::Spectator
                    && p.admin_role < AdminRole::Moderator
                    && p.time_joined + SPEC_GRACE < now
                    && connected > cfg.kick_spec_full_server as usize
                    && p.slot() != WORLD_SLOT
                {
                    p.add_warning(SPEC_WARNING, true, now);
                    let count = p.spec_warning_count();
                    rcon.tell(
                        slot,
                        &format!(
                            "^1WARNING ^7[^3{count}^7]: ^7You are spectator too long on full server"
                        ),
                        true,
                    );
                } else if p.team != Team::Spectator {
                    p.clear_specific_warning(SPEC_WARNING);
                }
            }

            // Score watch.
            if cfg.noob_autokick && role < AdminRole::Moderator {
                let Some(p) = game.player_mut(slot) else {
                    continue;
                };
                if p.kills > 0 && p.deaths > 0 {
                    let ratio = p.kills as f64 / p.deaths as f64;
                    if ratio < MIN_RATIO {
                        p.add_warning("score too low", true, now);
                        rcon.tell(slot, "^1WARNING: ^7Your score is too low for this server", true);
                    }
                }
            }

            // Alert shortly before the auto-kick.
            let Some(p) = game.player(slot) else {
                continue;
            };
            if p.warning_count() == 3 && p.admin_role < AdminRole::Admin {
                rcon.say(&format!(
                    "^1ALERT: ^2{name} ^7auto-kick from warnings if not cleared"
                ));
            }
        }

        // Ping watch over the status snapshot.
        let immunity = cfg.admin_immunity;
        for row in ping_rows {
            let Some(slot) = row.slot else {
                continue;
            };
            let Some(p) = game.player_mut(slot) else {
                continue;
            };
            if p.admin_role.level() >= immunity {
                continue;
            }
            if cfg.max_ping < row.ping && row.ping < 999 {
                p.add_high_ping(row.ping);
                let count = p.high_ping_count();
                rcon.tell(
                    slot,
                    &format!(
                        "^1WARNING ^7[^3{count}^7]: ^7Your ping is too high [^4{}^7]. ^3The maximum allowed ping is {}.",
                        row.ping, cfg.max_ping
                    ),
                    true,
                );
            } else {
                p.clear_high_ping();
            }
        }
        debug!("housekeeping pass complete");
    }
}
