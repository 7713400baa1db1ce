// src/core/tasks/rules.rs

//! The rotating-message broadcaster.
//!
//! Emits one line of the rules file at a time, with magic substitutions for
//! live values. The file is re-read on every cycle so an operator can edit
//! it without restarting the daemon.

use crate::config::RulesDisplay;
use crate::core::Daemon;
use crate::core::game::roles::AdminRole;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Delay before the first message after startup.
const INITIAL_DELAY: Duration = Duration::from_secs(30);
/// Floor for the configured frequency; anything lower floods the chat.
const MIN_FREQUENCY: u64 = 5;

pub struct RulesTask {
    daemon: Arc<Daemon>,
}

impl RulesTask {
    pub fn new(daemon: Arc<Daemon>) -> Self {
        RulesTask { daemon }
    }

    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let cfg = self.daemon.config.rules.clone();
        let frequency = Duration::from_secs(cfg.rules_frequency.max(MIN_FREQUENCY));
        info!(
            "rules task started ({}, every {}s)",
            cfg.rules_file,
            frequency.as_secs()
        );

        tokio::select! {
            _ = shutdown_rx.recv() => return,
            _ = tokio::time::sleep(INITIAL_DELAY) => {}
        }

        loop {
            let content = match tokio::fs::read_to_string(&cfg.rules_file).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("cannot read rules file '{}': {e}", cfg.rules_file);
                    tokio::select! {
                        _ = shutdown_rx.recv() => return,
                        _ = tokio::time::sleep(frequency) => continue,
                    }
                }
            };
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                self.display(line, cfg.display);
                tokio::select! {
                    _ = shutdown_rx.recv() => return,
                    _ = tokio::time::sleep(frequency) => {}
                }
            }
        }
    }

    fn display(&self, line: &str, mode: RulesDisplay) {
        if !self.daemon.rcon.is_live() {
            return;
        }
        // `@bigtext <text>` overrides the display mode for one line.
        if let Some(rest) = line.strip_prefix("@bigtext ") {
            let msg = self.substitute(rest);
            self.daemon.rcon.bigtext(&msg);
            return;
        }
        let msg = self.substitute(line);
        match mode {
            RulesDisplay::Chat => self.daemon.rcon.say(&format!("^2{msg}")),
            RulesDisplay::Bigtext => self.daemon.rcon.bigtext(&msg),
            RulesDisplay::Raw => self.daemon.rcon.enqueue(msg),
        }
    }

    /// Replaces the `@admins`, `@admincount`, `@nextmap` and `@time` tokens.
    fn substitute(&self, line: &str) -> String {
        let mut msg = line.to_string();
        if msg.contains("@admins") || msg.contains("@admincount") {
            let game = self.daemon.game.lock();
            let admins: Vec<String> = game
                .players()
                .filter(|p| !p.is_world() && p.admin_role >= AdminRole::Moderator)
                .map(|p| p.name().to_string())
                .collect();
            let listing = if admins.is_empty() {
                "no admins online".to_string()
            } else {
                admins.join(", ")
            };
            msg = msg.replace("@admincount", &admins.len().to_string());
            msg = msg.replace("@admins", &listing);
        }
        if msg.contains("@nextmap") {
            let next = self
                .daemon
                .game
                .lock()
                .next_mapname
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            msg = msg.replace("@nextmap", &next);
        }
        if msg.contains("@time") {
            let time = chrono::Local::now().format("%H:%M").to_string();
            msg = msg.replace("@time", &time);
        }
        msg
    }
}
