// src/daemon/context.rs

//! Phase one of startup: external resources and the daemon handle.

use crate::config::Config;
use crate::core::Daemon;
use crate::core::WardenError;
use crate::core::db::Db;
use crate::core::geoip::NoGeoIp;
use crate::core::rcon::{RconClient, RconHandle};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Path of the embedded store, next to the working directory like the rest
/// of the deployment files.
const DB_PATH: &str = "./data.sqlite";

pub struct DaemonContext {
    pub daemon: Arc<Daemon>,
    pub shutdown_tx: broadcast::Sender<()>,
    pub background_tasks: JoinSet<()>,
}

pub async fn setup(config: Config) -> Result<DaemonContext> {
    let client = Arc::new(
        RconClient::connect(&config.rcon_addr(), &config.server.rcon_password)
            .await
            .context("cannot open the RCON socket")?,
    );

    // Probe the RCON credentials once. A wrong password is fatal here; an
    // unreachable server is not, the daemon keeps polling the log.
    match client.rcon("status").await {
        Ok(_) => info!("RCON connection to {} verified", config.rcon_addr()),
        Err(WardenError::RconAuth(reason)) => {
            anyhow::bail!("RCON authentication failed: {reason}");
        }
        Err(e) => warn!("game server not answering yet: {e}"),
    }

    let db = Db::open(DB_PATH).context("cannot open the player database")?;
    info!("connected to database '{DB_PATH}'");

    let rcon = RconHandle::new();
    let daemon = Daemon::new(config, db, rcon, client, Box::new(NoGeoIp))?;
    let (shutdown_tx, _) = broadcast::channel(4);

    Ok(DaemonContext {
        daemon,
        shutdown_tx,
        background_tasks: JoinSet::new(),
    })
}
