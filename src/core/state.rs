// src/core/state.rs

//! The central daemon handle.
//!
//! One `Daemon` instance owns the game model (behind the process-wide
//! players lock), the persistence gateway, the RCON enqueue handle and the
//! request/response client. Every component receives the handle at
//! construction; nothing in the crate reaches for global state.

use crate::config::Config;
use crate::core::announcer::Announcer;
use crate::core::db::{BanOutcome, Db};
use crate::core::game::Game;
use crate::core::game::player::Player;
use crate::core::geoip::CountryResolver;
use crate::core::rcon::{RconClient, RconHandle};
use crate::core::WardenError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct Daemon {
    pub config: Config,
    pub announcer: Announcer,
    /// The players lock. Every event handler, command handler and periodic
    /// task acquires it before touching the game model.
    pub game: Mutex<Game>,
    pub db: Db,
    pub rcon: RconHandle,
    pub client: Arc<RconClient>,
    pub geoip: Box<dyn CountryResolver>,
    /// `!iamgod` stays armed only while no head admin exists.
    iamgod_armed: AtomicBool,
    /// Runtime switch for treating bots like human victims (`!bots`).
    bots_enabled: AtomicBool,
}

impl Daemon {
    pub fn new(
        config: Config,
        db: Db,
        rcon: RconHandle,
        client: Arc<RconClient>,
        geoip: Box<dyn CountryResolver>,
    ) -> Result<Arc<Self>, WardenError> {
        let announcer = Announcer::from_config(&config.bot);
        let iamgod = !db.has_head_admin()?;
        let allow_bots = config.bot.allow_bots;
        let game = Game::new(rcon.clone());
        Ok(Arc::new(Daemon {
            config,
            announcer,
            game: Mutex::new(game),
            db,
            rcon,
            client,
            geoip,
            iamgod_armed: AtomicBool::new(iamgod),
            bots_enabled: AtomicBool::new(allow_bots),
        }))
    }

    pub fn iamgod_armed(&self) -> bool {
        self.iamgod_armed.load(Ordering::Acquire)
    }

    pub fn disarm_iamgod(&self) {
        self.iamgod_armed.store(false, Ordering::Release);
    }

    pub fn bots_enabled(&self) -> bool {
        self.bots_enabled.load(Ordering::Acquire)
    }

    pub fn set_bots_enabled(&self, enabled: bool) {
        self.bots_enabled.store(enabled, Ordering::Release);
    }

    /// Bans a player, composing the stored reason with the acting admin.
    pub fn ban_player(
        &self,
        player: &Player,
        duration_secs: u64,
        reason: &str,
        admin: Option<&str>,
        now: f64,
    ) -> Result<BanOutcome, WardenError> {
        let reason = match admin {
            Some(name) => format!("{reason}, ban by {name}"),
            None => reason.to_string(),
        };
        self.db.ban(
            &player.guid,
            player.name(),
            &player.address,
            duration_secs,
            &reason,
            now,
        )
    }
}
