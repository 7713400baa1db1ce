// src/core/handlers/mod.rs

//! Event handlers: the glue between decoded log events and the game model.
//!
//! Each handler acquires the players lock, commits its mutations and
//! enqueues any outbound RCON commands before the next line is read. A
//! handler failure is logged and dropped; the pipeline never dies on one
//! event (database errors abort the handler's remaining work only).

mod connection;
mod hit;
mod kill;
pub(crate) mod objective;
mod round;
mod say;

use crate::core::Daemon;
use crate::core::parser::Event;
use std::sync::Arc;
use tracing::{debug, warn};

/// Dispatches one event to its handler.
pub async fn handle_event(daemon: &Arc<Daemon>, event: Event) {
    let result = match event {
        Event::InitGame(info) => round::init_game(daemon, info).await,
        Event::Warmup => round::warmup(daemon),
        Event::InitRound => round::init_round(daemon),
        Event::Exit => round::exit(daemon),
        Event::ShutdownGame => round::shutdown_game(daemon),
        Event::ClientUserinfo { slot, info } => connection::client_userinfo(daemon, slot, info),
        Event::ClientUserinfoChanged {
            slot,
            team_id,
            name,
        } => connection::client_userinfo_changed(daemon, slot, team_id, name),
        Event::ClientBegin { slot } => connection::client_begin(daemon, slot),
        Event::ClientDisconnect { slot } => connection::client_disconnect(daemon, slot),
        Event::ClientSpawn { slot } => connection::client_spawn(daemon, slot),
        Event::Kill {
            killer,
            victim,
            cause_id,
            world_kill,
        } => kill::handle_kill(daemon, killer, victim, cause_id, world_kill),
        Event::Hit {
            victim,
            hitter,
            zone_id,
            weapon_id,
        } => hit::handle_hit(daemon, victim, hitter, zone_id, weapon_id),
        Event::Flag { slot, action } => objective::handle_flag(daemon, slot, action),
        Event::FlagCaptureTime { slot, millis } => {
            objective::handle_flag_capture_time(daemon, slot, millis)
        }
        Event::Bomb { action, slot } => objective::handle_bomb(daemon, action, slot),
        Event::Pop => objective::handle_bomb_exploded(daemon).await,
        Event::SurvivorWinner(winner) => objective::handle_survivor_winner(daemon, &winner),
        Event::Freeze { slot } => objective::handle_freeze(daemon, slot),
        Event::ThawOutFinished { slot } => objective::handle_thawout(daemon, slot),
        Event::Say { slot, name, text } => say::handle_say(daemon, slot, &name, &text),
        Event::SayTeam { slot, name, text } => say::handle_say(daemon, slot, &name, &text),
        Event::Callvote { slot, text } => round::callvote(daemon, slot, &text),
        Event::VotePassed => round::vote_passed(daemon),
        Event::VoteFailed => round::vote_failed(daemon),
    };

    if let Err(e) = result {
        match e {
            crate::core::WardenError::Db(_) => warn!("handler aborted on database error: {e}"),
            _ => debug!("event handler error: {e}"),
        }
    }
}
