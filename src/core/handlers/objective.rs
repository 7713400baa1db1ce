// src/core/handlers/objective.rs

//! Objective events: flags, the bomb lifecycle, freeze tag and the
//! round-end team balance triggers.

use crate::core::Daemon;
use crate::core::WardenError;
use crate::core::announcer::Announce;
use crate::core::game::Game;
use crate::core::game::gametype::Team;
use crate::core::game::modversion::ModVersion;
use crate::core::parser::BombAction;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Settle time between the explosion line and the survivor smite; the
/// server is still resolving the round when `Pop` is logged.
const BOMB_SETTLE: Duration = Duration::from_millis(1300);

pub fn handle_flag(daemon: &Arc<Daemon>, slot: u16, action: u8) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    let Some(player) = game.player_mut(slot) else {
        return Ok(());
    };
    match action {
        1 => {
            player.return_flag();
            debug!("player {slot} returned the flag");
        }
        2 => {
            player.capture_flag(None);
            debug!("player {slot} captured the flag");
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_flag_capture_time(
    daemon: &Arc<Daemon>,
    slot: u16,
    millis: u64,
) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    if let Some(player) = game.player_mut(slot) {
        let secs = millis as f64 / 1000.0;
        if secs < player.fastest_cap_secs {
            player.fastest_cap_secs = secs;
        }
    }
    Ok(())
}

pub fn handle_bomb(
    daemon: &Arc<Daemon>,
    action: BombAction,
    slot: u16,
) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    let rcon = game.rcon.clone();
    let detonation = game.bomb_detonation_secs;
    {
        let Some(player) = game.player_mut(slot) else {
            return Ok(());
        };
        let name = player.name().to_string();
        match action {
            BombAction::Collected | BombAction::Holder => {
                player.bombholder = true;
            }
            BombAction::Tossed => {
                player.bombholder = false;
                rcon.say(&format!("^7{name} ^3tossed the bomb!"));
            }
            BombAction::Planted => {
                player.bomb_planted += 1;
                player.bombholder = false;
                if daemon.announcer.allows(Announce::BOMB_PLANTED) {
                    rcon.say(&format!(
                        "^7{name} ^3planted the bomb! ^1{detonation} ^3seconds to detonation"
                    ));
                }
            }
            BombAction::Defused => {
                player.bomb_defused += 1;
                rcon.say(&format!("^7{name} ^2defused the bomb!"));
            }
        }
    }
    if action == BombAction::Defused {
        // Defense holds: the attacking side lost the round.
        smite_survivors(daemon, &mut game, Team::Red);
        round_end_balance(daemon, &mut game);
    }
    Ok(())
}

/// `Pop`: the bomb exploded. The smite is delayed because the server logs
/// the explosion before the round is resolved.
pub async fn handle_bomb_exploded(daemon: &Arc<Daemon>) -> Result<(), WardenError> {
    debug!("bomb exploded");
    tokio::time::sleep(BOMB_SETTLE).await;
    let mut game = daemon.game.lock();
    smite_survivors(daemon, &mut game, Team::Blue);
    round_end_balance(daemon, &mut game);
    Ok(())
}

pub fn handle_survivor_winner(daemon: &Arc<Daemon>, winner: &str) -> Result<(), WardenError> {
    debug!("round won by {winner}");
    let mut game = daemon.game.lock();
    round_end_balance(daemon, &mut game);
    Ok(())
}

pub fn handle_freeze(daemon: &Arc<Daemon>, slot: u16) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    if let Some(player) = game.player_mut(slot) {
        player.freezes += 1;
    }
    Ok(())
}

pub fn handle_thawout(daemon: &Arc<Daemon>, slot: u16) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    if let Some(player) = game.player_mut(slot) {
        player.thawouts += 1;
    }
    Ok(())
}

/// Smites every living player of `team` when the survived-opponents rule is
/// active. 4.1 servers do not understand `smite`.
fn smite_survivors(daemon: &Daemon, game: &mut Game, team: Team) {
    if !daemon.config.bot.kill_survived_opponents || game.modversion <= ModVersion::V41 {
        return;
    }
    let survivors: Vec<u16> = game
        .players()
        .filter(|p| !p.is_world() && p.team == team && p.alive)
        .map(|p| p.slot())
        .collect();
    for slot in survivors {
        game.rcon.enqueue(format!("smite {slot}"));
    }
}

/// A balance request from chat or policy. Either runs now or, in
/// round-based modes with the round-end deferral, at the end of the round.
pub fn request_team_balance(daemon: &Daemon, game: &mut Game) {
    let (red, blue, _) = game.team_counts();
    if (red as i64 - blue as i64).abs() <= 1 {
        game.rcon.say("^7Teams are already balanced");
        game.pending_team_balance = false;
        return;
    }
    if game.allow_cmd_teams {
        game.balance_teams();
        game.pending_team_balance = false;
    } else if game.gametype.round_based() && daemon.config.bot.allow_teams_round_end {
        game.pending_team_balance = true;
        game.rcon
            .say("^7Teams will be balanced at the end of the round!");
    }
}

/// Round-end hook: the autobalancer and any deferred balance request.
pub fn round_end_balance(daemon: &Daemon, game: &mut Game) {
    if daemon.config.bot.autobalancer {
        let (red, blue, _) = game.team_counts();
        if (red as i64 - blue as i64).abs() > 1 {
            game.balance_teams();
            debug!("autobalancer performed team balance");
        }
        game.pending_team_balance = false;
    }
    if game.pending_team_balance {
        game.allow_cmd_teams = true;
        request_team_balance(daemon, game);
        if daemon.config.bot.allow_teams_round_end {
            game.allow_cmd_teams = false;
        }
    }
}
