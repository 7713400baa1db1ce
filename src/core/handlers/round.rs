// src/core/handlers/round.rs

//! Match lifecycle: `InitGame`, warmup, round starts, match exit with the
//! awards ceremony, and vote bookkeeping.

use crate::core::Daemon;
use crate::core::WardenError;
use crate::core::game::Gametype;
use crate::core::handlers::objective::round_end_balance;
use crate::core::parser::InitInfo;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Grace period for the server to finish loading the next map before the
/// daemon queries it.
const MAP_LOAD_GRACE: Duration = Duration::from_secs(4);

/// Applies an `InitGame` snapshot, resets match state and refreshes the map
/// rotation from the server.
pub async fn init_game(daemon: &Arc<Daemon>, info: InitInfo) -> Result<(), WardenError> {
    {
        let mut game = daemon.game.lock();
        game.rcon.clear();
        if let Some(gt) = info.gametype {
            game.gametype = gt;
        }
        if let Some(mv) = info.modversion {
            game.modversion = mv;
        }
        if let Some(gear) = info.gear.clone() {
            game.default_gear = gear;
        }
        let reset_headshots = daemon.config.bot.reset_headshot_hits_mapcycle;
        let reset_streak = daemon.config.bot.reset_kill_spree_mapcycle;
        for player in game.players_mut() {
            player.reset_match(reset_headshots, reset_streak);
        }
        game.firstblood = true;
        game.first_nade_kill = true;
        game.first_knife_kill = true;
        game.first_teamkill = true;
        game.allow_cmd_teams = true;
        game.pending_team_balance = false;

        // Dynamic rotation: small cycle until the server fills up.
        let mc = &daemon.config.mapcycle;
        if mc.dynamic_mapcycle {
            let cycle = if game.connected_count() > mc.switch_count as usize {
                &mc.big_cycle
            } else {
                &mc.small_cycle
            };
            game.maplist = cycle.split_whitespace().map(str::to_string).collect();
        }
        info!(
            "starting game: gametype {} on modversion {}",
            game.gametype, game.modversion
        );
    }

    if !daemon.rcon.is_live() {
        // Still replaying the backlog; the live refresh happens at go-live.
        return Ok(());
    }

    // Off-lock: the server needs a moment to load the map before it
    // answers queries about it.
    tokio::time::sleep(MAP_LOAD_GRACE).await;
    let reported = daemon.client.cvar("mapname").await.ok();
    let bomb_time = if info.gametype == Some(Gametype::Bomb) {
        daemon
            .client
            .cvar("g_bombexplodetime")
            .await
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
    } else {
        None
    };

    let mut game = daemon.game.lock();
    game.set_current_map(reported);
    if let Some(secs) = bomb_time {
        game.bomb_detonation_secs = secs;
    }
    if daemon.config.lowgrav.support_lowgravity {
        game.rcon
            .enqueue(format!("set g_gravity {}", daemon.config.lowgrav.gravity));
    }
    Ok(())
}

pub fn warmup(daemon: &Arc<Daemon>) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    let reset_headshots = daemon.config.bot.reset_headshot_hits_mapcycle;
    let reset_streak = daemon.config.bot.reset_kill_spree_mapcycle;
    for player in game.players_mut() {
        player.reset_match(reset_headshots, reset_streak);
    }
    game.allow_cmd_teams = true;
    round_end_balance(daemon, &mut game);
    Ok(())
}

pub fn init_round(daemon: &Arc<Daemon>) -> Result<(), WardenError> {
    debug!("round started");
    let mut game = daemon.game.lock();
    match game.gametype {
        Gametype::Ctf => {
            for player in game.players_mut() {
                player.reset_flag_stats();
            }
        }
        gt if gt.round_based() => {
            if daemon.config.bot.allow_teams_round_end {
                game.allow_cmd_teams = false;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Match over: awards, personal stat lines, score flush, session reset.
pub fn exit(daemon: &Arc<Daemon>) -> Result<(), WardenError> {
    info!("match ended");
    let mut game = daemon.game.lock();
    let rcon = game.rcon.clone();
    let freeze_mode = game.gametype == Gametype::FreezeTag;

    // Personal stat lines; spectators are skipped.
    for player in game.players() {
        if player.is_world() || player.team == crate::core::game::Team::Spectator {
            continue;
        }
        let name = player.name();
        let line = if freeze_mode {
            format!(
                "^7Stats {name}: ^7F ^2{} ^7T ^3{} ^7HS ^1{} ^7TK ^1{}",
                player.freezes, player.thawouts, player.head_shots, player.tk_count
            )
        } else {
            format!(
                "^7Stats {name}: ^7K ^2{} ^7D ^3{} ^7HS ^1{} ^7TK ^1{}",
                player.kills, player.deaths, player.head_shots, player.tk_count
            )
        };
        rcon.tell(player.slot(), &line, true);
    }

    announce_awards(&game);

    let mut flush_failure = None;
    for player in game.players_mut() {
        if player.registered {
            if let Err(e) = daemon.db.save_stats(&player.guid, &player.session_totals()) {
                flush_failure.get_or_insert(e);
            }
        }
        player.reset_match(true, true);
    }
    game.allow_cmd_teams = true;
    match flush_failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

pub fn shutdown_game(daemon: &Arc<Daemon>) -> Result<(), WardenError> {
    debug!("shutting down game");
    daemon.rcon.clear();
    Ok(())
}

pub fn callvote(daemon: &Arc<Daemon>, slot: u16, text: &str) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    let caller = game
        .player(slot)
        .map(|p| p.name().to_string())
        .unwrap_or_else(|| format!("slot {slot}"));
    game.last_vote = Some(format!("{} (called by {caller})", text.trim_matches('"')));
    Ok(())
}

pub fn vote_passed(_daemon: &Arc<Daemon>) -> Result<(), WardenError> {
    debug!("vote passed");
    Ok(())
}

pub fn vote_failed(_daemon: &Arc<Daemon>) -> Result<(), WardenError> {
    debug!("vote failed");
    Ok(())
}

/// One category per award, shown only when somebody actually earned it.
fn announce_awards(game: &crate::core::game::Game) {
    let rcon = game.rcon.clone();

    struct Best<'a> {
        value: u32,
        name: &'a str,
    }
    let mut caps = Best { value: 0, name: "" };
    let mut planted = Best { value: 0, name: "" };
    let mut defused = Best { value: 0, name: "" };
    let mut freezes = Best { value: 0, name: "" };
    let mut thaws = Best { value: 0, name: "" };
    let mut kills = Best { value: 0, name: "" };
    let mut streaks = Best { value: 0, name: "" };
    let mut heads = Best { value: 0, name: "" };
    let mut he = Best { value: 0, name: "" };
    let mut knife = Best { value: 0, name: "" };
    let mut returns = Best { value: 0, name: "" };
    let mut fastest = f64::MAX;
    let mut fastest_name = "";

    for p in game.players() {
        if p.is_world() {
            continue;
        }
        let n = p.name();
        if p.flags_captured > caps.value {
            caps = Best { value: p.flags_captured, name: n };
        }
        if p.bomb_planted > planted.value {
            planted = Best { value: p.bomb_planted, name: n };
        }
        if p.bomb_defused > defused.value {
            defused = Best { value: p.bomb_defused, name: n };
        }
        if p.freezes > freezes.value {
            freezes = Best { value: p.freezes, name: n };
        }
        if p.thawouts > thaws.value {
            thaws = Best { value: p.thawouts, name: n };
        }
        if p.kills > kills.value {
            kills = Best { value: p.kills, name: n };
        }
        if p.max_kill_streak > streaks.value {
            streaks = Best { value: p.max_kill_streak, name: n };
        }
        if p.head_shots > heads.value {
            heads = Best { value: p.head_shots, name: n };
        }
        if p.he_kills > he.value {
            he = Best { value: p.he_kills, name: n };
        }
        if p.knife_kills > knife.value {
            knife = Best { value: p.knife_kills, name: n };
        }
        if p.flags_returned > returns.value {
            returns = Best { value: p.flags_returned, name: n };
        }
        if p.fastest_cap_secs < fastest {
            fastest = p.fastest_cap_secs;
            fastest_name = n;
        }
    }

    let mut parts: Vec<String> = Vec::new();
    if caps.value > 1 {
        parts.push(format!("^7{}: ^2{} ^4caps", caps.name, caps.value));
    }
    if planted.value > 1 {
        parts.push(format!("^7{}: ^2{} ^5planted", planted.name, planted.value));
    }
    if defused.value > 1 {
        parts.push(format!("^7{}: ^2{} ^4defused", defused.name, defused.value));
    }
    if freezes.value > 1 {
        parts.push(format!("^7{}: ^2{} ^3freezes", freezes.name, freezes.value));
    }
    if thaws.value > 1 {
        parts.push(format!("^7{}: ^2{} ^4thaws", thaws.name, thaws.value));
    }
    if kills.value > 1 {
        parts.push(format!("^7{}: ^2{} ^3kills", kills.name, kills.value));
    }
    if streaks.value > 1 {
        parts.push(format!("^7{}: ^2{} ^6streaks", streaks.name, streaks.value));
    }
    if heads.value > 1 {
        parts.push(format!("^7{}: ^2{} ^1heads", heads.name, heads.value));
    }
    if he.value > 1 {
        parts.push(format!("^7{}: ^2{} ^2HE kills", he.name, he.value));
    }
    if knife.value > 1 {
        parts.push(format!("^7{}: ^2{} ^7knife kills", knife.name, knife.value));
    }
    if returns.value > 1 {
        parts.push(format!("^7{}: ^2{} ^4returns", returns.name, returns.value));
    }
    if fastest < crate::core::game::player::NO_CAPTURE_TIME {
        parts.push(format!("^7{fastest_name}: ^2{fastest:.2} ^4sec fastest cap"));
    }
    if !parts.is_empty() {
        rcon.say(&format!("^1AWARDS: {}", parts.join(" ^7- ")));
    }
}
