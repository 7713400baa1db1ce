// src/core/handlers/connection.rs

//! Client lifecycle: userinfo, team changes, entering the game, leaving.

use crate::core::Daemon;
use crate::core::WardenError;
use crate::core::game::gametype::Team;
use crate::core::game::player::Player;
use crate::core::game::{now_secs, WORLD_SLOT};
use crate::core::geoip::country_label;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Client ports only ever seen on tampered clients.
const CHEAT_PORTS: [&str; 2] = ["1337", "1024"];

/// Handles `ClientUserinfo`: creates or refreshes the slot record, rejects
/// tampered clients and enforces active bans.
pub fn client_userinfo(
    daemon: &Arc<Daemon>,
    slot: u16,
    info: HashMap<String, String>,
) -> Result<(), WardenError> {
    if slot == WORLD_SLOT {
        return Ok(());
    }
    let now = now_secs();
    let mut game = daemon.game.lock();

    let challenge = info.contains_key("challenge");
    let mut kick_invalid = false;

    let guid = match info.get("cl_guid") {
        Some(g) => g.trim().to_string(),
        None if info.contains_key("skill") => format!("BOT{slot}"),
        None => {
            game.rcon.enqueue("Player with invalid GUID kicked");
            kick_invalid = true;
            "None".to_string()
        }
    };
    let name = match info.get("name") {
        Some(n) => n.clone(),
        None => {
            game.rcon.enqueue("Player with invalid name kicked");
            kick_invalid = true;
            "UnnamedPlayer".to_string()
        }
    };
    let ip_port = info
        .get("ip")
        .cloned()
        .unwrap_or_else(|| "0.0.0.0:0".to_string());
    let (address, port) = ip_port
        .split_once(':')
        .map(|(a, p)| (a.trim().to_string(), p.trim().to_string()))
        .unwrap_or((ip_port.clone(), String::new()));

    if kick_invalid {
        game.kick_player(slot, "");
        return Ok(());
    }

    if game.player(slot).is_none() {
        let mut player = Player::new(slot, &address, &guid, &name, now);
        player.authname = info.get("authl").cloned().filter(|a| !a.is_empty());

        // Identity bookkeeping only for real clients.
        if address != "0.0.0.0" {
            let (player_id, aliases) = daemon.db.upsert_player(&guid, player.name(), &address, now)?;
            player.player_id = player_id;
            player.aliases = aliases;
            if let Some(row) = daemon.db.load_xlrstats(&guid, player.name(), now)? {
                player.registered = true;
                player.admin_role = row.admin_role;
                player.first_seen = row.first_seen;
                player.last_visit = row.last_played;
                player.num_played = row.num_played;
                player.db_kills = row.kills;
                player.db_deaths = row.deaths;
                player.db_head_shots = row.headshots;
                player.db_tk_count = row.team_kills;
                player.db_team_death = row.team_death;
                player.db_max_kill_streak = row.max_kill_streak;
                player.db_suicides = row.suicides;
            }
            if let Ok(ip) = address.parse() {
                player.country = daemon.geoip.lookup(ip).map(|c| c.name);
            }
            player.ban_id = daemon.db.active_ban(&guid, &address, now)?.map(|(id, _)| id);
        }

        let display_name = player.name().to_string();
        let ban_id = player.ban_id;
        let country = player.country.clone();
        game.add_player(player);

        if let Some(id) = ban_id {
            game.kick_player(slot, "banned player");
            game.rcon
                .enqueue(format!("^7{display_name} ^1banned ^7(ID @{id})"));
            info!("banned player {display_name} (@{id}) rejected on slot {slot}");
            return Ok(());
        }
        if daemon.config.bot.show_country_on_connect && address != "0.0.0.0" {
            let label = country.as_deref().unwrap_or(country_label(None));
            game.rcon
                .say(&format!("^7{display_name} ^7connected from {label}"));
        }
        if let Some(p) = game.player(slot) {
            if p.admin_role >= crate::core::game::AdminRole::Moderator {
                game.last_admin = Some(display_name);
            }
        }
    }

    // Refresh identity fields on every sighting.
    if let Some(player) = game.player_mut(slot) {
        if player.guid != guid {
            player.guid = guid.clone();
        }
        if player.name() != crate::core::game::names::sanitize(&name) {
            player.set_name(&name);
        }
    }

    // Known cheat client fingerprints.
    let upper = guid.to_uppercase();
    if upper.contains("KEMFEW") {
        game.rcon
            .enqueue(format!("Cheater GUID detected for {name} -> Player kicked"));
        game.kick_player(slot, "");
    } else if upper.contains("WORLD") || upper.contains("UNKNOWN") {
        game.rcon
            .enqueue(format!("Invalid GUID detected for {name} -> Player kicked"));
        game.kick_player(slot, "");
    }
    if challenge && CHEAT_PORTS.contains(&port.as_str()) {
        game.rcon
            .enqueue(format!("Cheater Port detected for {name} -> Player kicked"));
        game.kick_player(slot, "");
    }

    Ok(())
}

/// Handles `ClientUserinfoChanged`: team and name updates, team locks.
pub fn client_userinfo_changed(
    daemon: &Arc<Daemon>,
    slot: u16,
    team_id: Option<u8>,
    name: Option<String>,
) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    let Some(player) = game.player_mut(slot) else {
        return Ok(());
    };
    let team = team_id.and_then(Team::from_id).unwrap_or(Team::Spectator);
    player.team = team;
    if let Some(raw) = name {
        player.set_name(&raw);
    }
    let lock = player.team_lock;
    let display_name = player.name().to_string();

    if let Some(locked) = lock {
        if locked != team {
            game.rcon.force_team(slot, &locked.to_string());
            game.rcon
                .tell(slot, &format!("^3You are forced to: ^7{locked}"), true);
        }
    }
    debug!("player {slot} {display_name} joined team {team}");
    Ok(())
}

/// Handles `ClientBegin`: the one-time welcome.
pub fn client_begin(daemon: &Arc<Daemon>, slot: u16) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    let Some(player) = game.player_mut(slot) else {
        return Ok(());
    };
    if !player.welcome_msg {
        return Ok(());
    }
    let name = player.name().to_string();
    if player.registered {
        let role = player.admin_role;
        let last_visit = player
            .last_visit
            .clone()
            .unwrap_or_else(|| "today".to_string());
        let num_played = player.num_played;
        player.disable_welcome();
        game.rcon.tell(
            slot,
            &format!(
                "^7[^2Authed^7] Welcome back {name}, you are ^2{role}^7, last visit {last_visit}, you played {num_played} times"
            ),
            false,
        );
    } else {
        player.disable_welcome();
        game.rcon.tell(
            slot,
            &format!(
                "^7Welcome {name}, this server is administered. Type ^2!register ^7to save your stats"
            ),
            false,
        );
    }
    info!("player {slot} {name} has entered the game");
    Ok(())
}

/// Handles `ClientDisconnect`: persists aggregates and frees the slot.
pub fn client_disconnect(daemon: &Arc<Daemon>, slot: u16) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    let Some(player) = game.remove_player(slot) else {
        return Ok(());
    };
    if player.registered {
        daemon.db.save_stats(&player.guid, &player.session_totals())?;
    }
    game.last_disconnect = Some(player.name().to_string());
    info!("player {slot} {} has left the game", player.name());
    Ok(())
}

/// Handles `ClientSpawn`: arms the spawn-kill guard.
pub fn client_spawn(daemon: &Arc<Daemon>, slot: u16) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    if let Some(player) = game.player_mut(slot) {
        player.spawned(now_secs());
    }
    Ok(())
}
