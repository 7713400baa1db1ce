// src/core/handlers/kill.rs

//! The kill pipeline: team-kill policy, suicide accounting, scoring,
//! spawn-kill protection and the announcement ladder.

use crate::core::Daemon;
use crate::core::WardenError;
use crate::core::announcer::Announce;
use crate::core::game::gametype::Team;
use crate::core::game::modversion::{DeathCause, ModVersion};
use crate::core::game::now_secs;
use crate::core::game::player::{TK_WARNING, WORLD_SLOT};
use crate::core::game::roles::AdminRole;
use std::sync::Arc;
use tracing::debug;

/// Ban length handed out when the team-kill ladder tops out.
const TK_BAN_SECS: u64 = 600;

pub fn handle_kill(
    daemon: &Arc<Daemon>,
    killer_slot: u16,
    victim_slot: u16,
    cause_id: u8,
    world_kill: bool,
) -> Result<(), WardenError> {
    let now = now_secs();
    let mut game = daemon.game.lock();
    let rcon = game.rcon.clone();
    let killer_slot = if world_kill { WORLD_SLOT } else { killer_slot };
    let is_world = killer_slot == WORLD_SLOT;

    let cause = DeathCause::from_id(game.modversion, cause_id)
        .ok_or_else(|| WardenError::ParseMalformed(format!("death cause {cause_id}")))?;

    // Snapshot both sides before any mutation.
    let Some(victim) = game.player(victim_slot) else {
        return Ok(());
    };
    let victim_name = victim.name().to_string();
    let victim_colored = victim.colored_name();
    let victim_team = victim.team;
    let victim_prev_streak = victim.killing_streak;
    let victim_respawn = victim.respawn_time;
    let victim_is_bot = victim.guid.starts_with("BOT");
    let victim_was_bombholder = victim.bombholder;

    let Some(killer) = game.player(killer_slot) else {
        return Ok(());
    };
    let killer_name = killer.name().to_string();
    let killer_colored = killer.colored_name();
    let killer_team = killer.team;
    let killer_role = killer.admin_role;
    let killer_prev_losing = killer.losing_streak;

    if let Some(v) = game.player_mut(victim_slot) {
        v.alive = false;
    }

    // --- Team-kill policy --------------------------------------------------

    let mut tk_event = false;
    if !game.gametype.free_for_all()
        && killer_team == victim_team
        && killer_team != Team::Spectator
        && killer_slot != victim_slot
        && cause != DeathCause::Bombed
    {
        tk_event = true;
        if game.first_teamkill {
            game.first_teamkill = false;
            rcon.say(&format!("^1First teamkill ^7by {killer_colored}^7!"));
        }
        if let Some((k, v)) = game.two_players_mut(killer_slot, victim_slot) {
            k.team_kill();
            v.team_death();
        }

        let punishable = killer_role < AdminRole::Regular
            && (!victim_is_bot || daemon.bots_enabled())
            && daemon.config.bot.teamkill_autokick;
        if punishable {
            if let Some((k, v)) = game.two_players_mut(killer_slot, victim_slot) {
                k.add_tk_victim(victim_slot);
                v.add_killed_me(killer_slot);
            }
            rcon.tell(
                killer_slot,
                &format!("^7Do not attack teammates, you ^1killed ^7{victim_name}"),
                true,
            );
            rcon.tell(
                victim_slot,
                &format!("^7Type ^3!fp ^7to forgive ^3{killer_name}"),
                true,
            );

            let distinct = game
                .player(killer_slot)
                .map(|k| k.distinct_tk_victims())
                .unwrap_or(0);
            if distinct > 3 {
                if let Some(k) = game.player(killer_slot) {
                    daemon.ban_player(k, TK_BAN_SECS, "team killing over limit", None, now)?;
                }
                rcon.say(&format!(
                    "^7Player ^2{killer_name} ^7banned for ^1{} minutes ^7for team killing",
                    TK_BAN_SECS / 60
                ));
                game.kick_player(killer_slot, "stop team killing");
            } else if let Some(k) = game.player_mut(killer_slot) {
                k.add_warning(TK_WARNING, true, now);
                let count = k.warning_count();
                rcon.tell(
                    killer_slot,
                    &format!("^1WARNING ^7[^3{count}^7]: ^7stop team killing"),
                    true,
                );
                if count == 3 {
                    rcon.say(&format!(
                        "^1ALERT: ^2{killer_name} ^7auto-kick from warnings if not cleared"
                    ));
                }
            }
        }
    }

    // --- Suicide -----------------------------------------------------------

    let suicide =
        cause.always_suicide() || (killer_slot == victim_slot && cause.self_kill_weapon());
    if suicide {
        if let Some(v) = game.player_mut(victim_slot) {
            v.suicide();
            v.die();
        }
        debug!("player {victim_slot} {victim_name} committed suicide ({cause:?})");
        return Ok(());
    }
    if tk_event || cause == DeathCause::ChangeTeam {
        return Ok(());
    }

    // --- Scoring -----------------------------------------------------------

    let bomb_mode = game.gametype == crate::core::game::Gametype::Bomb;
    let (multi_kill, killer_streak) = match game.player_mut(killer_slot) {
        Some(k) => {
            k.kill(now);
            if bomb_mode {
                if victim_was_bombholder {
                    k.bomb_carrier_kills += 1;
                }
                if cause == DeathCause::Bombed {
                    k.kills_with_bomb += 1;
                }
            }
            if cause.is_grenade() {
                k.he_kills += 1;
            }
            if cause.is_knife() {
                k.knife_kills += 1;
            }
            (k.multi_kill_count, k.killing_streak)
        }
        None => (0, 0),
    };
    if let Some(v) = game.player_mut(victim_slot) {
        v.die();
    }

    // --- Spawn-kill guard --------------------------------------------------

    if daemon.config.bot.spawnkill_autokick
        && !is_world
        && !victim_is_bot
        && victim_respawn + daemon.config.bot.spawnkill_warn_time as f64 > now
        && killer_role.level() < daemon.config.bot.admin_immunity
    {
        if daemon.config.bot.instant_kill_spawnkiller && game.modversion >= ModVersion::V42 {
            rcon.enqueue(format!("smite {killer_slot}"));
        }
        if let Some(k) = game.player_mut(killer_slot) {
            k.add_warning("stop spawn killing", true, now);
            let count = k.warning_count();
            rcon.tell(
                killer_slot,
                &format!("^1WARNING ^7[^3{count}^7]: ^7stop spawn killing"),
                true,
            );
            if count > 3 {
                rcon.say(&format!("^2{killer_name} ^7was kicked, spawn killing"));
                game.kick_player(killer_slot, "stop spawn killing");
                return Ok(());
            }
        }
    }

    // --- Announcements -----------------------------------------------------

    if !is_world {
        if game.firstblood {
            game.firstblood = false;
            if daemon.announcer.allows(Announce::FIRST_KILL) {
                rcon.bigtext(&format!("{killer_name} scored FIRST BLOOD!"));
            }
        }
        if cause.is_grenade() {
            if game.first_nade_kill {
                game.first_nade_kill = false;
                if daemon.announcer.allows(Announce::FIRST_KILL) {
                    rcon.say(&format!("^7First HE grenade kill by {killer_colored}^7!"));
                }
            } else if daemon.announcer.allows(Announce::NADE_KILLS) {
                rcon.say(&format!(
                    "^7{killer_colored} ^7killed {victim_colored} ^7with a HE grenade"
                ));
            }
        }
        if cause.is_knife() {
            if game.first_knife_kill {
                game.first_knife_kill = false;
                if daemon.announcer.allows(Announce::FIRST_KILL) {
                    rcon.say(&format!("^7First knife kill by {killer_colored}^7!"));
                }
            } else if daemon.announcer.allows(Announce::KNIFE_KILLS) {
                rcon.say(&format!(
                    "^7{killer_colored} ^7sliced {victim_colored}^7!"
                ));
            }
        }
        if daemon.announcer.allows(Announce::MULTI_KILL) {
            match multi_kill {
                2 => rcon.say(&format!("^7{killer_colored}: ^2Double Kill!")),
                3 => rcon.say(&format!("^7{killer_colored}: ^2Multi Kill!")),
                4 => rcon.bigtext(&format!("{killer_name}: MONSTER KILL!!")),
                _ => {}
            }
        }

        let streak_msg = match killer_streak {
            5 => Some("is on a killing spree (^15 ^7kills in a row)"),
            10 => Some("is on a rampage (^110 ^7kills in a row)"),
            15 => Some("is unstoppable (^115 ^7kills in a row)"),
            20 => Some("is godlike (^120 ^7kills in a row)"),
            _ => None,
        };
        if let Some(msg) = streak_msg {
            rcon.say(&format!("{killer_colored} ^7{msg}"));
        }

        if killer_prev_losing >= 5 {
            rcon.tell(killer_slot, "^7Nice, you are back in business", true);
        }
    }

    if killer_slot != victim_slot && !is_world {
        let ended = match victim_prev_streak {
            s if s >= 20 => Some("godlike"),
            s if s >= 15 => Some("unstoppable"),
            s if s >= 10 => Some("rampage"),
            s if s >= 5 => Some("killing spree"),
            _ => None,
        };
        if let Some(spree) = ended {
            rcon.say(&format!(
                "{victim_colored}'s ^7{spree} was ended by {killer_colored}^7!"
            ));
        }
    }

    debug!("player {killer_slot} {killer_name} killed {victim_slot} {victim_name} ({cause:?})");
    Ok(())
}
