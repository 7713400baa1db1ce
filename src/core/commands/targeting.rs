// src/core/commands/targeting.rs

//! Target resolution for chat commands: exact name, slot number, `@<id>`
//! database id, or case-insensitive substring. Ambiguity is an error
//! carrying the candidate listing; `@<id>` may address offline players.

use crate::core::WardenError;
use crate::core::db::{Db, OfflinePlayer};
use crate::core::game::Game;
use crate::core::game::player::WORLD_SLOT;

/// Resolution result: a connected slot or a read-only database shim.
#[derive(Debug)]
pub enum Target {
    Online(u16),
    Offline(OfflinePlayer),
}

pub fn resolve(game: &Game, db: &Db, who: &str) -> Result<Target, WardenError> {
    let wanted = who.trim();
    if wanted.is_empty() {
        return Err(WardenError::TargetNotFound("No Player found".to_string()));
    }
    let upper = wanted.to_uppercase();
    let mut matches: Vec<(u16, String)> = Vec::new();

    for player in game.players() {
        if player.slot() == WORLD_SLOT {
            continue;
        }
        let name_upper = player.name().to_uppercase();
        let exact = name_upper == upper
            || wanted == player.slot().to_string()
            || (player.player_id > 0 && wanted == format!("@{}", player.player_id));
        if exact {
            return Ok(Target::Online(player.slot()));
        }
        if name_upper.contains(&upper) {
            matches.push((player.slot(), player.name().to_string()));
        }
    }

    match matches.len() {
        1 => Ok(Target::Online(matches[0].0)),
        0 => {
            if let Some(id) = wanted.strip_prefix('@') {
                if let Ok(player_id) = id.parse::<i64>() {
                    if player_id > 1 {
                        if let Some(shim) = db.offline_player(player_id)? {
                            return Ok(Target::Offline(shim));
                        }
                    }
                }
            }
            Err(WardenError::TargetNotFound("No Player found".to_string()))
        }
        _ => {
            let listing = matches
                .iter()
                .map(|(slot, name)| format!("^3{name} [^2{slot}^3]"))
                .collect::<Vec<_>>()
                .join(", ");
            Err(WardenError::TargetAmbiguous(format!(
                "^7Players matching {wanted}: {listing}"
            )))
        }
    }
}

/// Like [`resolve`], but the target must be connected.
pub fn resolve_online(game: &Game, db: &Db, who: &str) -> Result<u16, WardenError> {
    match resolve(game, db, who)? {
        Target::Online(slot) => Ok(slot),
        Target::Offline(_) => Err(WardenError::TargetNotFound(
            "Player is not connected".to_string(),
        )),
    }
}
