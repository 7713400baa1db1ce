// src/core/handlers/hit.rs

//! Per-hit bookkeeping: hit totals, zone counters and the headshot ticker.

use crate::core::Daemon;
use crate::core::WardenError;
use crate::core::announcer::Announce;
use crate::core::game::modversion::HitLocation;
use std::sync::Arc;

pub fn handle_hit(
    daemon: &Arc<Daemon>,
    _victim_slot: u16,
    hitter_slot: u16,
    zone_id: u8,
    _weapon_id: u8,
) -> Result<(), WardenError> {
    let mut game = daemon.game.lock();
    let rcon = game.rcon.clone();
    let modversion = game.modversion;
    let Some(hitter) = game.player_mut(hitter_slot) else {
        return Ok(());
    };
    hitter.all_hits += 1;

    let Some(location) = HitLocation::from_id(modversion, zone_id) else {
        return Ok(());
    };
    if location.is_headshot() {
        hitter.headshot();
        let count = hitter.head_shots;
        let percentage = (count as f64 / hitter.all_hits as f64 * 100.0).round() as u32;
        let name = hitter.colored_name();
        if daemon.announcer.allows(Announce::HEADSHOT_HITS) {
            let plural = if count > 1 { "headshots" } else { "headshot" };
            rcon.say(&format!("{name} ^7has {count} {plural} ({percentage} percent)"));
        }
    } else {
        match location {
            HitLocation::Body => hitter.hit_zones.body += 1,
            HitLocation::Arms => hitter.hit_zones.arms += 1,
            HitLocation::Legs => hitter.hit_zones.legs += 1,
            HitLocation::Head | HitLocation::Helmet => {}
        }
    }
    Ok(())
}
