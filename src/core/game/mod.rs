// src/core/game/mod.rs

//! The live game model: the slot-indexed player table, the map rotation and
//! the per-match state that policy handlers and chat commands operate on.

pub mod gametype;
pub mod modversion;
pub mod names;
pub mod player;
pub mod roles;

pub use gametype::{Gametype, Team};
pub use modversion::{DeathCause, HitLocation, ModVersion};
pub use player::{Player, WORLD_SLOT};
pub use roles::AdminRole;

use crate::core::rcon::RconHandle;
use std::collections::VecDeque;

/// Size of the slot table. Urban Terror client numbers stay well below
/// this; slot 1022 is the World sentinel.
pub const MAX_SLOTS: usize = 1024;

/// Bounded ring of recently played maps shown by `!lastmaps`.
const LAST_MAPS: usize = 4;

/// Seconds since the unix epoch, with sub-second precision. All session
/// clocks in the model use this representation so tests can pass in fixed
/// values.
pub fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

pub struct Game {
    pub rcon: RconHandle,
    slots: Box<[Option<Player>]>,
    pub mapname: Option<String>,
    pub next_mapname: Option<String>,
    pub maplist: Vec<String>,
    pub all_maps: Vec<String>,
    pub last_maps: VecDeque<String>,
    pub gametype: Gametype,
    pub modversion: ModVersion,
    pub default_gear: String,
    pub bomb_detonation_secs: u32,
    /// `!teams` is disallowed mid-round in round-based modes when the
    /// round-end deferral is configured.
    pub allow_cmd_teams: bool,
    /// A balance request deferred to round end.
    pub pending_team_balance: bool,
    // One-shot announcements, armed per match.
    pub firstblood: bool,
    pub first_nade_kill: bool,
    pub first_knife_kill: bool,
    pub first_teamkill: bool,
    pub last_vote: Option<String>,
    /// Name of the last admin seen online, shown by `!lastadmin`.
    pub last_admin: Option<String>,
    /// Name of the last player who left, shown by `!exit`.
    pub last_disconnect: Option<String>,
}

impl Game {
    pub fn new(rcon: RconHandle) -> Self {
        let mut slots: Vec<Option<Player>> = Vec::with_capacity(MAX_SLOTS);
        slots.resize_with(MAX_SLOTS, || None);
        let mut game = Game {
            rcon,
            slots: slots.into_boxed_slice(),
            mapname: None,
            next_mapname: None,
            maplist: Vec::new(),
            all_maps: Vec::new(),
            last_maps: VecDeque::with_capacity(LAST_MAPS),
            gametype: Gametype::default(),
            modversion: ModVersion::default(),
            default_gear: String::new(),
            bomb_detonation_secs: 40,
            allow_cmd_teams: true,
            pending_team_balance: false,
            firstblood: true,
            first_nade_kill: true,
            first_knife_kill: true,
            first_teamkill: true,
            last_vote: None,
            last_admin: None,
            last_disconnect: None,
        };
        game.slots[WORLD_SLOT as usize] = Some(Player::world());
        game
    }

    // --- Slot table --------------------------------------------------------

    pub fn player(&self, slot: u16) -> Option<&Player> {
        self.slots.get(slot as usize).and_then(Option::as_ref)
    }

    pub fn player_mut(&mut self, slot: u16) -> Option<&mut Player> {
        self.slots.get_mut(slot as usize).and_then(Option::as_mut)
    }

    /// Splits two distinct slots into simultaneous mutable borrows.
    pub fn two_players_mut(&mut self, a: u16, b: u16) -> Option<(&mut Player, &mut Player)> {
        if a == b || a as usize >= MAX_SLOTS || b as usize >= MAX_SLOTS {
            return None;
        }
        let (lo, hi, swapped) = if a < b {
            (a as usize, b as usize, false)
        } else {
            (b as usize, a as usize, true)
        };
        let (left, right) = self.slots.split_at_mut(hi);
        let pl = left[lo].as_mut()?;
        let ph = right[0].as_mut()?;
        Some(if swapped { (ph, pl) } else { (pl, ph) })
    }

    /// Inserts a player at its slot, replacing any stale occupant.
    pub fn add_player(&mut self, player: Player) {
        let slot = player.slot() as usize;
        if slot < MAX_SLOTS && slot != WORLD_SLOT as usize {
            self.slots[slot] = Some(player);
        }
    }

    /// Removes a player and purges its slot number from every other
    /// player's TK, forgiveness and grudge ledgers.
    pub fn remove_player(&mut self, slot: u16) -> Option<Player> {
        if slot == WORLD_SLOT {
            return None;
        }
        let removed = self.slots.get_mut(slot as usize).and_then(Option::take)?;
        for p in self.slots.iter_mut().flatten() {
            p.purge_slot_references(slot);
        }
        Some(removed)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.slots.iter().flatten()
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.slots.iter_mut().flatten()
    }

    /// Connected human/bot clients; the World sentinel does not count.
    pub fn connected_count(&self) -> usize {
        self.players().filter(|p| !p.is_world()).count()
    }

    /// (red, blue, spectator) headcount.
    pub fn team_counts(&self) -> (usize, usize, usize) {
        let mut red = 0;
        let mut blue = 0;
        let mut spec = 0;
        for p in self.players() {
            if p.is_world() {
                continue;
            }
            match p.team {
                Team::Red => red += 1,
                Team::Blue => blue += 1,
                Team::Spectator => spec += 1,
                Team::Green => {}
            }
        }
        (red, blue, spec)
    }

    // --- Map rotation ------------------------------------------------------

    /// Takes the map reported by the server (or falls back to the previously
    /// computed next map), records the outgoing map in the last-maps ring and
    /// recomputes the next map from the rotation.
    pub fn set_current_map(&mut self, reported: Option<String>) {
        let new_map = reported.or_else(|| self.next_mapname.clone());
        if let Some(old) = self.mapname.take() {
            if self.last_maps.len() == LAST_MAPS {
                self.last_maps.pop_front();
            }
            self.last_maps.push_back(old);
        }
        self.mapname = new_map;
        self.next_mapname = self.compute_next_map();
    }

    fn compute_next_map(&self) -> Option<String> {
        let current = self.mapname.as_deref()?;
        if self.maplist.is_empty() {
            return Some(current.to_string());
        }
        match self.maplist.iter().position(|m| m == current) {
            Some(idx) if idx + 1 < self.maplist.len() => Some(self.maplist[idx + 1].clone()),
            _ => Some(self.maplist[0].clone()),
        }
    }

    // --- Team balance ------------------------------------------------------

    /// Moves players from the larger team to the smaller until the sizes
    /// differ by at most one. The most recent joiners move first; players
    /// with a team lock stay. Returns the slots that were moved.
    pub fn balance_teams(&mut self) -> Vec<u16> {
        let (red, blue, _) = self.team_counts();
        let (from, to) = if red as i64 - blue as i64 > 1 {
            (Team::Red, Team::Blue)
        } else if blue as i64 - red as i64 > 1 {
            (Team::Blue, Team::Red)
        } else {
            self.rcon.say("^7Teams are already balanced");
            return Vec::new();
        };
        self.rcon.bigtext("AUTOBALANCING TEAMS...");

        let num_to_move = (red as i64 - blue as i64).unsigned_abs() as usize / 2;
        let mut candidates: Vec<(f64, u16)> = self
            .players()
            .filter(|p| !p.is_world() && p.team == from && p.team_lock.is_none())
            .map(|p| (p.time_joined, p.slot()))
            .collect();
        // Most recent joiners first.
        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(num_to_move);

        let moved: Vec<u16> = candidates.iter().map(|(_, slot)| *slot).collect();
        for slot in &moved {
            if let Some(p) = self.player_mut(*slot) {
                p.team = to;
            }
            self.rcon.force_team(*slot, &to.to_string());
        }
        self.rcon.say("^7Autobalance complete!");
        moved
    }

    /// Kicks a slot, quoting the reason when the server version renders it.
    pub fn kick_player(&mut self, slot: u16, reason: &str) {
        if !reason.is_empty() && self.modversion.supports_kick_reason() {
            self.rcon.enqueue(format!("kick {slot} \"{reason}\""));
        } else {
            self.rcon.enqueue(format!("kick {slot}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_game() -> Game {
        let rcon = RconHandle::new();
        rcon.go_live();
        Game::new(rcon)
    }

    fn join(game: &mut Game, slot: u16, team: Team, joined: f64) {
        let mut p = Player::new(slot, "10.0.0.1", &format!("{slot:032}"), &format!("p{slot}"), joined);
        p.team = team;
        game.add_player(p);
    }

    #[test]
    fn world_is_always_present() {
        let game = live_game();
        assert!(game.player(WORLD_SLOT).unwrap().is_world());
        assert_eq!(game.connected_count(), 0);
    }

    #[test]
    fn remove_player_purges_references() {
        let mut game = live_game();
        join(&mut game, 1, Team::Red, 1.0);
        join(&mut game, 2, Team::Red, 2.0);
        game.player_mut(1).unwrap().add_tk_victim(2);
        game.player_mut(1).unwrap().add_killed_me(2);
        game.remove_player(2);
        let p1 = game.player(1).unwrap();
        assert!(p1.tk_victims.is_empty());
        assert!(p1.killed_me.is_empty());
    }

    #[test]
    fn next_map_wraps_around() {
        let mut game = live_game();
        game.maplist = vec!["ut4_casa".into(), "ut4_abbey".into(), "ut4_turnpike".into()];
        game.set_current_map(Some("ut4_turnpike".into()));
        assert_eq!(game.next_mapname.as_deref(), Some("ut4_casa"));
        game.set_current_map(Some("ut4_casa".into()));
        assert_eq!(game.next_mapname.as_deref(), Some("ut4_abbey"));
        assert_eq!(game.last_maps.back().map(String::as_str), Some("ut4_turnpike"));
    }

    #[test]
    fn last_maps_ring_is_bounded() {
        let mut game = live_game();
        for map in ["a", "b", "c", "d", "e", "f"] {
            game.set_current_map(Some(map.to_string()));
        }
        assert_eq!(game.last_maps.len(), 4);
        assert_eq!(game.last_maps.front().map(String::as_str), Some("b"));
    }

    #[test]
    fn balance_moves_most_recent_joiners() {
        let mut game = live_game();
        for (slot, joined) in [(1u16, 10.0), (2, 20.0), (3, 30.0), (4, 40.0)] {
            join(&mut game, slot, Team::Red, joined);
        }
        join(&mut game, 5, Team::Blue, 15.0);
        let moved = game.balance_teams();
        // (4 - 1) / 2 = 1 player moves, the latest joiner.
        assert_eq!(moved, vec![4]);
        let (red, blue, _) = game.team_counts();
        assert!((red as i64 - blue as i64).abs() <= 1);
    }

    #[test]
    fn balance_skips_locked_players() {
        let mut game = live_game();
        for (slot, joined) in [(1u16, 10.0), (2, 20.0), (3, 30.0), (4, 40.0), (5, 50.0)] {
            join(&mut game, slot, Team::Red, joined);
        }
        game.player_mut(5).unwrap().team_lock = Some(Team::Red);
        let moved = game.balance_teams();
        assert!(!moved.contains(&5));
        assert_eq!(moved, vec![4, 3]);
    }

    #[test]
    fn two_players_mut_splits_borrows() {
        let mut game = live_game();
        join(&mut game, 1, Team::Red, 1.0);
        join(&mut game, 2, Team::Blue, 2.0);
        let (a, b) = game.two_players_mut(2, 1).unwrap();
        assert_eq!(a.slot(), 2);
        assert_eq!(b.slot(), 1);
        assert!(game.two_players_mut(1, 1).is_none());
    }
}
