// src/core/game/player.rs

//! The per-slot in-memory player record and its bookkeeping operations.
//!
//! A `Player` is pure state: every operation mutates counters or lists and
//! nothing here touches the database or the RCON channel. Persistence flows
//! through the gateway at the call sites, which keeps the operations
//! testable against the clock values the caller passes in.

use crate::core::game::gametype::Team;
use crate::core::game::names;
use crate::core::game::roles::AdminRole;

/// Slot number of the synthetic "World" player that the log blames for
/// environment deaths.
pub const WORLD_SLOT: u16 = 1022;

/// Warning text used by the team-kill ladder; referenced by forgiveness.
pub const TK_WARNING: &str = "stop team killing";
/// Warning text used by the ping check.
pub const PING_WARNING: &str = "fix your ping";
/// Warning text used by the spectator check.
pub const SPEC_WARNING: &str = "spectator too long on full server";

/// Kills this close together (seconds) extend a multi-kill.
const MULTI_KILL_WINDOW: f64 = 5.0;

/// Sentinel for "no capture yet"; anything at or above it is not announced.
pub const NO_CAPTURE_TIME: f64 = 999.0;

/// Aggregate per-location hit counters (head shots are tracked separately).
#[derive(Debug, Clone, Copy, Default)]
pub struct HitZones {
    pub body: u32,
    pub arms: u32,
    pub legs: u32,
}

/// Totals flushed to `xlrstats` on disconnect and on match exit.
#[derive(Debug, Clone, Copy)]
pub struct SessionTotals {
    pub kills: u32,
    pub deaths: u32,
    pub head_shots: u32,
    pub tk_count: u32,
    pub team_death: u32,
    pub max_kill_streak: u32,
    pub suicides: u32,
    pub ratio: f64,
}

/// One connected client (or the World sentinel).
#[derive(Debug, Clone)]
pub struct Player {
    slot: u16,
    pub guid: String,
    pub authname: Option<String>,
    pub address: String,
    name: String,
    pub player_id: i64,
    pub aliases: Vec<String>,
    pub registered: bool,
    pub welcome_msg: bool,
    pub country: Option<String>,
    pub ban_id: Option<i64>,
    pub team: Team,
    pub team_lock: Option<Team>,
    pub time_joined: f64,

    // Session statistics, reset on map change.
    pub kills: u32,
    pub deaths: u32,
    pub head_shots: u32,
    pub all_hits: u32,
    pub hit_zones: HitZones,
    pub he_kills: u32,
    pub knife_kills: u32,
    pub killing_streak: u32,
    pub max_kill_streak: u32,
    pub losing_streak: u32,
    pub multi_kill_count: u32,
    pub last_kill_time: f64,
    pub respawn_time: f64,
    pub alive: bool,
    pub tk_count: u32,

    // CTF.
    pub flags_captured: u32,
    pub flags_returned: u32,
    pub fastest_cap_secs: f64,

    // Bomb.
    pub bombholder: bool,
    pub bomb_carrier_kills: u32,
    pub kills_with_bomb: u32,
    pub bomb_planted: u32,
    pub bomb_defused: u32,

    // Freeze tag.
    pub freezes: u32,
    pub thawouts: u32,

    // Mirror of the xlrstats row, kept current during the session.
    pub db_kills: u32,
    pub db_deaths: u32,
    pub db_head_shots: u32,
    pub db_tk_count: u32,
    pub db_team_death: u32,
    pub db_max_kill_streak: u32,
    pub db_suicides: u32,
    pub admin_role: AdminRole,
    pub first_seen: Option<String>,
    pub last_visit: Option<String>,
    pub num_played: u32,

    // Moderation bookkeeping.
    pub warnings: Vec<String>,
    pub last_warn_time: f64,
    pub tk_victims: Vec<u16>,
    pub killed_me: Vec<u16>,
    pub grudged: Vec<u16>,
    pub ping_value: u16,
}

impl Player {
    pub fn new(slot: u16, address: &str, guid: &str, raw_name: &str, now: f64) -> Self {
        Player {
            slot,
            guid: guid.to_string(),
            authname: None,
            address: address.to_string(),
            name: names::sanitize(raw_name),
            player_id: 0,
            aliases: Vec::new(),
            registered: false,
            welcome_msg: true,
            country: None,
            ban_id: None,
            team: Team::Spectator,
            team_lock: None,
            time_joined: now,
            kills: 0,
            deaths: 0,
            head_shots: 0,
            all_hits: 0,
            hit_zones: HitZones::default(),
            he_kills: 0,
            knife_kills: 0,
            killing_streak: 0,
            max_kill_streak: 0,
            losing_streak: 0,
            multi_kill_count: 0,
            last_kill_time: 0.0,
            respawn_time: 0.0,
            alive: false,
            tk_count: 0,
            flags_captured: 0,
            flags_returned: 0,
            fastest_cap_secs: NO_CAPTURE_TIME,
            bombholder: false,
            bomb_carrier_kills: 0,
            kills_with_bomb: 0,
            bomb_planted: 0,
            bomb_defused: 0,
            freezes: 0,
            thawouts: 0,
            db_kills: 0,
            db_deaths: 0,
            db_head_shots: 0,
            db_tk_count: 0,
            db_team_death: 0,
            db_max_kill_streak: 0,
            db_suicides: 0,
            admin_role: AdminRole::Guest,
            first_seen: None,
            last_visit: None,
            num_played: 0,
            warnings: Vec::new(),
            last_warn_time: 0.0,
            tk_victims: Vec::new(),
            killed_me: Vec::new(),
            grudged: Vec::new(),
            ping_value: 0,
        }
    }

    /// The immutable sentinel occupying slot 1022.
    pub fn world() -> Self {
        Player::new(WORLD_SLOT, "0.0.0.0", "NONE", "World", 0.0)
    }

    pub fn slot(&self) -> u16 {
        self.slot
    }

    pub fn is_world(&self) -> bool {
        self.slot == WORLD_SLOT
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, raw: &str) {
        self.name = names::sanitize(raw);
    }

    /// Name prefixed with the team color, for broadcasts.
    pub fn colored_name(&self) -> String {
        format!("{}{}", self.team.color(), self.name)
    }

    // --- Kill/death bookkeeping -------------------------------------------

    pub fn kill(&mut self, now: f64) {
        self.killing_streak += 1;
        self.kills += 1;
        self.db_kills += 1;
        self.losing_streak = 0;
        if now - self.last_kill_time < MULTI_KILL_WINDOW {
            self.multi_kill_count += 1;
        } else {
            self.multi_kill_count = 1;
        }
        self.last_kill_time = now;
    }

    pub fn die(&mut self) {
        self.max_kill_streak = self.max_kill_streak.max(self.killing_streak);
        if self.max_kill_streak > self.db_max_kill_streak {
            self.db_max_kill_streak = self.max_kill_streak;
        }
        self.killing_streak = 0;
        self.deaths += 1;
        self.db_deaths += 1;
        self.losing_streak += 1;
        self.multi_kill_count = 0;
        self.alive = false;
    }

    pub fn suicide(&mut self) {
        self.db_suicides += 1;
    }

    pub fn headshot(&mut self) {
        self.head_shots += 1;
        self.db_head_shots += 1;
    }

    pub fn team_kill(&mut self) {
        self.tk_count += 1;
        self.db_tk_count += 1;
    }

    pub fn team_death(&mut self) {
        self.db_team_death += 1;
    }

    pub fn spawned(&mut self, now: f64) {
        self.alive = true;
        self.respawn_time = now;
    }

    // --- Team-kill forgiveness --------------------------------------------

    pub fn add_tk_victim(&mut self, victim: u16) {
        self.tk_victims.push(victim);
    }

    pub fn add_killed_me(&mut self, killer: u16) {
        self.killed_me.push(killer);
    }

    /// Distinct victims, for the auto-kick threshold.
    pub fn distinct_tk_victims(&self) -> usize {
        let mut seen: Vec<u16> = Vec::with_capacity(self.tk_victims.len());
        for v in &self.tk_victims {
            if !seen.contains(v) {
                seen.push(*v);
            }
        }
        seen.len()
    }

    /// Victim side of a forgiveness: drops one occurrence of `killer`.
    /// Returns false when there was nothing to forgive.
    pub fn forgive_killer(&mut self, killer: u16) -> bool {
        match self.killed_me.iter().rposition(|k| *k == killer) {
            Some(idx) => {
                self.killed_me.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Killer side of a forgiveness: drops one TK warning and one entry of
    /// `victim` from the victim ledger.
    pub fn forgiven_by(&mut self, victim: u16) {
        if let Some(idx) = self.warnings.iter().rposition(|w| w == TK_WARNING) {
            self.warnings.remove(idx);
        }
        if let Some(idx) = self.tk_victims.iter().rposition(|v| *v == victim) {
            self.tk_victims.remove(idx);
        }
    }

    pub fn grudge(&mut self, killer: u16) {
        if !self.grudged.contains(&killer) {
            self.grudged.push(killer);
        }
        while self.forgive_killer(killer) {}
    }

    /// Drops every reference to a departed slot so a reconnecting client
    /// cannot inherit another player's debts.
    pub fn purge_slot_references(&mut self, slot: u16) {
        self.tk_victims.retain(|v| *v != slot);
        self.killed_me.retain(|k| *k != slot);
        self.grudged.retain(|g| *g != slot);
    }

    // --- Warnings ---------------------------------------------------------

    pub fn add_warning(&mut self, text: &str, timer: bool, now: f64) {
        self.warnings.push(text.to_string());
        if timer {
            self.last_warn_time = now;
        }
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Clears the warning list when the last warning has aged out.
    pub fn expire_warnings(&mut self, now: f64, expiration: f64) {
        if !self.warnings.is_empty() && self.last_warn_time + expiration < now {
            self.clear_warnings();
        }
    }

    pub fn clear_warnings(&mut self) {
        self.warnings.clear();
        self.tk_victims.clear();
        self.killed_me.clear();
        self.last_warn_time = 0.0;
    }

    pub fn clear_specific_warning(&mut self, text: &str) {
        self.warnings.retain(|w| w != text);
    }

    /// Removes the most recent warning. A removed TK warning also drops one
    /// TK victim entry so the auto-kick ladder stays in step.
    pub fn clear_last_warning(&mut self) -> Option<String> {
        let removed = self.warnings.pop()?;
        if self.warnings.is_empty() {
            self.last_warn_time -= 60.0;
        }
        if removed == TK_WARNING {
            self.tk_victims.pop();
        }
        Some(removed)
    }

    pub fn add_high_ping(&mut self, value: u16) {
        // No timer bump: a ping warning must not refresh the expiry window.
        self.warnings.push(PING_WARNING.to_string());
        self.ping_value = value;
    }

    pub fn clear_high_ping(&mut self) {
        self.clear_specific_warning(PING_WARNING);
        self.ping_value = 0;
    }

    pub fn spec_warning_count(&self) -> usize {
        self.warnings.iter().filter(|w| *w == SPEC_WARNING).count()
    }

    pub fn high_ping_count(&self) -> usize {
        self.warnings.iter().filter(|w| *w == PING_WARNING).count()
    }

    // --- Objective counters -----------------------------------------------

    pub fn capture_flag(&mut self, cap_time: Option<f64>) {
        self.flags_captured += 1;
        if let Some(t) = cap_time {
            if t < self.fastest_cap_secs {
                self.fastest_cap_secs = t;
            }
        }
    }

    pub fn return_flag(&mut self) {
        self.flags_returned += 1;
    }

    // --- Registration mirror ----------------------------------------------

    /// Marks the player registered after an xlrstats insert and suppresses
    /// the first-time welcome.
    pub fn registered_with_role(&mut self, role: AdminRole) {
        self.registered = true;
        self.admin_role = role;
        self.welcome_msg = false;
    }

    pub fn disable_welcome(&mut self) {
        self.welcome_msg = false;
    }

    // --- Session reset ----------------------------------------------------

    /// Resets per-match statistics. On a map change the headshot and streak
    /// counters survive when the corresponding config switches say so.
    pub fn reset_match(&mut self, reset_headshots: bool, reset_streak: bool) {
        self.kills = 0;
        self.deaths = 0;
        self.all_hits = 0;
        self.hit_zones = HitZones::default();
        self.he_kills = 0;
        self.knife_kills = 0;
        if reset_headshots {
            self.head_shots = 0;
        }
        if reset_streak {
            self.killing_streak = 0;
            self.max_kill_streak = 0;
        }
        self.losing_streak = 0;
        self.multi_kill_count = 0;
        self.last_kill_time = 0.0;
        self.tk_count = 0;
        self.tk_victims.clear();
        self.killed_me.clear();
        self.grudged.clear();
        self.warnings.clear();
        self.last_warn_time = 0.0;
        self.reset_flag_stats();
        self.bombholder = false;
        self.bomb_carrier_kills = 0;
        self.kills_with_bomb = 0;
        self.bomb_planted = 0;
        self.bomb_defused = 0;
        self.freezes = 0;
        self.thawouts = 0;
        self.team_lock = None;
        self.alive = false;
    }

    pub fn reset_flag_stats(&mut self) {
        self.flags_captured = 0;
        self.flags_returned = 0;
        self.fastest_cap_secs = NO_CAPTURE_TIME;
    }

    /// The aggregate row image flushed to the database.
    pub fn session_totals(&self) -> SessionTotals {
        let ratio = if self.db_deaths == 0 {
            1.0
        } else {
            (self.db_kills as f64 / self.db_deaths as f64 * 100.0).round() / 100.0
        };
        SessionTotals {
            kills: self.db_kills,
            deaths: self.db_deaths,
            head_shots: self.db_head_shots,
            tk_count: self.db_tk_count,
            team_death: self.db_team_death,
            max_kill_streak: self.db_max_kill_streak,
            suicides: self.db_suicides,
            ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(4, "10.0.0.4", "A1B2C3D4E5F60718293A4B5C6D7E8F90", "Tester", 1000.0)
    }

    #[test]
    fn kill_then_die_updates_streaks() {
        let mut p = player();
        p.kill(1000.0);
        p.kill(1001.0);
        assert_eq!(p.killing_streak, 2);
        assert_eq!(p.multi_kill_count, 2);
        p.die();
        assert_eq!(p.killing_streak, 0);
        assert_eq!(p.max_kill_streak, 2);
        assert_eq!(p.losing_streak, 1);
        assert_eq!(p.multi_kill_count, 0);
    }

    #[test]
    fn multi_kill_window_resets_after_five_seconds() {
        let mut p = player();
        p.kill(1000.0);
        p.kill(1004.9);
        assert_eq!(p.multi_kill_count, 2);
        p.kill(1010.0);
        assert_eq!(p.multi_kill_count, 1);
    }

    #[test]
    fn forgive_removes_exactly_one_occurrence() {
        let mut victim = player();
        victim.add_killed_me(7);
        victim.add_killed_me(7);
        assert!(victim.forgive_killer(7));
        assert_eq!(victim.killed_me, vec![7]);

        let mut killer = player();
        killer.add_warning(TK_WARNING, true, 1000.0);
        killer.add_warning(TK_WARNING, true, 1001.0);
        killer.add_tk_victim(4);
        killer.add_tk_victim(4);
        killer.forgiven_by(4);
        assert_eq!(killer.warning_count(), 1);
        assert_eq!(killer.tk_victims, vec![4]);
    }

    #[test]
    fn warning_expiry_clears_the_list() {
        let mut p = player();
        p.add_warning("camping", true, 1000.0);
        p.expire_warnings(1100.0, 240.0);
        assert_eq!(p.warning_count(), 1);
        p.expire_warnings(1241.0, 240.0);
        assert_eq!(p.warning_count(), 0);
    }

    #[test]
    fn clear_last_warning_pops_tk_victim() {
        let mut p = player();
        p.add_tk_victim(9);
        p.add_warning(TK_WARNING, true, 1000.0);
        assert_eq!(p.clear_last_warning().as_deref(), Some(TK_WARNING));
        assert!(p.tk_victims.is_empty());
    }

    #[test]
    fn distinct_tk_victims_ignores_duplicates() {
        let mut p = player();
        for v in [5, 5, 6, 7] {
            p.add_tk_victim(v);
        }
        assert_eq!(p.distinct_tk_victims(), 3);
    }
}
