// src/core/db/mod.rs

//! The persistence gateway: a thin, fully parameterised wrapper over the
//! embedded SQLite store holding player identity, aggregate statistics, the
//! ban list and the ban-point ledger.
//!
//! Timestamps are stored as `%Y-%m-%d %H:%M:%S` TEXT so expiry comparisons
//! stay lexicographic, which keeps the schema interchangeable with the other
//! tools operating on the same file.

use crate::core::WardenError;
use crate::core::game::player::SessionTotals;
use crate::core::game::roles::AdminRole;
use chrono::TimeZone;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};

/// Aliases kept per identity before the ledger is capped.
const MAX_ALIASES: usize = 15;
const ALIAS_OVERFLOW: &str = "and more...";

/// Formats seconds-since-epoch in the stored TEXT format.
pub fn stamp(secs: f64) -> String {
    let dt = chrono::Utc
        .timestamp_opt(secs as i64, 0)
        .single()
        .unwrap_or_else(|| chrono::Utc.timestamp_opt(0, 0).single().expect("epoch"));
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Mirror of an `xlrstats` row loaded at connect time.
#[derive(Debug, Clone)]
pub struct XlrRow {
    pub last_played: Option<String>,
    pub first_seen: Option<String>,
    pub num_played: u32,
    pub kills: u32,
    pub deaths: u32,
    pub headshots: u32,
    pub team_kills: u32,
    pub team_death: u32,
    pub max_kill_streak: u32,
    pub suicides: u32,
    pub admin_role: AdminRole,
}

/// A row of the ban list.
#[derive(Debug, Clone)]
pub struct BanRecord {
    pub id: i64,
    pub guid: String,
    pub name: String,
    pub ip_address: String,
    pub expires: String,
    pub timestamp: String,
    pub reason: String,
}

/// Outcome of a ban upsert; expiry is monotone per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanOutcome {
    /// New row inserted.
    Inserted,
    /// Existing row extended to the later expiry.
    Extended,
    /// Existing row already expires later; nothing stored.
    Unchanged,
}

/// A read-only shim for `@<id>` targets that are not connected. Deliberately
/// a distinct type from the live `Player`.
#[derive(Debug, Clone)]
pub struct OfflinePlayer {
    pub player_id: i64,
    pub guid: String,
    pub name: String,
    pub ip_address: String,
    pub admin_role: AdminRole,
    pub registered: bool,
    pub last_visit: Option<String>,
    pub aliases: Vec<String>,
}

/// The gateway. Synchronous by design: callers already serialise through the
/// game lock, and every handler's database work is a handful of point
/// queries.
pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    pub fn open(path: &str) -> Result<Self, WardenError> {
        let conn = Connection::open(path)?;
        let db = Db {
            conn: Mutex::new(conn),
        };
        db.create_tables()?;
        Ok(db)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, WardenError> {
        let db = Db {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        db.create_tables()?;
        Ok(db)
    }

    fn create_tables(&self) -> Result<(), WardenError> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS xlrstats (
                id INTEGER PRIMARY KEY NOT NULL,
                guid TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                ip_address TEXT NOT NULL,
                first_seen DATETIME,
                last_played DATETIME,
                num_played INTEGER DEFAULT 1,
                kills INTEGER DEFAULT 0,
                deaths INTEGER DEFAULT 0,
                headshots INTEGER DEFAULT 0,
                team_kills INTEGER DEFAULT 0,
                team_death INTEGER DEFAULT 0,
                max_kill_streak INTEGER DEFAULT 0,
                suicides INTEGER DEFAULT 0,
                ratio REAL DEFAULT 0,
                rounds INTEGER DEFAULT 0,
                admin_role INTEGER DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS player (
                id INTEGER PRIMARY KEY NOT NULL,
                guid TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                ip_address TEXT NOT NULL,
                time_joined DATETIME,
                aliases TEXT
            );
            CREATE TABLE IF NOT EXISTS ban_list (
                id INTEGER PRIMARY KEY NOT NULL,
                guid TEXT NOT NULL,
                name TEXT,
                ip_address TEXT,
                expires DATETIME,
                timestamp DATETIME,
                reason TEXT
            );
            CREATE TABLE IF NOT EXISTS ban_points (
                id INTEGER PRIMARY KEY NOT NULL,
                guid TEXT NOT NULL,
                point_type TEXT,
                expires DATETIME
            );",
        )?;
        Ok(())
    }

    // --- Identity ----------------------------------------------------------

    /// Records a sighting of `guid`: inserts the identity row on first
    /// contact, otherwise refreshes name/ip/join time and appends the name
    /// to the alias ledger. Returns the row id and the alias list.
    pub fn upsert_player(
        &self,
        guid: &str,
        name: &str,
        ip: &str,
        now: f64,
    ) -> Result<(i64, Vec<String>), WardenError> {
        let conn = self.conn.lock();
        let joined = stamp(now);
        let existing: Option<(i64, Option<String>)> = conn
            .query_row(
                "SELECT id, aliases FROM player WHERE guid = ?1",
                params![guid],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match existing {
            None => {
                conn.execute(
                    "INSERT INTO player (guid, name, ip_address, time_joined, aliases)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![guid, name, ip, joined, name],
                )?;
                Ok((conn.last_insert_rowid(), vec![name.to_string()]))
            }
            Some((id, aliases)) => {
                conn.execute(
                    "UPDATE player SET name = ?1, ip_address = ?2, time_joined = ?3 WHERE guid = ?4",
                    params![name, ip, joined, guid],
                )?;
                let mut list: Vec<String> = aliases
                    .unwrap_or_default()
                    .split(", ")
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if !list.iter().any(|a| a == name) {
                    if list.len() < MAX_ALIASES {
                        list.push(name.to_string());
                    } else if !list.iter().any(|a| a == ALIAS_OVERFLOW) {
                        list.push(ALIAS_OVERFLOW.to_string());
                    }
                    conn.execute(
                        "UPDATE player SET aliases = ?1 WHERE guid = ?2",
                        params![list.join(", "), guid],
                    )?;
                }
                Ok((id, list))
            }
        }
    }

    /// Loads the statistics row for a registered identity, bumping the visit
    /// counters on the way. Returns the row as it stood before this visit.
    pub fn load_xlrstats(
        &self,
        guid: &str,
        name: &str,
        now: f64,
    ) -> Result<Option<XlrRow>, WardenError> {
        let conn = self.conn.lock();
        let row: Option<XlrRow> = conn
            .query_row(
                "SELECT last_played, first_seen, num_played, kills, deaths, headshots,
                        team_kills, team_death, max_kill_streak, suicides, admin_role
                 FROM xlrstats WHERE guid = ?1",
                params![guid],
                |row| {
                    Ok(XlrRow {
                        last_played: row.get(0)?,
                        first_seen: row.get(1)?,
                        num_played: row.get(2)?,
                        kills: row.get(3)?,
                        deaths: row.get(4)?,
                        headshots: row.get(5)?,
                        team_kills: row.get(6)?,
                        team_death: row.get(7)?,
                        max_kill_streak: row.get(8)?,
                        suicides: row.get(9)?,
                        admin_role: AdminRole::from_level(row.get::<_, i64>(10)? as u8),
                    })
                },
            )
            .optional()?;
        if row.is_some() {
            conn.execute(
                "UPDATE xlrstats SET name = ?1, last_played = ?2, num_played = num_played + 1
                 WHERE guid = ?3",
                params![name, stamp(now), guid],
            )?;
        }
        Ok(row)
    }

    /// Creates the statistics row for a newly registered user.
    pub fn register_user(
        &self,
        guid: &str,
        name: &str,
        ip: &str,
        role: AdminRole,
        now: f64,
    ) -> Result<(), WardenError> {
        let conn = self.conn.lock();
        let now = stamp(now);
        conn.execute(
            "INSERT INTO xlrstats (guid, name, ip_address, first_seen, last_played, num_played, admin_role)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            params![guid, name, ip, now, now, role.level() as i64],
        )?;
        Ok(())
    }

    pub fn set_admin_role(&self, guid: &str, role: AdminRole) -> Result<(), WardenError> {
        self.conn.lock().execute(
            "UPDATE xlrstats SET admin_role = ?1 WHERE guid = ?2",
            params![role.level() as i64, guid],
        )?;
        Ok(())
    }

    /// Flushes session aggregates into the statistics row.
    pub fn save_stats(&self, guid: &str, totals: &SessionTotals) -> Result<(), WardenError> {
        self.conn.lock().execute(
            "UPDATE xlrstats SET kills = ?1, deaths = ?2, headshots = ?3, team_kills = ?4,
                    team_death = ?5, max_kill_streak = ?6, suicides = ?7,
                    rounds = rounds + 1, ratio = ?8
             WHERE guid = ?9",
            params![
                totals.kills,
                totals.deaths,
                totals.head_shots,
                totals.tk_count,
                totals.team_death,
                totals.max_kill_streak,
                totals.suicides,
                totals.ratio,
                guid
            ],
        )?;
        Ok(())
    }

    pub fn has_head_admin(&self) -> Result<bool, WardenError> {
        let count: i64 = self.conn.lock().query_row(
            "SELECT COUNT(*) FROM xlrstats WHERE admin_role = 100",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // --- Bans --------------------------------------------------------------

    /// An active ban matching the guid or, failing that, the address.
    pub fn active_ban(
        &self,
        guid: &str,
        ip: &str,
        now: f64,
    ) -> Result<Option<(i64, String)>, WardenError> {
        let conn = self.conn.lock();
        let now = stamp(now);
        let by_guid: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, reason FROM ban_list WHERE guid = ?1 AND expires > ?2",
                params![guid, now],
                |row| Ok((row.get(0)?, row.get::<_, Option<String>>(1)?.unwrap_or_default())),
            )
            .optional()?;
        if by_guid.is_some() {
            return Ok(by_guid);
        }
        Ok(conn
            .query_row(
                "SELECT id, reason FROM ban_list WHERE ip_address = ?1 AND expires > ?2",
                params![ip, now],
                |row| Ok((row.get(0)?, row.get::<_, Option<String>>(1)?.unwrap_or_default())),
            )
            .optional()?)
    }

    /// Upserts a ban. Expiry per identity is monotone: an earlier expiry
    /// never shortens a stored one, a later expiry replaces it.
    pub fn ban(
        &self,
        guid: &str,
        name: &str,
        ip: &str,
        duration_secs: u64,
        reason: &str,
        now: f64,
    ) -> Result<BanOutcome, WardenError> {
        let conn = self.conn.lock();
        let expires = stamp(now + duration_secs as f64);
        let created = stamp(now);
        let stored: Option<String> = conn
            .query_row(
                "SELECT expires FROM ban_list WHERE guid = ?1",
                params![guid],
                |row| row.get(0),
            )
            .optional()?;
        match stored {
            Some(current) if current >= expires => {
                // Keep the longer ban, but record the latest address.
                conn.execute(
                    "UPDATE ban_list SET ip_address = ?1 WHERE guid = ?2",
                    params![ip, guid],
                )?;
                Ok(BanOutcome::Unchanged)
            }
            Some(_) => {
                conn.execute(
                    "UPDATE ban_list SET ip_address = ?1, expires = ?2, reason = ?3 WHERE guid = ?4",
                    params![ip, expires, reason, guid],
                )?;
                Ok(BanOutcome::Extended)
            }
            None => {
                conn.execute(
                    "INSERT INTO ban_list (guid, name, ip_address, expires, timestamp, reason)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![guid, name, ip, expires, created, reason],
                )?;
                Ok(BanOutcome::Inserted)
            }
        }
    }

    pub fn ban_expiry(&self, guid: &str) -> Result<Option<String>, WardenError> {
        Ok(self
            .conn
            .lock()
            .query_row(
                "SELECT expires FROM ban_list WHERE guid = ?1",
                params![guid],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Active bans, newest first.
    pub fn active_bans(&self, now: f64, limit: usize) -> Result<Vec<BanRecord>, WardenError> {
        self.select_bans(
            "SELECT id, guid, name, ip_address, expires, timestamp, reason
             FROM ban_list WHERE expires > ?1 ORDER BY id DESC LIMIT ?2",
            params![stamp(now), limit as i64],
        )
    }

    /// Most recently issued bans regardless of expiry.
    pub fn last_bans(&self, limit: usize) -> Result<Vec<BanRecord>, WardenError> {
        self.select_bans(
            "SELECT id, guid, name, ip_address, expires, timestamp, reason
             FROM ban_list ORDER BY id DESC LIMIT ?1",
            params![limit as i64],
        )
    }

    fn select_bans(
        &self,
        sql: &str,
        args: impl rusqlite::Params,
    ) -> Result<Vec<BanRecord>, WardenError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok(BanRecord {
                id: row.get(0)?,
                guid: row.get(1)?,
                name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                ip_address: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                expires: row.get(4)?,
                timestamp: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                reason: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn ban_by_id(&self, id: i64) -> Result<Option<BanRecord>, WardenError> {
        Ok(self
            .select_bans(
                "SELECT id, guid, name, ip_address, expires, timestamp, reason
                 FROM ban_list WHERE id = ?1",
                params![id],
            )?
            .into_iter()
            .next())
    }

    /// Removes a ban row; returns the record that was removed.
    pub fn unban(&self, id: i64) -> Result<Option<BanRecord>, WardenError> {
        let record = self.ban_by_id(id)?;
        if record.is_some() {
            self.conn
                .lock()
                .execute("DELETE FROM ban_list WHERE id = ?1", params![id])?;
        }
        Ok(record)
    }

    // --- Ban points --------------------------------------------------------

    /// Inserts a ban point and applies the escalation rule: more than two
    /// non-expired points convert into a ban of three times the last point's
    /// duration. Returns the ban length in minutes, or 0.
    pub fn add_ban_point(
        &self,
        guid: &str,
        name: &str,
        ip: &str,
        point_type: &str,
        duration_secs: u64,
        now: f64,
    ) -> Result<u64, WardenError> {
        {
            let conn = self.conn.lock();
            conn.execute(
                "INSERT INTO ban_points (guid, point_type, expires) VALUES (?1, ?2, ?3)",
                params![guid, point_type, stamp(now + duration_secs as f64)],
            )?;
        }
        let count = self.count_ban_points(guid, now)?;
        if count > 2 {
            let ban_secs = duration_secs * 3;
            self.ban(guid, name, ip, ban_secs, point_type, now)?;
            Ok(ban_secs / 60)
        } else {
            Ok(0)
        }
    }

    pub fn count_ban_points(&self, guid: &str, now: f64) -> Result<i64, WardenError> {
        Ok(self.conn.lock().query_row(
            "SELECT COUNT(*) FROM ban_points WHERE guid = ?1 AND expires > ?2",
            params![guid, stamp(now)],
            |row| row.get(0),
        )?)
    }

    pub fn clear_ban_points(&self, guid: &str, now: f64) -> Result<(), WardenError> {
        self.conn.lock().execute(
            "DELETE FROM ban_points WHERE guid = ?1 AND expires > ?2",
            params![guid, stamp(now)],
        )?;
        Ok(())
    }

    pub fn purge_expired_ban_points(&self, now: f64) -> Result<usize, WardenError> {
        Ok(self.conn.lock().execute(
            "DELETE FROM ban_points WHERE expires < ?1",
            params![stamp(now)],
        )?)
    }

    // --- Offline lookups ---------------------------------------------------

    /// Materialises the read-only shim for an `@<id>` target.
    pub fn offline_player(&self, player_id: i64) -> Result<Option<OfflinePlayer>, WardenError> {
        let conn = self.conn.lock();
        let identity: Option<(String, String, String, Option<String>)> = conn
            .query_row(
                "SELECT guid, name, ip_address, aliases FROM player WHERE id = ?1",
                params![player_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        let Some((guid, name, ip_address, aliases)) = identity else {
            return Ok(None);
        };
        let stats: Option<(Option<String>, i64)> = conn
            .query_row(
                "SELECT last_played, admin_role FROM xlrstats WHERE guid = ?1",
                params![guid],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (last_visit, admin_role, registered) = match stats {
            Some((last, role)) => (last, AdminRole::from_level(role as u8), true),
            None => (None, AdminRole::Guest, false),
        };
        Ok(Some(OfflinePlayer {
            player_id,
            guid,
            name,
            ip_address,
            admin_role,
            registered,
            last_visit,
            aliases: aliases
                .unwrap_or_default()
                .split(", ")
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }))
    }

    /// Name search over the identity table for `!lookup`.
    pub fn lookup_players(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<(i64, String, String)>, WardenError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, time_joined FROM player WHERE name LIKE ?1
             ORDER BY time_joined DESC LIMIT ?2",
        )?;
        let pattern = format!("%{fragment}%");
        let rows = stmt.query_map(params![pattern, limit as i64], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            ))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUID: &str = "0123456789ABCDEF0123456789ABCDEF";

    #[test]
    fn alias_ledger_caps_at_fifteen() {
        let db = Db::open_in_memory().unwrap();
        db.upsert_player(GUID, "name0", "10.0.0.1", 0.0).unwrap();
        for i in 1..20 {
            db.upsert_player(GUID, &format!("name{i}"), "10.0.0.1", i as f64)
                .unwrap();
        }
        let (_, aliases) = db.upsert_player(GUID, "name0", "10.0.0.1", 30.0).unwrap();
        assert_eq!(aliases.len(), MAX_ALIASES + 1);
        assert_eq!(aliases.last().map(String::as_str), Some(ALIAS_OVERFLOW));
    }

    #[test]
    fn ban_expiry_is_monotone() {
        let db = Db::open_in_memory().unwrap();
        let now = 1_000_000.0;
        assert_eq!(
            db.ban(GUID, "p", "10.0.0.1", 60, "tk", now).unwrap(),
            BanOutcome::Inserted
        );
        let stored = db.ban_expiry(GUID).unwrap().unwrap();
        // Shorter ban does not shrink the stored expiry.
        assert_eq!(
            db.ban(GUID, "p", "10.0.0.1", 30, "tk", now).unwrap(),
            BanOutcome::Unchanged
        );
        assert_eq!(db.ban_expiry(GUID).unwrap().unwrap(), stored);
        // Longer ban replaces it.
        assert_eq!(
            db.ban(GUID, "p", "10.0.0.1", 300, "tk", now).unwrap(),
            BanOutcome::Extended
        );
        assert_eq!(db.ban_expiry(GUID).unwrap().unwrap(), stamp(now + 300.0));
    }

    #[test]
    fn ban_point_escalation_at_third_point() {
        let db = Db::open_in_memory().unwrap();
        let now = 1_000_000.0;
        assert_eq!(
            db.add_ban_point(GUID, "p", "10.0.0.1", "tk", 600, now).unwrap(),
            0
        );
        assert_eq!(
            db.add_ban_point(GUID, "p", "10.0.0.1", "tk", 600, now).unwrap(),
            0
        );
        // Third active point: banned for 3x the last duration.
        assert_eq!(
            db.add_ban_point(GUID, "p", "10.0.0.1", "tk", 600, now).unwrap(),
            30
        );
        assert!(db.active_ban(GUID, "10.0.0.1", now).unwrap().is_some());
    }

    #[test]
    fn expired_ban_points_do_not_count() {
        let db = Db::open_in_memory().unwrap();
        let now = 1_000_000.0;
        db.add_ban_point(GUID, "p", "10.0.0.1", "tk", 600, now).unwrap();
        assert_eq!(db.count_ban_points(GUID, now + 700.0).unwrap(), 0);
        assert_eq!(db.purge_expired_ban_points(now + 700.0).unwrap(), 1);
    }

    #[test]
    fn active_ban_matches_ip_fallback() {
        let db = Db::open_in_memory().unwrap();
        let now = 1_000_000.0;
        db.ban(GUID, "p", "10.0.0.9", 600, "aimbot", now).unwrap();
        let hit = db
            .active_ban("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF", "10.0.0.9", now)
            .unwrap();
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().1, "aimbot");
    }

    #[test]
    fn offline_player_roundtrip() {
        let db = Db::open_in_memory().unwrap();
        let (id, _) = db.upsert_player(GUID, "Smoker", "10.0.0.2", 5.0).unwrap();
        db.register_user(GUID, "Smoker", "10.0.0.2", AdminRole::Moderator, 5.0)
            .unwrap();
        let shim = db.offline_player(id).unwrap().unwrap();
        assert_eq!(shim.name, "Smoker");
        assert_eq!(shim.admin_role, AdminRole::Moderator);
        assert!(shim.registered);
        assert!(db.offline_player(9999).unwrap().is_none());
    }

    #[test]
    fn head_admin_probe() {
        let db = Db::open_in_memory().unwrap();
        assert!(!db.has_head_admin().unwrap());
        db.register_user(GUID, "boss", "10.0.0.3", AdminRole::HeadAdmin, 1.0)
            .unwrap();
        assert!(db.has_head_admin().unwrap());
    }
}
