// src/config.rs

//! Manages daemon configuration: loading the INI settings file and applying defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The `[server]` section: where the game server lives and how to reach it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfig {
    /// Full path of the games log file written by the server.
    pub log_file: String,
    #[serde(default = "default_server_ip")]
    pub server_ip: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    pub rcon_password: String,
    /// Minimum delay between two outbound RCON commands, in seconds.
    /// The server conflates packets that arrive closer together.
    #[serde(default = "default_rcon_delay")]
    pub rcon_delay: f64,
}

fn default_server_ip() -> String {
    "127.0.0.1".to_string()
}
fn default_server_port() -> u16 {
    27960
}
fn default_rcon_delay() -> f64 {
    0.3
}

/// The `[bot]` section: moderation policies and announcement switches.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BotConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Auto-kick team killers after repeated offenses.
    #[serde(default = "default_true")]
    pub teamkill_autokick: bool,
    /// Count team kills against bots like team kills against humans.
    #[serde(default)]
    pub allow_bots: bool,
    /// Maximum allowed ping before warnings start. `0` disables the check.
    #[serde(default = "default_max_ping")]
    pub max_ping: u16,
    /// Housekeeping cadence in seconds. Values below 10 are clamped to 10.
    #[serde(default = "default_task_frequency")]
    pub task_frequency: u64,
    /// Seconds after which a warning no longer counts.
    #[serde(default = "default_warn_expiration")]
    pub warn_expiration: u64,
    /// Admin level from which players are immune to automatic punishment.
    #[serde(default = "default_admin_immunity")]
    pub admin_immunity: u8,
    /// Warn spectators when more than this many players are connected. `0` disables.
    #[serde(default = "default_kick_spec")]
    pub kick_spec_full_server: u16,
    /// Kick players whose kill/death ratio stays below 1:3.
    #[serde(default)]
    pub noob_autokick: bool,
    #[serde(default)]
    pub autobalancer: bool,
    /// Defer `!teams` in round-based modes until the round ends.
    #[serde(default)]
    pub allow_teams_round_end: bool,
    #[serde(default)]
    pub spawnkill_autokick: bool,
    /// Smite a spawn killer on the spot (requires modversion 4.2 or later).
    #[serde(default)]
    pub instant_kill_spawnkiller: bool,
    /// Seconds after a respawn during which a kill counts as a spawn kill.
    #[serde(default = "default_spawnkill_warn_time")]
    pub spawnkill_warn_time: u64,
    /// Default ban length for `!ban`, in days.
    #[serde(default = "default_ban_duration_days")]
    pub ban_duration_days: u16,
    /// Smite surviving opponents when the bomb resolves (modversion > 4.1).
    #[serde(default)]
    pub kill_survived_opponents: bool,
    #[serde(default = "default_true")]
    pub show_country_on_connect: bool,
    #[serde(default = "default_true")]
    pub show_first_kill: bool,
    #[serde(default = "default_true")]
    pub show_multi_kill: bool,
    #[serde(default)]
    pub spam_knife_kills_msg: bool,
    #[serde(default)]
    pub spam_nade_kills_msg: bool,
    #[serde(default)]
    pub spam_headshot_hits_msg: bool,
    #[serde(default)]
    pub spam_bomb_planted_msg: bool,
    /// Reset headshot counters on map change instead of on match exit only.
    #[serde(default = "default_true")]
    pub reset_headshot_hits_mapcycle: bool,
    #[serde(default = "default_true")]
    pub reset_kill_spree_mapcycle: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            teamkill_autokick: true,
            allow_bots: false,
            max_ping: default_max_ping(),
            task_frequency: default_task_frequency(),
            warn_expiration: default_warn_expiration(),
            admin_immunity: default_admin_immunity(),
            kick_spec_full_server: default_kick_spec(),
            noob_autokick: false,
            autobalancer: false,
            allow_teams_round_end: false,
            spawnkill_autokick: false,
            instant_kill_spawnkiller: false,
            spawnkill_warn_time: default_spawnkill_warn_time(),
            ban_duration_days: default_ban_duration_days(),
            kill_survived_opponents: false,
            show_country_on_connect: true,
            show_first_kill: true,
            show_multi_kill: true,
            spam_knife_kills_msg: false,
            spam_nade_kills_msg: false,
            spam_headshot_hits_msg: false,
            spam_bomb_planted_msg: false,
            reset_headshot_hits_mapcycle: true,
            reset_kill_spree_mapcycle: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_max_ping() -> u16 {
    200
}
fn default_task_frequency() -> u64 {
    60
}
fn default_warn_expiration() -> u64 {
    240
}
fn default_admin_immunity() -> u8 {
    40
}
fn default_kick_spec() -> u16 {
    10
}
fn default_spawnkill_warn_time() -> u64 {
    3
}
fn default_ban_duration_days() -> u16 {
    7
}

/// How a rotation message is displayed in game.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RulesDisplay {
    #[default]
    Chat,
    Bigtext,
    Raw,
}

/// The `[rules]` section: the rotating-message broadcaster.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RulesConfig {
    #[serde(default)]
    pub show_rules: bool,
    #[serde(default = "default_rules_file")]
    pub rules_file: String,
    /// Seconds between two rotation messages. Values below 5 are clamped to 5.
    #[serde(default = "default_rules_frequency")]
    pub rules_frequency: u64,
    #[serde(default)]
    pub display: RulesDisplay,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            show_rules: false,
            rules_file: default_rules_file(),
            rules_frequency: default_rules_frequency(),
            display: RulesDisplay::Chat,
        }
    }
}

fn default_rules_file() -> String {
    "./conf/rules.conf".to_string()
}
fn default_rules_frequency() -> u64 {
    90
}

/// The `[lowgrav]` section: low-gravity server support.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LowGravConfig {
    #[serde(default)]
    pub support_lowgravity: bool,
    #[serde(default = "default_gravity")]
    pub gravity: u32,
}

impl Default for LowGravConfig {
    fn default() -> Self {
        Self {
            support_lowgravity: false,
            gravity: default_gravity(),
        }
    }
}

fn default_gravity() -> u32 {
    800
}

/// The `[mapcycle]` section: dynamic map rotation by player count.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MapcycleConfig {
    #[serde(default)]
    pub dynamic_mapcycle: bool,
    /// Player count at which the rotation switches from small cycle to big cycle.
    #[serde(default = "default_switch_count")]
    pub switch_count: u16,
    #[serde(default)]
    pub big_cycle: String,
    #[serde(default)]
    pub small_cycle: String,
}

impl Default for MapcycleConfig {
    fn default() -> Self {
        Self {
            dynamic_mapcycle: false,
            switch_count: default_switch_count(),
            big_cycle: String::new(),
            small_cycle: String::new(),
        }
    }
}

fn default_switch_count() -> u16 {
    4
}

/// The complete daemon configuration, one struct per INI section.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub lowgrav: LowGravConfig,
    #[serde(default)]
    pub mapcycle: MapcycleConfig,
}

impl Config {
    /// Loads the configuration from an INI file and applies defaults for
    /// every option the file does not set.
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Ini))
            .build()
            .with_context(|| format!("cannot read config file '{path}'"))?;

        let cfg: Config = settings
            .try_deserialize()
            .context("invalid configuration")?;

        if cfg.server.log_file.is_empty() {
            anyhow::bail!("server.log_file must be set");
        }
        if !(0.05..=5.0).contains(&cfg.server.rcon_delay) {
            anyhow::bail!("server.rcon_delay out of range (0.05..5.0)");
        }

        Ok(cfg)
    }

    /// The address `ip:port` the RCON client connects to.
    pub fn rcon_addr(&self) -> String {
        format!("{}:{}", self.server.server_ip, self.server.server_port)
    }
}
