//! Shared fixture: a daemon wired to an in-memory store and an RCON socket
//! that never transmits (the dispatcher worker is not spawned, so enqueued
//! commands stay observable in the queue).

use std::io::Write;
use std::sync::Arc;
use urtwarden::config::Config;
use urtwarden::core::Daemon;
use urtwarden::core::db::Db;
use urtwarden::core::game::gametype::Team;
use urtwarden::core::game::player::Player;
use urtwarden::core::game::roles::AdminRole;
use urtwarden::core::geoip::NoGeoIp;
use urtwarden::core::rcon::{RconClient, RconHandle};

/// Extra `[bot]` lines appended to the fixture configuration.
pub async fn daemon_with(bot_extra: &str) -> Arc<Daemon> {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "[server]\n\
         log_file = /var/log/games.log\n\
         server_ip = 127.0.0.1\n\
         server_port = 27960\n\
         rcon_password = secret\n\
         \n\
         [bot]\n\
         {bot_extra}\n"
    )
    .unwrap();
    let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
    let db = Db::open_in_memory().unwrap();
    let rcon = RconHandle::new();
    rcon.go_live();
    let client = Arc::new(
        RconClient::connect("127.0.0.1:27960", "secret")
            .await
            .unwrap(),
    );
    Daemon::new(config, db, rcon, client, Box::new(NoGeoIp)).unwrap()
}

pub fn join(daemon: &Arc<Daemon>, slot: u16, name: &str, team: Team, role: AdminRole) {
    let guid = format!("{slot:032}");
    let mut p = Player::new(slot, &format!("10.0.0.{slot}"), &guid, name, 0.0);
    p.team = team;
    p.admin_role = role;
    daemon.game.lock().add_player(p);
}

/// Drains every queued RCON command.
pub fn drain(daemon: &Arc<Daemon>) -> Vec<String> {
    std::iter::from_fn(|| daemon.rcon.pop()).collect()
}
