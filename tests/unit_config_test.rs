use std::io::Write;
use urtwarden::config::{Config, RulesDisplay};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_minimal_config_applies_defaults() {
    let file = write_config(
        "[server]\n\
         log_file = /var/log/urbanterror/games.log\n\
         rcon_password = secret\n",
    );
    let cfg = Config::from_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(cfg.server.server_ip, "127.0.0.1");
    assert_eq!(cfg.server.server_port, 27960);
    assert!((cfg.server.rcon_delay - 0.3).abs() < f64::EPSILON);
    assert!(cfg.bot.teamkill_autokick);
    assert_eq!(cfg.bot.max_ping, 200);
    assert_eq!(cfg.bot.task_frequency, 60);
    assert_eq!(cfg.bot.warn_expiration, 240);
    assert_eq!(cfg.bot.admin_immunity, 40);
    assert!(!cfg.bot.spawnkill_autokick);
    assert_eq!(cfg.bot.ban_duration_days, 7);
    assert!(!cfg.rules.show_rules);
    assert_eq!(cfg.rules.rules_frequency, 90);
    assert_eq!(cfg.rules.display, RulesDisplay::Chat);
    assert!(!cfg.lowgrav.support_lowgravity);
    assert_eq!(cfg.lowgrav.gravity, 800);
    assert!(!cfg.mapcycle.dynamic_mapcycle);
    assert_eq!(cfg.mapcycle.switch_count, 4);
    assert_eq!(cfg.rcon_addr(), "127.0.0.1:27960");
}

#[test]
fn test_full_config_overrides() {
    let file = write_config(
        "[server]\n\
         log_file = /opt/urt/games.log\n\
         server_ip = 10.1.2.3\n\
         server_port = 27970\n\
         rcon_password = hunter2\n\
         rcon_delay = 0.2\n\
         \n\
         [bot]\n\
         teamkill_autokick = false\n\
         max_ping = 300\n\
         task_frequency = 30\n\
         spawnkill_autokick = true\n\
         \n\
         [rules]\n\
         show_rules = true\n\
         rules_frequency = 45\n\
         display = bigtext\n\
         \n\
         [lowgrav]\n\
         support_lowgravity = true\n\
         gravity = 400\n\
         \n\
         [mapcycle]\n\
         dynamic_mapcycle = true\n\
         switch_count = 6\n\
         big_cycle = ut4_casa ut4_abbey ut4_turnpike\n\
         small_cycle = ut4_casa\n",
    );
    let cfg = Config::from_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(cfg.rcon_addr(), "10.1.2.3:27970");
    assert!(!cfg.bot.teamkill_autokick);
    assert_eq!(cfg.bot.max_ping, 300);
    assert!(cfg.bot.spawnkill_autokick);
    assert!(cfg.rules.show_rules);
    assert_eq!(cfg.rules.display, RulesDisplay::Bigtext);
    assert!(cfg.lowgrav.support_lowgravity);
    assert_eq!(cfg.lowgrav.gravity, 400);
    assert!(cfg.mapcycle.dynamic_mapcycle);
    assert_eq!(cfg.mapcycle.big_cycle, "ut4_casa ut4_abbey ut4_turnpike");
}

#[test]
fn test_missing_log_file_is_rejected() {
    let file = write_config("[server]\nlog_file =\nrcon_password = x\n");
    assert!(Config::from_file(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_unreasonable_rcon_delay_is_rejected() {
    let file = write_config(
        "[server]\nlog_file = /var/log/games.log\nrcon_password = x\nrcon_delay = 60\n",
    );
    assert!(Config::from_file(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(Config::from_file("/nonexistent/settings.conf").is_err());
}
