mod common;

use common::{daemon_with, drain, join};
use urtwarden::core::commands;
use urtwarden::core::game::gametype::Team;
use urtwarden::core::game::roles::AdminRole;

#[tokio::test]
async fn test_permission_gate_denies_guests() {
    let daemon = daemon_with("").await;
    join(&daemon, 1, "Nobody", Team::Red, AdminRole::Guest);

    commands::dispatch(&daemon, 1, "!kick 2 reason");
    let sent = drain(&daemon);
    assert!(sent.iter().any(|c| c.contains("no permission")));
    assert!(!sent.iter().any(|c| c.starts_with("kick")));
}

#[tokio::test]
async fn test_ambiguous_target_lists_candidates() {
    let daemon = daemon_with("").await;
    join(&daemon, 1, "Boss", Team::Red, AdminRole::Admin);
    join(&daemon, 10, "Alice", Team::Blue, AdminRole::Guest);
    join(&daemon, 11, "alicia", Team::Blue, AdminRole::Guest);

    commands::dispatch(&daemon, 1, "!kick Ali flaming");
    let sent = drain(&daemon);
    let listing = sent
        .iter()
        .find(|c| c.contains("Players matching"))
        .expect("ambiguity listing");
    assert!(listing.contains("Alice"));
    assert!(listing.contains("alicia"));
    assert!(!sent.iter().any(|c| c.starts_with("kick")));
}

#[tokio::test]
async fn test_kick_by_slot_number() {
    let daemon = daemon_with("").await;
    join(&daemon, 1, "Boss", Team::Red, AdminRole::Admin);
    join(&daemon, 10, "Alice", Team::Blue, AdminRole::Guest);

    commands::dispatch(&daemon, 1, "!kick 10 flaming");
    let sent = drain(&daemon);
    assert!(sent.iter().any(|c| c.starts_with("kick 10")));
}

#[tokio::test]
async fn test_kick_requires_a_reason() {
    let daemon = daemon_with("").await;
    join(&daemon, 1, "Boss", Team::Red, AdminRole::Admin);
    join(&daemon, 10, "Alice", Team::Blue, AdminRole::Guest);

    commands::dispatch(&daemon, 1, "!kick Alice");
    let sent = drain(&daemon);
    assert!(sent.iter().any(|c| c.contains("You need to enter a reason")));
    assert!(!sent.iter().any(|c| c.starts_with("kick")));
}

#[tokio::test]
async fn test_admins_are_protected_from_lower_admins() {
    let daemon = daemon_with("").await;
    join(&daemon, 1, "Mod", Team::Red, AdminRole::Admin);
    join(&daemon, 2, "Senior", Team::Blue, AdminRole::SeniorAdmin);

    commands::dispatch(&daemon, 1, "!kick Senior abuse");
    let sent = drain(&daemon);
    assert!(sent.iter().any(|c| c.contains("cannot kick an admin")));
    assert!(!sent.iter().any(|c| c.starts_with("kick")));
}

#[tokio::test]
async fn test_register_creates_the_stats_row() {
    let daemon = daemon_with("").await;
    join(&daemon, 5, "Rookie", Team::Red, AdminRole::Guest);

    commands::dispatch(&daemon, 5, "!register");
    {
        let game = daemon.game.lock();
        let rookie = game.player(5).unwrap();
        assert!(rookie.registered);
        assert_eq!(rookie.admin_role, AdminRole::User);
    }
    let guid = format!("{:032}", 5);
    let row = daemon
        .db
        .load_xlrstats(&guid, "Rookie", 1.0)
        .unwrap()
        .expect("xlrstats row");
    assert_eq!(row.admin_role, AdminRole::User);
}

#[tokio::test]
async fn test_iamgod_bootstraps_only_once() {
    let daemon = daemon_with("").await;
    join(&daemon, 5, "Founder", Team::Red, AdminRole::Guest);
    join(&daemon, 6, "Latecomer", Team::Red, AdminRole::Guest);

    commands::dispatch(&daemon, 5, "!iamgod");
    assert_eq!(
        daemon.game.lock().player(5).unwrap().admin_role,
        AdminRole::HeadAdmin
    );
    assert!(daemon.db.has_head_admin().unwrap());

    commands::dispatch(&daemon, 6, "!iamgod");
    assert_eq!(
        daemon.game.lock().player(6).unwrap().admin_role,
        AdminRole::Guest
    );
}

#[tokio::test]
async fn test_putgroup_and_ungroup_roundtrip() {
    let daemon = daemon_with("").await;
    join(&daemon, 1, "Head", Team::Red, AdminRole::HeadAdmin);
    join(&daemon, 2, "Pupil", Team::Blue, AdminRole::Guest);

    commands::dispatch(&daemon, 1, "!putgroup Pupil mod");
    assert_eq!(
        daemon.game.lock().player(2).unwrap().admin_role,
        AdminRole::Moderator
    );

    commands::dispatch(&daemon, 1, "!ungroup Pupil");
    assert_eq!(
        daemon.game.lock().player(2).unwrap().admin_role,
        AdminRole::Guest
    );
}

#[tokio::test]
async fn test_tempban_writes_a_ban_row() {
    let daemon = daemon_with("").await;
    join(&daemon, 1, "Boss", Team::Red, AdminRole::Admin);
    join(&daemon, 10, "Cheat", Team::Blue, AdminRole::Guest);

    commands::dispatch(&daemon, 1, "!tempban Cheat 2h wallhack");
    let guid = format!("{:032}", 10);
    let now = urtwarden::core::game::now_secs();
    let ban = daemon.db.active_ban(&guid, "10.0.0.10", now).unwrap();
    assert!(ban.is_some());
    let sent = drain(&daemon);
    assert!(sent.iter().any(|c| c.contains("banned for") && c.contains("2 hours")));
    assert!(sent.iter().any(|c| c.starts_with("kick 10")));
}

#[tokio::test]
async fn test_unknown_command_is_reported_privately() {
    let daemon = daemon_with("").await;
    join(&daemon, 1, "Curious", Team::Red, AdminRole::Guest);

    commands::dispatch(&daemon, 1, "!frobnicate");
    let sent = drain(&daemon);
    assert!(sent.iter().any(|c| c.starts_with("tell 1") && c.contains("Unknown command")));
}

#[tokio::test]
async fn test_help_lists_only_reachable_commands() {
    let daemon = daemon_with("").await;
    join(&daemon, 1, "Guest", Team::Red, AdminRole::Guest);

    commands::dispatch(&daemon, 1, "!help");
    let sent = drain(&daemon);
    let listing = sent.iter().find(|c| c.contains("register")).expect("listing");
    assert!(!listing.contains("putgroup"));
    assert!(!listing.contains("tempban"));
}

#[tokio::test]
async fn test_broadcast_variant_goes_to_global_chat() {
    let daemon = daemon_with("").await;
    join(&daemon, 1, "Anyone", Team::Red, AdminRole::Guest);

    commands::dispatch(&daemon, 1, "@time");
    let sent = drain(&daemon);
    assert!(sent.iter().any(|c| c.starts_with("say ")));

    commands::dispatch(&daemon, 1, "!time");
    let sent = drain(&daemon);
    assert!(sent.iter().any(|c| c.starts_with("tell 1")));
}

#[tokio::test]
async fn test_force_with_lock_sets_the_team_lock() {
    let daemon = daemon_with("").await;
    join(&daemon, 1, "Boss", Team::Red, AdminRole::Admin);
    join(&daemon, 10, "Drifter", Team::Blue, AdminRole::Guest);

    commands::dispatch(&daemon, 1, "!force Drifter red lock");
    assert_eq!(
        daemon.game.lock().player(10).unwrap().team_lock,
        Some(Team::Red)
    );
    let sent = drain(&daemon);
    assert!(sent.iter().any(|c| c == "forceteam 10 red"));
}
