mod common;

use common::{daemon_with, drain, join};
use urtwarden::core::game::gametype::{Gametype, Team};
use urtwarden::core::game::player::TK_WARNING;
use urtwarden::core::game::roles::AdminRole;
use urtwarden::core::handlers::handle_event;
use urtwarden::core::parser::Event;

/// UT_MOD_M4 on a 4.2+ server.
const M4: u8 = 38;

fn kill(killer: u16, victim: u16, cause_id: u8) -> Event {
    Event::Kill {
        killer,
        victim,
        cause_id,
        world_kill: false,
    }
}

#[tokio::test]
async fn test_teamkill_ladder_bans_on_fourth_distinct_victim() {
    let daemon = daemon_with("teamkill_autokick = true").await;
    daemon.game.lock().gametype = Gametype::Tdm;
    join(&daemon, 1, "Griefer", Team::Red, AdminRole::Guest);
    for (slot, name) in [(2u16, "V1"), (3, "V2"), (4, "V3"), (5, "V4")] {
        join(&daemon, slot, name, Team::Red, AdminRole::Guest);
    }

    for victim in [2u16, 3, 4] {
        handle_event(&daemon, kill(1, victim, M4)).await;
    }
    {
        let game = daemon.game.lock();
        let griefer = game.player(1).unwrap();
        assert_eq!(griefer.tk_count, 3);
        assert_eq!(
            griefer
                .warnings
                .iter()
                .filter(|w| *w == TK_WARNING)
                .count(),
            3
        );
    }
    drain(&daemon);

    // Fourth distinct victim crosses the limit: 10 minute ban plus kick.
    handle_event(&daemon, kill(1, 5, M4)).await;
    let guid = daemon.game.lock().player(1).unwrap().guid.clone();
    let now = urtwarden::core::game::now_secs();
    assert!(daemon.db.active_ban(&guid, "10.0.0.1", now).unwrap().is_some());

    let sent = drain(&daemon);
    assert!(sent.iter().any(|c| c.starts_with("kick 1")));
    assert!(sent.iter().any(|c| c.contains("banned for") && c.contains("10 minutes")));
}

#[tokio::test]
async fn test_same_victim_does_not_cross_the_limit() {
    let daemon = daemon_with("teamkill_autokick = true").await;
    daemon.game.lock().gametype = Gametype::Tdm;
    join(&daemon, 1, "Griefer", Team::Red, AdminRole::Guest);
    join(&daemon, 2, "Victim", Team::Red, AdminRole::Guest);

    for _ in 0..4 {
        handle_event(&daemon, kill(1, 2, M4)).await;
    }
    let guid = daemon.game.lock().player(1).unwrap().guid.clone();
    let now = urtwarden::core::game::now_secs();
    assert!(daemon.db.active_ban(&guid, "10.0.0.1", now).unwrap().is_none());
    assert_eq!(daemon.game.lock().player(1).unwrap().warning_count(), 4);
}

#[tokio::test]
async fn test_no_teamkill_accounting_in_ffa() {
    let daemon = daemon_with("teamkill_autokick = true").await;
    join(&daemon, 1, "Shooter", Team::Red, AdminRole::Guest);
    join(&daemon, 2, "Victim", Team::Red, AdminRole::Guest);

    handle_event(&daemon, kill(1, 2, M4)).await;
    let game = daemon.game.lock();
    assert_eq!(game.player(1).unwrap().tk_count, 0);
    assert_eq!(game.player(1).unwrap().kills, 1);
    assert_eq!(game.player(2).unwrap().deaths, 1);
}

#[tokio::test]
async fn test_regulars_are_not_punished_for_teamkills() {
    let daemon = daemon_with("teamkill_autokick = true").await;
    daemon.game.lock().gametype = Gametype::Tdm;
    join(&daemon, 1, "Trusted", Team::Red, AdminRole::Regular);
    join(&daemon, 2, "Victim", Team::Red, AdminRole::Guest);

    handle_event(&daemon, kill(1, 2, M4)).await;
    let game = daemon.game.lock();
    let trusted = game.player(1).unwrap();
    // Counted, but no warning ladder.
    assert_eq!(trusted.tk_count, 1);
    assert_eq!(trusted.warning_count(), 0);
    assert!(trusted.tk_victims.is_empty());
}

#[tokio::test]
async fn test_bombed_never_counts_as_teamkill() {
    let daemon = daemon_with("teamkill_autokick = true").await;
    {
        let mut game = daemon.game.lock();
        game.gametype = Gametype::Bomb;
    }
    join(&daemon, 1, "Planter", Team::Red, AdminRole::Guest);
    join(&daemon, 2, "Unlucky", Team::Red, AdminRole::Guest);

    // Cause 34 is UT_MOD_BOMBED on 4.2+.
    handle_event(&daemon, kill(1, 2, 34)).await;
    let game = daemon.game.lock();
    assert_eq!(game.player(1).unwrap().tk_count, 0);
    assert_eq!(game.player(1).unwrap().warning_count(), 0);
}

#[tokio::test]
async fn test_suicide_counts_against_the_victim_only() {
    let daemon = daemon_with("").await;
    join(&daemon, 2, "Faller", Team::Red, AdminRole::Guest);

    // MOD_FALLING blamed on the world.
    handle_event(
        &daemon,
        Event::Kill {
            killer: 1022,
            victim: 2,
            cause_id: 6,
            world_kill: true,
        },
    )
    .await;
    let game = daemon.game.lock();
    let faller = game.player(2).unwrap();
    assert_eq!(faller.deaths, 1);
    assert_eq!(faller.db_suicides, 1);
    assert_eq!(faller.kills, 0);
}

#[tokio::test]
async fn test_spawnkill_warning_and_smite() {
    let daemon = daemon_with(
        "spawnkill_autokick = true\ninstant_kill_spawnkiller = true\nspawnkill_warn_time = 3",
    )
    .await;
    join(&daemon, 1, "Camper", Team::Red, AdminRole::Guest);
    join(&daemon, 2, "Fresh", Team::Blue, AdminRole::Guest);

    handle_event(&daemon, Event::ClientSpawn { slot: 2 }).await;
    handle_event(&daemon, kill(1, 2, M4)).await;

    let game = daemon.game.lock();
    let camper = game.player(1).unwrap();
    assert!(camper.warnings.iter().any(|w| w == "stop spawn killing"));
    drop(game);
    let sent = drain(&daemon);
    assert!(sent.iter().any(|c| c == "smite 1"));
}
