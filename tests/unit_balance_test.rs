use urtwarden::core::game::gametype::Team;
use urtwarden::core::game::player::Player;
use urtwarden::core::game::Game;
use urtwarden::core::rcon::RconHandle;

fn live_game() -> Game {
    let rcon = RconHandle::new();
    rcon.go_live();
    Game::new(rcon)
}

fn join(game: &mut Game, slot: u16, team: Team, joined: f64) {
    let guid = format!("{slot:032}");
    let mut p = Player::new(slot, "10.0.0.1", &guid, &format!("player{slot}"), joined);
    p.team = team;
    game.add_player(p);
}

#[test]
fn test_balance_reaches_parity() {
    let mut game = live_game();
    for (slot, joined) in [(1u16, 10.0), (2, 20.0), (3, 30.0), (4, 40.0), (5, 50.0), (6, 60.0)] {
        join(&mut game, slot, Team::Red, joined);
    }
    join(&mut game, 7, Team::Blue, 5.0);
    join(&mut game, 8, Team::Blue, 6.0);

    let moved = game.balance_teams();
    assert_eq!(moved.len(), 2);
    let (red, blue, _) = game.team_counts();
    assert!((red as i64 - blue as i64).abs() <= 1);
}

#[test]
fn test_balance_moves_most_recent_joiners_first() {
    let mut game = live_game();
    for (slot, joined) in [(1u16, 100.0), (2, 50.0), (3, 200.0), (4, 10.0)] {
        join(&mut game, slot, Team::Red, joined);
    }
    join(&mut game, 5, Team::Blue, 1.0);
    // Red 4 vs blue 1: one player moves, the latest joiner (slot 3).
    assert_eq!(game.balance_teams(), vec![3]);
}

#[test]
fn test_balance_skips_team_locked_players() {
    let mut game = live_game();
    for (slot, joined) in [(1u16, 1.0), (2, 2.0), (3, 3.0), (4, 4.0), (5, 5.0)] {
        join(&mut game, slot, Team::Red, joined);
    }
    game.player_mut(5).unwrap().team_lock = Some(Team::Red);
    let moved = game.balance_teams();
    assert!(!moved.contains(&5));
    assert_eq!(moved, vec![4, 3]);
}

#[test]
fn test_balanced_teams_are_left_alone() {
    let mut game = live_game();
    join(&mut game, 1, Team::Red, 1.0);
    join(&mut game, 2, Team::Blue, 2.0);
    assert!(game.balance_teams().is_empty());
}

#[test]
fn test_spectators_never_move() {
    let mut game = live_game();
    for (slot, joined) in [(1u16, 1.0), (2, 2.0), (3, 3.0)] {
        join(&mut game, slot, Team::Red, joined);
    }
    join(&mut game, 9, Team::Spectator, 99.0);
    let moved = game.balance_teams();
    assert!(!moved.contains(&9));
}
