use urtwarden::core::WardenError;
use urtwarden::core::commands::targeting::{Target, resolve, resolve_online};
use urtwarden::core::db::Db;
use urtwarden::core::game::Game;
use urtwarden::core::game::gametype::Team;
use urtwarden::core::game::player::Player;
use urtwarden::core::game::roles::AdminRole;
use urtwarden::core::rcon::RconHandle;

fn fixture() -> (Game, Db) {
    let game = {
        let rcon = RconHandle::new();
        let mut game = Game::new(rcon);
        for (slot, name) in [(10u16, "Alice"), (11, "alicia"), (12, "Bob")] {
            let guid = format!("{slot:032}");
            let mut p = Player::new(slot, "10.0.0.1", &guid, name, 0.0);
            p.team = Team::Red;
            game.add_player(p);
        }
        game
    };
    (game, Db::open_in_memory().unwrap())
}

#[test]
fn test_substring_match_is_ambiguous() {
    let (game, db) = fixture();
    let err = resolve(&game, &db, "Ali").unwrap_err();
    let WardenError::TargetAmbiguous(listing) = err else {
        panic!("expected ambiguity");
    };
    assert!(listing.contains("Alice"));
    assert!(listing.contains("alicia"));
}

#[test]
fn test_slot_number_is_exact() {
    let (game, db) = fixture();
    let Target::Online(slot) = resolve(&game, &db, "10").unwrap() else {
        panic!("expected online target");
    };
    assert_eq!(slot, 10);
}

#[test]
fn test_exact_name_wins_over_substring() {
    let (game, db) = fixture();
    // "Alice" is an exact (case-insensitive) name even though it is also a
    // substring of nothing else; "alice" must not be ambiguous.
    let Target::Online(slot) = resolve(&game, &db, "alice").unwrap() else {
        panic!("expected online target");
    };
    assert_eq!(slot, 10);
}

#[test]
fn test_unique_substring_resolves() {
    let (game, db) = fixture();
    assert_eq!(resolve_online(&game, &db, "bo").unwrap(), 12);
}

#[test]
fn test_unknown_target_not_found() {
    let (game, db) = fixture();
    assert!(matches!(
        resolve(&game, &db, "nobody"),
        Err(WardenError::TargetNotFound(_))
    ));
}

#[test]
fn test_world_slot_is_never_a_target() {
    let (game, db) = fixture();
    assert!(resolve(&game, &db, "1022").is_err());
    assert!(resolve(&game, &db, "World").is_err());
}

#[test]
fn test_offline_target_by_database_id() {
    let (game, db) = fixture();
    let guid = "FEDCBA9876543210FEDCBA9876543210";
    let (id, _) = db.upsert_player(guid, "Sleeper", "10.0.0.9", 5.0).unwrap();
    db.register_user(guid, "Sleeper", "10.0.0.9", AdminRole::Regular, 5.0)
        .unwrap();
    let Target::Offline(shim) = resolve(&game, &db, &format!("@{id}")).unwrap() else {
        panic!("expected offline target");
    };
    assert_eq!(shim.name, "Sleeper");
    assert_eq!(shim.admin_role, AdminRole::Regular);
    // Offline shims do not satisfy online-only commands.
    assert!(resolve_online(&game, &db, &format!("@{id}")).is_err());
}
