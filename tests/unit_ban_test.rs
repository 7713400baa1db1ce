use urtwarden::core::db::{BanOutcome, Db, stamp};
use urtwarden::core::game::roles::AdminRole;

const GUID: &str = "0123456789ABCDEF0123456789ABCDEF";
const NOW: f64 = 1_700_000_000.0;

#[test]
fn test_ban_insert_then_shorter_is_rejected() {
    let db = Db::open_in_memory().unwrap();
    assert_eq!(
        db.ban(GUID, "Griefer", "10.0.0.7", 60, "tk", NOW).unwrap(),
        BanOutcome::Inserted
    );
    let stored = db.ban_expiry(GUID).unwrap().unwrap();
    assert_eq!(stored, stamp(NOW + 60.0));

    // A shorter ban leaves the stored expiry untouched.
    assert_eq!(
        db.ban(GUID, "Griefer", "10.0.0.7", 30, "tk", NOW).unwrap(),
        BanOutcome::Unchanged
    );
    assert_eq!(db.ban_expiry(GUID).unwrap().unwrap(), stored);
}

#[test]
fn test_ban_longer_replaces() {
    let db = Db::open_in_memory().unwrap();
    db.ban(GUID, "Griefer", "10.0.0.7", 60, "tk", NOW).unwrap();
    assert_eq!(
        db.ban(GUID, "Griefer", "10.0.0.7", 300, "tk", NOW).unwrap(),
        BanOutcome::Extended
    );
    assert_eq!(db.ban_expiry(GUID).unwrap().unwrap(), stamp(NOW + 300.0));
}

#[test]
fn test_active_ban_lookup_by_guid_and_ip() {
    let db = Db::open_in_memory().unwrap();
    db.ban(GUID, "Griefer", "10.0.0.7", 600, "wallhack", NOW)
        .unwrap();
    assert!(db.active_ban(GUID, "1.2.3.4", NOW).unwrap().is_some());
    assert!(
        db.active_ban("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF", "10.0.0.7", NOW)
            .unwrap()
            .is_some()
    );
    // Expired bans do not match.
    assert!(db.active_ban(GUID, "10.0.0.7", NOW + 601.0).unwrap().is_none());
}

#[test]
fn test_ban_points_escalate_after_two_active_points() {
    let db = Db::open_in_memory().unwrap();
    assert_eq!(
        db.add_ban_point(GUID, "Griefer", "10.0.0.7", "tk", 600, NOW)
            .unwrap(),
        0
    );
    assert_eq!(
        db.add_ban_point(GUID, "Griefer", "10.0.0.7", "tk", 600, NOW)
            .unwrap(),
        0
    );
    // Third active point: automatic ban of three times the duration.
    assert_eq!(
        db.add_ban_point(GUID, "Griefer", "10.0.0.7", "tk", 600, NOW)
            .unwrap(),
        30
    );
    let (_, reason) = db.active_ban(GUID, "10.0.0.7", NOW).unwrap().unwrap();
    assert_eq!(reason, "tk");
}

#[test]
fn test_expired_points_are_not_counted_and_purged() {
    let db = Db::open_in_memory().unwrap();
    db.add_ban_point(GUID, "Griefer", "10.0.0.7", "lang", 300, NOW)
        .unwrap();
    db.add_ban_point(GUID, "Griefer", "10.0.0.7", "lang", 300, NOW)
        .unwrap();
    // Both aged out; a later point starts from a clean slate.
    assert_eq!(
        db.add_ban_point(GUID, "Griefer", "10.0.0.7", "lang", 300, NOW + 400.0)
            .unwrap(),
        0
    );
    assert_eq!(db.purge_expired_ban_points(NOW + 400.0).unwrap(), 2);
}

#[test]
fn test_unban_removes_the_row() {
    let db = Db::open_in_memory().unwrap();
    db.ban(GUID, "Griefer", "10.0.0.7", 600, "tk", NOW).unwrap();
    let (id, _) = db.active_ban(GUID, "10.0.0.7", NOW).unwrap().unwrap();
    let removed = db.unban(id).unwrap().unwrap();
    assert_eq!(removed.guid, GUID);
    assert!(db.active_ban(GUID, "10.0.0.7", NOW).unwrap().is_none());
    assert!(db.unban(id).unwrap().is_none());
}

#[test]
fn test_register_and_role_update() {
    let db = Db::open_in_memory().unwrap();
    db.upsert_player(GUID, "Rookie", "10.0.0.2", NOW).unwrap();
    db.register_user(GUID, "Rookie", "10.0.0.2", AdminRole::User, NOW)
        .unwrap();
    db.set_admin_role(GUID, AdminRole::Moderator).unwrap();
    let row = db.load_xlrstats(GUID, "Rookie", NOW).unwrap().unwrap();
    assert_eq!(row.admin_role, AdminRole::Moderator);
    assert_eq!(row.num_played, 1);
    // The load bumped the visit counter.
    let row = db.load_xlrstats(GUID, "Rookie", NOW).unwrap().unwrap();
    assert_eq!(row.num_played, 2);
}
