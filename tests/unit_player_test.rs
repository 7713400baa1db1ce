use urtwarden::core::game::player::{Player, TK_WARNING};

fn player(slot: u16) -> Player {
    let guid = format!("{slot:032}");
    Player::new(slot, "10.0.0.4", &guid, &format!("p{slot}"), 1000.0)
}

#[test]
fn test_streak_law_on_kill_and_death() {
    let mut p = player(4);
    for t in 0..7 {
        let before = p.killing_streak;
        p.kill(1000.0 + t as f64 * 10.0);
        assert_eq!(p.killing_streak, before + 1);
        assert!(p.max_kill_streak <= p.killing_streak.max(p.max_kill_streak));
    }
    let peak = p.killing_streak;
    p.die();
    assert_eq!(p.killing_streak, 0);
    assert!(p.max_kill_streak >= peak);
}

#[test]
fn test_multi_kill_window() {
    let mut p = player(4);
    p.kill(100.0);
    p.kill(103.0);
    p.kill(104.5);
    assert_eq!(p.multi_kill_count, 3);
    p.kill(200.0);
    assert_eq!(p.multi_kill_count, 1);
}

#[test]
fn test_losing_streak_resets_on_kill() {
    let mut p = player(4);
    for _ in 0..6 {
        p.die();
    }
    assert_eq!(p.losing_streak, 6);
    p.kill(1.0);
    assert_eq!(p.losing_streak, 0);
}

#[test]
fn test_forgive_law_removes_exactly_one_each_side() {
    let mut victim = player(4);
    let mut killer = player(7);
    for _ in 0..2 {
        killer.add_tk_victim(4);
        killer.add_warning(TK_WARNING, true, 1000.0);
        victim.add_killed_me(7);
    }

    assert!(victim.forgive_killer(7));
    killer.forgiven_by(4);

    assert_eq!(victim.killed_me.len(), 1);
    assert_eq!(killer.tk_victims.len(), 1);
    assert_eq!(killer.warning_count(), 1);
}

#[test]
fn test_warning_expiry_invariant() {
    let mut p = player(4);
    p.add_warning("camping", true, 1000.0);
    p.add_warning("camping", true, 1100.0);

    // Inside the window the warnings stay.
    p.expire_warnings(1200.0, 240.0);
    assert_eq!(p.warning_count(), 2);

    // Past the window the list clears entirely.
    p.expire_warnings(1341.0, 240.0);
    assert_eq!(p.warning_count(), 0);
    assert_eq!(p.last_warn_time, 0.0);
}

#[test]
fn test_ping_warning_does_not_refresh_the_timer() {
    let mut p = player(4);
    p.add_warning("camping", true, 1000.0);
    p.add_high_ping(450);
    assert_eq!(p.last_warn_time, 1000.0);
    assert_eq!(p.high_ping_count(), 1);
    p.clear_high_ping();
    assert_eq!(p.high_ping_count(), 0);
    assert_eq!(p.warning_count(), 1);
}

#[test]
fn test_grudge_forgives_and_remembers() {
    let mut victim = player(4);
    victim.add_killed_me(7);
    victim.add_killed_me(7);
    victim.grudge(7);
    assert!(victim.killed_me.is_empty());
    assert!(victim.grudged.contains(&7));
}

#[test]
fn test_match_reset_can_preserve_headshots_and_streaks() {
    let mut p = player(4);
    p.kill(1.0);
    p.headshot();
    p.die();
    p.reset_match(false, false);
    assert_eq!(p.head_shots, 1);
    assert_eq!(p.max_kill_streak, 1);
    assert_eq!(p.kills, 0);
    p.reset_match(true, true);
    assert_eq!(p.head_shots, 0);
    assert_eq!(p.max_kill_streak, 0);
}

#[test]
fn test_session_totals_ratio() {
    let mut p = player(4);
    for t in 0..3 {
        p.kill(t as f64);
    }
    p.die();
    let totals = p.session_totals();
    assert_eq!(totals.kills, 3);
    assert_eq!(totals.deaths, 1);
    assert!((totals.ratio - 3.0).abs() < f64::EPSILON);

    let fresh = player(5);
    assert!((fresh.session_totals().ratio - 1.0).abs() < f64::EPSILON);
}
