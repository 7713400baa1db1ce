use urtwarden::core::game::gametype::Gametype;
use urtwarden::core::game::modversion::ModVersion;
use urtwarden::core::parser::{BombAction, Event};

#[test]
fn test_init_game_ctf_43() {
    let line =
        "  0:00 InitGame: \\g_gametype\\7\\g_gear\\KQ\\g_modversion\\4.3.4\\mapname\\ut4_dust2_v2";
    let Some(Event::InitGame(info)) = Event::parse(line).unwrap() else {
        panic!("expected InitGame");
    };
    assert_eq!(info.gametype, Some(Gametype::Ctf));
    assert_eq!(info.modversion, Some(ModVersion::V43));
    assert_eq!(info.gear.as_deref(), Some("KQ"));
    assert_eq!(info.mapname.as_deref(), Some("ut4_dust2_v2"));
}

#[test]
fn test_init_game_bomb_41() {
    let line = "  0:00 InitGame: \\g_gametype\\8\\g_modversion\\4.1.1";
    let Some(Event::InitGame(info)) = Event::parse(line).unwrap() else {
        panic!("expected InitGame");
    };
    assert_eq!(info.gametype, Some(Gametype::Bomb));
    assert_eq!(info.modversion, Some(ModVersion::V41));
}

#[test]
fn test_client_lifecycle_lines() {
    assert_eq!(
        Event::parse("  0:05 ClientBegin: 4").unwrap(),
        Some(Event::ClientBegin { slot: 4 })
    );
    assert_eq!(
        Event::parse("  0:09 ClientSpawn: 4").unwrap(),
        Some(Event::ClientSpawn { slot: 4 })
    );
    assert_eq!(
        Event::parse(" 12:00 ClientDisconnect: 4").unwrap(),
        Some(Event::ClientDisconnect { slot: 4 })
    );
}

#[test]
fn test_userinfo_carries_guid_and_ip() {
    let line = "  0:02 ClientUserinfo: 11 \\ip\\192.168.2.7:27960\\name\\UrT Player\\cl_guid\\0123456789ABCDEF0123456789ABCDEF";
    let Some(Event::ClientUserinfo { slot, info }) = Event::parse(line).unwrap() else {
        panic!("expected ClientUserinfo");
    };
    assert_eq!(slot, 11);
    assert_eq!(
        info.get("ip").map(String::as_str),
        Some("192.168.2.7:27960")
    );
    assert_eq!(info.get("name").map(String::as_str), Some("UrT Player"));
}

#[test]
fn test_kill_and_world_kill() {
    assert_eq!(
        Event::parse(" 12:34 Kill: 3 7 19: Gunner killed Runner by UT_MOD_LR300").unwrap(),
        Some(Event::Kill {
            killer: 3,
            victim: 7,
            cause_id: 19,
            world_kill: false,
        })
    );
    let Some(Event::Kill { world_kill, .. }) =
        Event::parse("  3:02 Kill: 1022 4 9: <non-client> killed Faller by MOD_TRIGGER_HURT")
            .unwrap()
    else {
        panic!("expected Kill");
    };
    assert!(world_kill);
}

#[test]
fn test_say_command_line() {
    assert_eq!(
        Event::parse("  9:41 say: 5 Chatter: !kick Noob flaming").unwrap(),
        Some(Event::Say {
            slot: 5,
            name: "Chatter".to_string(),
            text: "!kick Noob flaming".to_string(),
        })
    );
}

#[test]
fn test_bomb_prose_lines() {
    assert_eq!(
        Event::parse("  2:01 Bomb was planted by 4!").unwrap(),
        Some(Event::Bomb {
            action: BombAction::Planted,
            slot: 4,
        })
    );
    assert_eq!(
        Event::parse("  2:20 Bomb was defused by 9!").unwrap(),
        Some(Event::Bomb {
            action: BombAction::Defused,
            slot: 9,
        })
    );
    assert_eq!(
        Event::parse("  2:31 Bombholder is 6").unwrap(),
        Some(Event::Bomb {
            action: BombAction::Holder,
            slot: 6,
        })
    );
    assert_eq!(Event::parse("  2:40 Pop!").unwrap(), Some(Event::Pop));
}

#[test]
fn test_flag_and_capture_time() {
    assert_eq!(
        Event::parse("  4:00 Flag: 3 2: team_CTF_redflag").unwrap(),
        Some(Event::Flag { slot: 3, action: 2 })
    );
    assert_eq!(
        Event::parse("  4:00 FlagCaptureTime: 3: 14250").unwrap(),
        Some(Event::FlagCaptureTime {
            slot: 3,
            millis: 14250,
        })
    );
}

#[test]
fn test_unknown_lines_are_ignored() {
    assert_eq!(Event::parse("  0:00 Item: 3 ut_item_medkit").unwrap(), None);
    assert_eq!(Event::parse("broken").unwrap(), None);
    assert_eq!(Event::parse("").unwrap(), None);
}

#[test]
fn test_malformed_tracked_line_is_an_error() {
    assert!(Event::parse("  0:00 Kill: x y z: nonsense").is_err());
    assert!(Event::parse("  0:00 ClientBegin: abc").is_err());
}
