// src/core/parser/events.rs

//! The typed log events and the line decoder.
//!
//! Lines are shaped `" MM:SS EventName: payload"` with a seven-column
//! timestamp prefix. A line the decoder does not understand yields
//! `Ok(None)`; a line it understands but cannot parse yields an error the
//! tailer logs and skips. One bad line never stops the tail loop.

use crate::core::WardenError;
use crate::core::game::gametype::Gametype;
use crate::core::game::modversion::ModVersion;
use std::collections::HashMap;

/// Snapshot taken from an `InitGame` line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitInfo {
    pub gametype: Option<Gametype>,
    pub modversion: Option<ModVersion>,
    pub gear: Option<String>,
    pub mapname: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BombAction {
    Collected,
    Holder,
    Tossed,
    Planted,
    Defused,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    InitGame(InitInfo),
    Warmup,
    InitRound,
    Exit,
    ShutdownGame,
    ClientUserinfo {
        slot: u16,
        info: HashMap<String, String>,
    },
    ClientUserinfoChanged {
        slot: u16,
        team_id: Option<u8>,
        name: Option<String>,
    },
    ClientBegin {
        slot: u16,
    },
    ClientDisconnect {
        slot: u16,
    },
    ClientSpawn {
        slot: u16,
    },
    Kill {
        killer: u16,
        victim: u16,
        cause_id: u8,
        world_kill: bool,
    },
    Hit {
        victim: u16,
        hitter: u16,
        zone_id: u8,
        weapon_id: u8,
    },
    Flag {
        slot: u16,
        action: u8,
    },
    FlagCaptureTime {
        slot: u16,
        millis: u64,
    },
    Bomb {
        action: BombAction,
        slot: u16,
    },
    Pop,
    SurvivorWinner(String),
    Freeze {
        slot: u16,
    },
    ThawOutFinished {
        slot: u16,
    },
    Say {
        slot: u16,
        name: String,
        text: String,
    },
    SayTeam {
        slot: u16,
        name: String,
        text: String,
    },
    Callvote {
        slot: u16,
        text: String,
    },
    VotePassed,
    VoteFailed,
}

impl Event {
    /// Decodes one raw log line. `Ok(None)` means "not an event we track".
    pub fn parse(raw: &str) -> Result<Option<Event>, WardenError> {
        // Strip the seven-column timestamp prefix.
        let Some(line) = raw.get(7..) else {
            return Ok(None);
        };
        // Bomb prose and `Pop` carry no colon at all.
        let (name, payload) = match line.split_once(':') {
            Some((n, p)) => (n.trim(), p.trim_end_matches('\n').trim()),
            None => (line.trim(), ""),
        };

        let event = match name {
            "InitGame" => Some(Event::InitGame(parse_init(payload))),
            "Warmup" => Some(Event::Warmup),
            "InitRound" => Some(Event::InitRound),
            "Exit" => Some(Event::Exit),
            "ShutdownGame" => Some(Event::ShutdownGame),
            "ClientUserinfo" => {
                let (slot, rest) = split_slot(payload)?;
                Some(Event::ClientUserinfo {
                    slot,
                    info: explode(rest),
                })
            }
            "ClientUserinfoChanged" => {
                let (slot, rest) = split_slot(payload)?;
                let values = explode(rest);
                Some(Event::ClientUserinfoChanged {
                    slot,
                    team_id: values.get("t").and_then(|t| t.parse().ok()),
                    name: values.get("n").cloned(),
                })
            }
            "ClientBegin" => Some(Event::ClientBegin {
                slot: parse_slot(payload)?,
            }),
            "ClientDisconnect" => Some(Event::ClientDisconnect {
                slot: parse_slot(payload)?,
            }),
            "ClientSpawn" => Some(Event::ClientSpawn {
                slot: parse_slot(payload)?,
            }),
            "Kill" => Some(parse_kill(payload)?),
            "Hit" => Some(parse_hit(payload)?),
            "Flag" => {
                let fields = int_fields(payload, 2)?;
                Some(Event::Flag {
                    slot: fields[0] as u16,
                    action: fields[1] as u8,
                })
            }
            "FlagCaptureTime" => {
                let (slot, rest) = split_slot(payload)?;
                Some(Event::FlagCaptureTime {
                    slot,
                    millis: rest.trim().trim_start_matches(':').trim().parse()?,
                })
            }
            "SurvivorWinner" => Some(Event::SurvivorWinner(payload.to_string())),
            "Freeze" => Some(Event::Freeze {
                slot: parse_slot(payload)?,
            }),
            "ThawOutFinished" => Some(Event::ThawOutFinished {
                slot: parse_slot(payload)?,
            }),
            "say" => parse_say(payload)?.map(|(slot, name, text)| Event::Say { slot, name, text }),
            "sayteam" => {
                parse_say(payload)?.map(|(slot, name, text)| Event::SayTeam { slot, name, text })
            }
            "Callvote" => {
                let (slot, rest) = split_slot(payload)?;
                Some(Event::Callvote {
                    slot,
                    text: rest.trim().to_string(),
                })
            }
            "VotePassed" => Some(Event::VotePassed),
            "VoteFailed" => Some(Event::VoteFailed),
            _ if name.starts_with("Pop") => Some(Event::Pop),
            _ if name.starts_with("Bomb") => parse_bomb(name, payload)?,
            _ => None,
        };
        Ok(event)
    }
}

/// Splits a `\key\value\...` payload into a map.
pub fn explode(payload: &str) -> HashMap<String, String> {
    let trimmed = payload.trim_start().trim_start_matches('\\');
    let mut values = HashMap::new();
    let mut parts = trimmed.split('\\');
    while let (Some(key), Some(val)) = (parts.next(), parts.next()) {
        values.insert(key.trim().to_string(), val.trim().to_string());
    }
    values
}

fn parse_init(payload: &str) -> InitInfo {
    let values = explode(payload);
    InitInfo {
        gametype: values
            .get("g_gametype")
            .and_then(|g| g.parse::<u8>().ok())
            .and_then(Gametype::from_id),
        modversion: values.get("g_modversion").and_then(|v| ModVersion::parse(v)),
        gear: values.get("g_gear").cloned(),
        mapname: values.get("mapname").cloned(),
    }
}

/// Leading slot number plus the remainder of the payload.
fn split_slot(payload: &str) -> Result<(u16, &str), WardenError> {
    let trimmed = payload.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if end == 0 {
        return Err(WardenError::ParseMalformed(payload.to_string()));
    }
    Ok((trimmed[..end].parse()?, &trimmed[end..]))
}

fn parse_slot(payload: &str) -> Result<u16, WardenError> {
    Ok(split_slot(payload)?.0)
}

fn int_fields(payload: &str, want: usize) -> Result<Vec<i64>, WardenError> {
    let fields: Vec<i64> = payload
        .split_whitespace()
        .take(want)
        .map(|f| f.trim_end_matches(':').parse::<i64>())
        .collect::<Result<_, _>>()
        .map_err(|_| WardenError::ParseMalformed(payload.to_string()))?;
    if fields.len() < want {
        return Err(WardenError::ParseMalformed(payload.to_string()));
    }
    Ok(fields)
}

/// `Kill: <killer> <victim> <cause>: <killer name> killed ...`
fn parse_kill(payload: &str) -> Result<Event, WardenError> {
    let (numbers, text) = payload
        .split_once(':')
        .ok_or_else(|| WardenError::ParseMalformed(payload.to_string()))?;
    let fields = int_fields(numbers, 3)?;
    let world_kill = text.trim_start().starts_with("<non-client>");
    Ok(Event::Kill {
        killer: fields[0] as u16,
        victim: fields[1] as u16,
        cause_id: fields[2] as u8,
        world_kill,
    })
}

/// `Hit: <victim> <hitter> <zone> <weapon>: ...`
fn parse_hit(payload: &str) -> Result<Event, WardenError> {
    let numbers = payload.split(':').next().unwrap_or(payload);
    let fields = int_fields(numbers, 4)?;
    Ok(Event::Hit {
        victim: fields[0] as u16,
        hitter: fields[1] as u16,
        zone_id: fields[2] as u8,
        weapon_id: fields[3] as u8,
    })
}

/// `say: <slot> <name>: <text>`
fn parse_say(payload: &str) -> Result<Option<(u16, String, String)>, WardenError> {
    let (slot, rest) = split_slot(payload)?;
    let Some((name, text)) = rest.trim_start().split_once(": ") else {
        return Ok(None);
    };
    Ok(Some((slot, name.to_string(), text.trim().to_string())))
}

/// Bomb lines arrive as prose: `Bomb was planted by <slot>!`,
/// `Bombholder is <slot>`. The event name is everything before the first
/// colon only for `Bombholder`; plain `Bomb ...` lines carry no colon, so
/// the tailer passes the whole line through `name`/`payload` differently —
/// both shapes are normalised here.
fn parse_bomb(name: &str, payload: &str) -> Result<Option<Event>, WardenError> {
    let full = if payload.is_empty() {
        name.to_string()
    } else {
        format!("{name}:{payload}")
    };
    let (action, tail) = if let Some(rest) = full.strip_prefix("Bombholder is ") {
        (BombAction::Holder, rest)
    } else if let Some(rest) = full.strip_prefix("Bomb has been collected by ") {
        (BombAction::Collected, rest)
    } else if let Some(rest) = full.strip_prefix("Bomb was tossed by ") {
        (BombAction::Tossed, rest)
    } else if let Some(rest) = full.strip_prefix("Bomb was planted by ") {
        (BombAction::Planted, rest)
    } else if let Some(rest) = full.strip_prefix("Bomb was defused by ") {
        (BombAction::Defused, rest)
    } else {
        return Ok(None);
    };
    let slot: u16 = tail
        .trim()
        .trim_end_matches('!')
        .trim()
        .parse()
        .map_err(|_| WardenError::ParseMalformed(full.clone()))?;
    Ok(Some(Event::Bomb { action, slot }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_game_line() {
        let line =
            "  0:00 InitGame: \\g_gametype\\7\\g_gear\\KQ\\g_modversion\\4.3.4\\mapname\\ut4_dust2_v2";
        let Some(Event::InitGame(info)) = Event::parse(line).unwrap() else {
            panic!("not an InitGame event");
        };
        assert_eq!(info.gametype, Some(Gametype::Ctf));
        assert_eq!(info.modversion, Some(ModVersion::V43));
        assert_eq!(info.gear.as_deref(), Some("KQ"));
        assert_eq!(info.mapname.as_deref(), Some("ut4_dust2_v2"));
    }

    #[test]
    fn kill_line() {
        let line = " 12:34 Kill: 3 7 19: Gunner killed Runner by UT_MOD_LR300";
        assert_eq!(
            Event::parse(line).unwrap(),
            Some(Event::Kill {
                killer: 3,
                victim: 7,
                cause_id: 19,
                world_kill: false,
            })
        );
    }

    #[test]
    fn world_kill_line() {
        let line = "  3:02 Kill: 1022 4 9: <non-client> killed Faller by MOD_TRIGGER_HURT";
        let Some(Event::Kill { world_kill, .. }) = Event::parse(line).unwrap() else {
            panic!("not a Kill event");
        };
        assert!(world_kill);
    }

    #[test]
    fn hit_line() {
        let line = "  5:10 Hit: 7 3 1 19: Gunner hit Runner in the Head";
        assert_eq!(
            Event::parse(line).unwrap(),
            Some(Event::Hit {
                victim: 7,
                hitter: 3,
                zone_id: 1,
                weapon_id: 19,
            })
        );
    }

    #[test]
    fn userinfo_line() {
        let line = "  0:12 ClientUserinfo: 4 \\name\\^1Gun ner\\ip\\10.0.0.4:27960\\cl_guid\\AAAABBBBCCCCDDDDEEEEFFFF00001111";
        let Some(Event::ClientUserinfo { slot, info }) = Event::parse(line).unwrap() else {
            panic!("not a ClientUserinfo event");
        };
        assert_eq!(slot, 4);
        assert_eq!(info.get("ip").map(String::as_str), Some("10.0.0.4:27960"));
        assert_eq!(
            info.get("cl_guid").map(String::as_str),
            Some("AAAABBBBCCCCDDDDEEEEFFFF00001111")
        );
    }

    #[test]
    fn userinfo_changed_line() {
        let line = "  1:02 ClientUserinfoChanged: 4 n\\Runner\\t\\2\\r\\2";
        assert_eq!(
            Event::parse(line).unwrap(),
            Some(Event::ClientUserinfoChanged {
                slot: 4,
                team_id: Some(2),
                name: Some("Runner".to_string()),
            })
        );
    }

    #[test]
    fn say_line() {
        let line = "  9:41 say: 5 Chatter: !help kick";
        assert_eq!(
            Event::parse(line).unwrap(),
            Some(Event::Say {
                slot: 5,
                name: "Chatter".to_string(),
                text: "!help kick".to_string(),
            })
        );
    }

    #[test]
    fn bomb_lines() {
        assert_eq!(
            Event::parse("  2:01 Bomb was planted by 4!").unwrap(),
            Some(Event::Bomb {
                action: BombAction::Planted,
                slot: 4,
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
    fn flag_lines() {
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
    fn unknown_event_is_skipped() {
        assert_eq!(Event::parse("  0:00 Item: 3 ut_item_medkit").unwrap(), None);
        assert_eq!(Event::parse("garbage").unwrap(), None);
    }

    #[test]
    fn malformed_tracked_event_errors() {
        assert!(Event::parse("  0:00 Kill: x y z: nonsense").is_err());
    }
}
