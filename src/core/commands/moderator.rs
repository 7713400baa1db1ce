// src/core/commands/moderator.rs

//! Moderator commands (level 20): player information, the warning surface
//! and light moderation tools.

use crate::core::WardenError;
use crate::core::commands::{CmdCtx, CommandDef, Target};
use crate::core::game::gametype::Team;
use crate::core::game::roles::AdminRole;
use crate::core::geoip::country_label;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canned warn reasons and their chat text.
static WARN_REASONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("obj", "go for objective"),
        ("camp", "stop camping"),
        ("spam", "do not spam, shut-up!"),
        ("lang", "bad language"),
        ("racism", "racism is not tolerated"),
        ("ping", "fix your ping"),
        ("afk", "away from keyboard"),
        ("tk", "stop team killing"),
        ("spec", "spectator too long on full server"),
        ("ci", "connection interrupted"),
    ])
});

/// Seconds between two warnings against the same player.
const WARN_DELAY: f64 = 15.0;

pub fn commands() -> Vec<CommandDef> {
    vec![
        CommandDef {
            name: "admintest",
            alias: "",
            level: AdminRole::Moderator,
            syntax: "!admintest",
            desc: "display your admin level",
            handler: admintest,
        },
        CommandDef {
            name: "country",
            alias: "",
            level: AdminRole::Moderator,
            syntax: "!country <name>",
            desc: "display the country of a player",
            handler: country,
        },
        CommandDef {
            name: "poke",
            alias: "",
            level: AdminRole::Moderator,
            syntax: "!poke <name>",
            desc: "notify a player that he needs to move",
            handler: poke,
        },
        CommandDef {
            name: "leveltest",
            alias: "lt",
            level: AdminRole::Moderator,
            syntax: "!leveltest [<name>]",
            desc: "display the admin level of a player",
            handler: leveltest,
        },
        CommandDef {
            name: "lastmaps",
            alias: "",
            level: AdminRole::Moderator,
            syntax: "!lastmaps",
            desc: "display the maps played before this one",
            handler: lastmaps,
        },
        CommandDef {
            name: "lastvote",
            alias: "",
            level: AdminRole::Moderator,
            syntax: "!lastvote",
            desc: "display the last called vote",
            handler: lastvote,
        },
        CommandDef {
            name: "list",
            alias: "",
            level: AdminRole::Moderator,
            syntax: "!list",
            desc: "list all connected players",
            handler: list,
        },
        CommandDef {
            name: "nextmap",
            alias: "",
            level: AdminRole::Moderator,
            syntax: "!nextmap",
            desc: "display the next map in rotation",
            handler: nextmap,
        },
        CommandDef {
            name: "mute",
            alias: "",
            level: AdminRole::Moderator,
            syntax: "!mute <name> [<seconds>]",
            desc: "mute or unmute a player",
            handler: mute,
        },
        CommandDef {
            name: "seen",
            alias: "",
            level: AdminRole::Moderator,
            syntax: "!seen <name>",
            desc: "display when a player was last seen",
            handler: seen,
        },
        CommandDef {
            name: "shuffleteams",
            alias: "shuffle",
            level: AdminRole::Moderator,
            syntax: "!shuffleteams",
            desc: "shuffle the teams",
            handler: shuffleteams,
        },
        CommandDef {
            name: "spec",
            alias: "sp",
            level: AdminRole::Moderator,
            syntax: "!spec",
            desc: "move yourself to spectator",
            handler: spec,
        },
        CommandDef {
            name: "warn",
            alias: "w",
            level: AdminRole::Moderator,
            syntax: "!warn <name> [<reason>]",
            desc: "warn a player",
            handler: warn,
        },
        CommandDef {
            name: "warninfo",
            alias: "wi",
            level: AdminRole::Moderator,
            syntax: "!warninfo <name>",
            desc: "display the warnings of a player",
            handler: warninfo,
        },
        CommandDef {
            name: "warnremove",
            alias: "wr",
            level: AdminRole::Moderator,
            syntax: "!warnremove <name>",
            desc: "remove the last warning of a player",
            handler: warnremove,
        },
        CommandDef {
            name: "warns",
            alias: "",
            level: AdminRole::Moderator,
            syntax: "!warns",
            desc: "list the warn reason shortcuts",
            handler: warns,
        },
        CommandDef {
            name: "warntest",
            alias: "",
            level: AdminRole::Moderator,
            syntax: "!warntest <reason>",
            desc: "test a warning without issuing it",
            handler: warntest,
        },
    ]
}

fn admintest(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let p = ctx.caller_player()?;
    ctx.tell(&format!(
        "^7{} [^2{}^7] is ^2{}",
        p.name(),
        p.admin_role.level(),
        p.admin_role
    ));
    Ok(())
}

fn country(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !country <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    let Some(p) = ctx.game.player(slot) else {
        return Ok(());
    };
    let label = p
        .country
        .clone()
        .unwrap_or_else(|| country_label(None).to_string());
    let msg = format!("^7Country ^3{}: ^7{label}", p.name());
    ctx.reply(&msg);
    Ok(())
}

fn poke(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !poke <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    let caller_name = ctx.caller_player()?.name().to_string();
    if let Some(p) = ctx.game.player(slot) {
        ctx.say(&format!("^7{caller_name} ^7poked {}!", p.name()));
    }
    Ok(())
}

fn leveltest(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let describe = |name: &str, role: AdminRole| {
        format!("^7Level ^3{name} [^2{}^3]: ^7{role}", role.level())
    };
    if ctx.args.is_empty() {
        let p = ctx.caller_player()?;
        let msg = describe(p.name(), p.admin_role);
        ctx.tell(&msg);
        return Ok(());
    }
    match ctx.target(ctx.args)? {
        Target::Online(slot) => {
            if let Some(p) = ctx.game.player(slot) {
                let msg = describe(p.name(), p.admin_role);
                ctx.tell(&msg);
            }
        }
        Target::Offline(shim) => {
            let msg = describe(&shim.name, shim.admin_role);
            ctx.tell(&msg);
        }
    }
    Ok(())
}

fn lastmaps(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.game.last_maps.is_empty() {
        ctx.tell("^7No maps have been played yet");
    } else {
        let maps: Vec<&str> = ctx.game.last_maps.iter().map(String::as_str).collect();
        ctx.tell(&format!("^7Last maps: ^3{}", maps.join(", ")));
    }
    Ok(())
}

fn lastvote(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    match &ctx.game.last_vote {
        Some(vote) => ctx.tell(&format!("^7Last vote: ^3{vote}")),
        None => ctx.tell("^7No vote called yet"),
    }
    Ok(())
}

fn list(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let mut entries: Vec<String> = ctx
        .game
        .players()
        .filter(|p| !p.is_world())
        .map(|p| format!("^3{} [^2{}^3]", p.name(), p.slot()))
        .collect();
    entries.sort_unstable();
    ctx.tell(&format!("^7Players online: {}", entries.join(", ")));
    Ok(())
}

fn nextmap(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let msg = match &ctx.game.next_mapname {
        Some(map) => format!("^7Next Map: ^3{map}"),
        None => "^7Next map is not known yet".to_string(),
    };
    ctx.reply(&msg);
    Ok(())
}

fn mute(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !mute <name> [<seconds>]".to_string(),
        ));
    }
    let (who, rest) = ctx.split_args();
    let slot = ctx.target_online(who)?;
    ctx.deny_equal_or_higher(slot, "mute")?;
    let duration = rest
        .split_whitespace()
        .next()
        .filter(|d| d.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or("");
    ctx.game
        .rcon
        .enqueue(format!("mute {slot} {duration}").trim_end().to_string());
    Ok(())
}

fn seen(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !seen <name>".to_string(),
        ));
    }
    match ctx.target(ctx.args)? {
        Target::Online(slot) => {
            if let Some(p) = ctx.game.player(slot) {
                let msg = format!("^7{} ^7is currently online", p.name());
                ctx.tell(&msg);
            }
        }
        Target::Offline(shim) => match shim.last_visit {
            Some(last) => ctx.tell(&format!("^7{} ^7was last seen on {last}", shim.name)),
            None => ctx.tell(&format!("^7{} ^7is not a registered user", shim.name)),
        },
    }
    Ok(())
}

fn shuffleteams(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.game.gametype.free_for_all() {
        ctx.tell("^7Command is disabled for this game mode");
        return Ok(());
    }
    ctx.game.rcon.enqueue("shuffleteams");
    Ok(())
}

fn spec(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let slot = ctx.caller;
    ctx.game.rcon.force_team(slot, &Team::Spectator.to_string());
    Ok(())
}

fn warn(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (who, reason) = ctx.split_args();
    if who.is_empty() || reason.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7You need to enter a reason: ^3!warn <name> <reason>".to_string(),
        ));
    }
    let slot = ctx.target_online(who)?;
    ctx.deny_self(slot, "warn")?;
    ctx.deny_equal_or_higher(slot, "warn")?;

    let reason = reason.trim();
    let reason_key = reason.split_whitespace().next().unwrap_or(reason);
    let (victim_name, warn_count, last_warn, guid, address) = {
        let Some(p) = ctx.game.player(slot) else {
            return Ok(());
        };
        (
            p.name().to_string(),
            p.warning_count(),
            p.last_warn_time,
            p.guid.clone(),
            p.address.clone(),
        )
    };
    if last_warn + WARN_DELAY > ctx.now {
        ctx.tell(&format!(
            "^7Only one warning per {WARN_DELAY:.0} seconds can be issued"
        ));
        return Ok(());
    }
    if warn_count > 2 {
        ctx.say(&format!("^2{victim_name} ^7was kicked, too many warnings"));
        ctx.game.kick_player(slot, "too many warnings");
        return Ok(());
    }

    let warn_text = WARN_REASONS
        .get(reason_key)
        .copied()
        .unwrap_or(reason)
        .to_string();
    let new_count = {
        let Some(p) = ctx.game.player_mut(slot) else {
            return Ok(());
        };
        p.add_warning(&warn_text, true, ctx.now);
        p.warning_count()
    };

    // Repeated warnings for the heavyweight reasons convert to ban points.
    let caller_name = ctx.caller_player()?.name().to_string();
    let mut ban_minutes = 0;
    if new_count > 1 {
        let escalation = match reason_key {
            "tk" => Some((format!("tk, ban by {caller_name}"), 600)),
            "lang" => Some(("lang".to_string(), 300)),
            "spam" => Some(("spam".to_string(), 300)),
            "racism" => Some(("racism".to_string(), 300)),
            _ => None,
        };
        if let Some((point_type, secs)) = escalation {
            ban_minutes = ctx.daemon.db.add_ban_point(
                &guid,
                &victim_name,
                &address,
                &point_type,
                secs,
                ctx.now,
            )?;
        }
    }

    if ban_minutes > 0 {
        ctx.say(&format!(
            "^2{victim_name} ^7banned for ^1{ban_minutes} minutes ^7for too many warnings"
        ));
        ctx.game.kick_player(slot, "too many warnings");
    } else {
        ctx.say(&format!(
            "^1WARNING ^7[^3{new_count}^7]: ^2{victim_name}^7: {warn_text}"
        ));
        if new_count == 3 {
            ctx.say(&format!(
                "^1ALERT: ^2{victim_name} ^7auto-kick from warnings if not cleared"
            ));
        }
    }
    Ok(())
}

fn warninfo(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !warninfo <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    let Some(p) = ctx.game.player(slot) else {
        return Ok(());
    };
    if p.warnings.is_empty() {
        let msg = format!("^7{} ^7has no active warnings", p.name());
        ctx.tell(&msg);
    } else {
        let msg = format!(
            "^7{} ^7has ^1{} ^7warning(s): ^3{}",
            p.name(),
            p.warning_count(),
            p.warnings.join(", ")
        );
        ctx.tell(&msg);
    }
    Ok(())
}

fn warnremove(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !warnremove <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    let (name, removed) = {
        let Some(p) = ctx.game.player_mut(slot) else {
            return Ok(());
        };
        (p.name().to_string(), p.clear_last_warning())
    };
    match removed {
        Some(text) => ctx.tell(&format!("^7Removed warning of {name}: ^3{text}")),
        None => ctx.tell(&format!("^7{name} ^7has no warnings")),
    }
    Ok(())
}

fn warns(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let mut keys: Vec<&str> = WARN_REASONS.keys().copied().collect();
    keys.sort_unstable();
    ctx.tell(&format!("^7Warn reasons: ^3{}", keys.join(", ")));
    Ok(())
}

fn warntest(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let reason_key = ctx.args.split_whitespace().next().unwrap_or("");
    let text = WARN_REASONS
        .get(reason_key)
        .copied()
        .unwrap_or(if ctx.args.is_empty() { "behave" } else { ctx.args });
    ctx.tell(&format!("^2TEST: ^1WARNING ^7[^31^7]: ^7{text}"));
    Ok(())
}
