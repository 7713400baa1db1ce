// src/core/commands/senioradmin.rs

//! Senior Admin commands (level 80): map control, mass moderation, the ban
//! ledger and group management.

use crate::core::WardenError;
use crate::core::commands::duration::PERMBAN_MAX_SECS;
use crate::core::commands::{CmdCtx, CommandDef};
use crate::core::game::roles::AdminRole;
use tracing::warn;

/// Bot names shipped with the game, used by `!addbots`.
const BOT_NAMES: [&str; 4] = ["boa", "cheetah", "cobra", "cougar"];

/// Gear presets: `g_gear` strings of disallowed weapon groups.
const GEAR_PRESETS: [(&str, &str); 5] = [
    ("all", ""),
    ("knife", "FGHIJKLMNZacefghOQRSTUVWX"),
    ("pistol", "HIJKLMNZacehOQRSTUVWX"),
    ("sniper", "FGHIJKLMacefOQRSTUVWX"),
    ("nade", "FGHIJKLMNQacefghRSTUVWX"),
];

pub fn commands() -> Vec<CommandDef> {
    vec![
        CommandDef {
            name: "addbots",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!addbots",
            desc: "add bots to the game",
            handler: addbots,
        },
        CommandDef {
            name: "banall",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!banall <pattern> [<reason>]",
            desc: "ban all players matching the pattern",
            handler: banall,
        },
        CommandDef {
            name: "banlist",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!banlist",
            desc: "display the active bans",
            handler: banlist,
        },
        CommandDef {
            name: "bots",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!bots <on/off>",
            desc: "enable or disable bot support",
            handler: bots,
        },
        CommandDef {
            name: "cyclemap",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!cyclemap",
            desc: "cycle to the next map",
            handler: cyclemap,
        },
        CommandDef {
            name: "exec",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!exec <file>",
            desc: "execute a config file on the server",
            handler: exec,
        },
        CommandDef {
            name: "gear",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!gear <default/all/knife/pistol/sniper/nade>",
            desc: "change the allowed weapons",
            handler: gear,
        },
        CommandDef {
            name: "instagib",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!instagib <on/off>",
            desc: "enable or disable instagib",
            handler: instagib,
        },
        CommandDef {
            name: "kickall",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!kickall <pattern> [<reason>]",
            desc: "kick all players matching the pattern",
            handler: kickall,
        },
        CommandDef {
            name: "kill",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!kill <name>",
            desc: "kill a player",
            handler: kill,
        },
        CommandDef {
            name: "clear",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!clear [<name>]",
            desc: "clear all warnings, of one player or everybody",
            handler: clear,
        },
        CommandDef {
            name: "lastadmin",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!lastadmin",
            desc: "display the last admin seen online",
            handler: lastadmin,
        },
        CommandDef {
            name: "lastbans",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!lastbans",
            desc: "display the last bans",
            handler: lastbans,
        },
        CommandDef {
            name: "lookup",
            alias: "l",
            level: AdminRole::SeniorAdmin,
            syntax: "!lookup <name>",
            desc: "search for a player in the database",
            handler: lookup,
        },
        CommandDef {
            name: "makereg",
            alias: "mr",
            level: AdminRole::SeniorAdmin,
            syntax: "!makereg <name>",
            desc: "put a player in the regular group",
            handler: makereg,
        },
        CommandDef {
            name: "map",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!map <name>",
            desc: "load the given map",
            handler: map,
        },
        CommandDef {
            name: "mapcycle",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!mapcycle",
            desc: "display the map rotation",
            handler: mapcycle,
        },
        CommandDef {
            name: "maps",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!maps",
            desc: "display all available maps",
            handler: maps,
        },
        CommandDef {
            name: "maprestart",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!maprestart",
            desc: "restart the current map",
            handler: maprestart,
        },
        CommandDef {
            name: "moon",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!moon <on/off>",
            desc: "enable or disable moon mode (low gravity)",
            handler: moon,
        },
        CommandDef {
            name: "permban",
            alias: "pb",
            level: AdminRole::SeniorAdmin,
            syntax: "!permban <name> <reason>",
            desc: "ban a player permanently",
            handler: permban,
        },
        CommandDef {
            name: "putgroup",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!putgroup <name> <group>",
            desc: "put a player in an admin group",
            handler: putgroup,
        },
        CommandDef {
            name: "rebuild",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!rebuild",
            desc: "rebuild the list of available maps",
            handler: rebuild,
        },
        CommandDef {
            name: "setgravity",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!setgravity <value>",
            desc: "set the gravity, default 800",
            handler: setgravity,
        },
        CommandDef {
            name: "setnextmap",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!setnextmap <name>",
            desc: "set the next map in rotation",
            handler: setnextmap,
        },
        CommandDef {
            name: "swapteams",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!swapteams",
            desc: "swap the teams",
            handler: swapteams,
        },
        CommandDef {
            name: "unban",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!unban @<id>",
            desc: "remove a ban",
            handler: unban,
        },
        CommandDef {
            name: "unreg",
            alias: "",
            level: AdminRole::SeniorAdmin,
            syntax: "!unreg <name>",
            desc: "remove a player from the regular group",
            handler: unreg,
        },
    ]
}

fn addbots(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    for (i, name) in BOT_NAMES.iter().enumerate() {
        let team = if i % 2 == 0 { "red" } else { "blue" };
        ctx.game.rcon.enqueue(format!("addbot {name} 4 {team}"));
    }
    Ok(())
}

fn banall(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (pattern, reason) = ctx.split_args();
    if pattern.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !banall <pattern> [<reason>]".to_string(),
        ));
    }
    let reason = if reason.is_empty() { "banall" } else { reason };
    let caller_role = ctx.caller_role();
    let caller_name = ctx.caller_player()?.name().to_string();
    let wanted = pattern.to_uppercase();
    let targets: Vec<u16> = ctx
        .game
        .players()
        .filter(|p| {
            !p.is_world()
                && p.slot() != ctx.caller
                && p.admin_role < caller_role
                && p.name().to_uppercase().contains(&wanted)
        })
        .map(|p| p.slot())
        .collect();
    if targets.is_empty() {
        ctx.tell("^7No Player found");
        return Ok(());
    }
    for slot in targets {
        let name = {
            let Some(p) = ctx.game.player(slot) else {
                continue;
            };
            ctx.daemon
                .ban_player(p, 3600, reason, Some(&caller_name), ctx.now)?;
            p.name().to_string()
        };
        ctx.say(&format!("^2{name} ^7banned for ^11 hour: ^3{reason}"));
        ctx.game.kick_player(slot, reason);
    }
    Ok(())
}

fn banlist(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let bans = ctx.daemon.db.active_bans(ctx.now, 10)?;
    if bans.is_empty() {
        ctx.tell("^7Ban list is empty");
        return Ok(());
    }
    let entries: Vec<String> = bans
        .iter()
        .map(|b| format!("^7[@{}] ^3{}", b.id, b.name))
        .collect();
    ctx.tell(&format!("^7Active bans: {}", entries.join(", ")));
    Ok(())
}

fn bots(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    match ctx.args.trim() {
        "on" => {
            ctx.daemon.set_bots_enabled(true);
            ctx.game.rcon.enqueue("set bot_enable 1");
            ctx.tell("^7Bot support enabled, restart the map to spawn bots");
        }
        "off" => {
            ctx.daemon.set_bots_enabled(false);
            ctx.game.rcon.enqueue("kick allbots");
            ctx.game.rcon.enqueue("set bot_enable 0");
        }
        _ => {
            return Err(WardenError::InvalidArgument(
                "^7Usage: !bots <on/off>".to_string(),
            ));
        }
    }
    Ok(())
}

fn cyclemap(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    ctx.game.rcon.enqueue("cyclemap");
    Ok(())
}

fn exec(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !exec <file>".to_string(),
        ));
    }
    ctx.game.rcon.enqueue(format!("exec {}", ctx.args));
    Ok(())
}

fn gear(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let wanted = ctx.args.trim().to_ascii_lowercase();
    let value = if wanted == "default" {
        Some(ctx.game.default_gear.clone())
    } else {
        GEAR_PRESETS
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, g)| g.to_string())
    };
    let Some(value) = value else {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !gear <default/all/knife/pistol/sniper/nade>".to_string(),
        ));
    };
    ctx.game.rcon.enqueue(format!("set g_gear \"{value}\""));
    ctx.say(&format!("^7Gear set to ^3{wanted}^7, active next spawn"));
    Ok(())
}

fn instagib(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    match ctx.args.trim() {
        "on" => ctx.game.rcon.enqueue("set g_instagib 1"),
        "off" => ctx.game.rcon.enqueue("set g_instagib 0"),
        _ => {
            return Err(WardenError::InvalidArgument(
                "^7Usage: !instagib <on/off>".to_string(),
            ));
        }
    }
    ctx.tell("^7Instagib changes, restart the map to apply");
    Ok(())
}

fn kickall(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (pattern, reason) = ctx.split_args();
    if pattern.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !kickall <pattern> [<reason>]".to_string(),
        ));
    }
    let reason = if reason.is_empty() { "kickall" } else { reason };
    let caller_role = ctx.caller_role();
    let wanted = pattern.to_uppercase();
    let targets: Vec<u16> = ctx
        .game
        .players()
        .filter(|p| {
            !p.is_world()
                && p.slot() != ctx.caller
                && p.admin_role < caller_role
                && p.name().to_uppercase().contains(&wanted)
        })
        .map(|p| p.slot())
        .collect();
    if targets.is_empty() {
        ctx.tell("^7No Player found");
        return Ok(());
    }
    for slot in targets {
        ctx.game.kick_player(slot, reason);
    }
    Ok(())
}

fn kill(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !kill <name>".to_string(),
        ));
    }
    if !ctx.game.modversion.supports_kick_reason() {
        ctx.tell("^7The command is not supported on this server version");
        return Ok(());
    }
    let slot = ctx.target_online(ctx.args)?;
    ctx.deny_equal_or_higher(slot, "kill")?;
    ctx.game.rcon.enqueue(format!("smite {slot}"));
    Ok(())
}

fn clear(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        let guids: Vec<String> = {
            for p in ctx.game.players_mut() {
                p.clear_warnings();
            }
            ctx.game
                .players()
                .filter(|p| !p.is_world())
                .map(|p| p.guid.clone())
                .collect()
        };
        for guid in guids {
            ctx.daemon.db.clear_ban_points(&guid, ctx.now)?;
        }
        ctx.say("^1All warnings cleared");
        return Ok(());
    }
    let slot = ctx.target_online(ctx.args)?;
    let (name, guid) = {
        let Some(p) = ctx.game.player_mut(slot) else {
            return Ok(());
        };
        p.clear_warnings();
        (p.name().to_string(), p.guid.clone())
    };
    ctx.daemon.db.clear_ban_points(&guid, ctx.now)?;
    ctx.say(&format!("^1All warnings cleared for ^2{name}"));
    Ok(())
}

fn lastadmin(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    match &ctx.game.last_admin {
        Some(name) => ctx.tell(&format!("^7Last admin online: ^3{name}")),
        None => ctx.tell("^7No admin seen yet"),
    }
    Ok(())
}

fn lastbans(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let bans = ctx.daemon.db.last_bans(4)?;
    if bans.is_empty() {
        ctx.tell("^7No bans issued yet");
        return Ok(());
    }
    for ban in bans {
        ctx.tell(&format!(
            "^7[@{}] ^3{} ^7until ^1{}^7: {}",
            ban.id, ban.name, ban.expires, ban.reason
        ));
    }
    Ok(())
}

fn lookup(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !lookup <name>".to_string(),
        ));
    }
    let rows = ctx.daemon.db.lookup_players(ctx.args, 8)?;
    if rows.is_empty() {
        ctx.tell("^7No Player found");
        return Ok(());
    }
    for (id, name, joined) in rows {
        ctx.tell(&format!("^7[@{id}] ^3{name} ^7last seen {joined}"));
    }
    Ok(())
}

fn makereg(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !makereg <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    let (name, guid, address, registered) = {
        let Some(p) = ctx.game.player(slot) else {
            return Ok(());
        };
        (
            p.name().to_string(),
            p.guid.clone(),
            p.address.clone(),
            p.registered,
        )
    };
    if registered {
        ctx.daemon.db.set_admin_role(&guid, AdminRole::Regular)?;
    } else {
        ctx.daemon
            .db
            .register_user(&guid, &name, &address, AdminRole::Regular, ctx.now)?;
    }
    if let Some(p) = ctx.game.player_mut(slot) {
        p.registered_with_role(AdminRole::Regular);
    }
    ctx.tell(&format!("^7{name} ^7put in group Regular"));
    Ok(())
}

/// Resolves a map name against the known map list, with the `ut4_` prefix
/// applied when it disambiguates.
fn find_map(ctx: &CmdCtx<'_>, wanted: &str) -> Result<String, WardenError> {
    let lower = wanted.to_lowercase();
    let prefixed = format!("ut4_{lower}");
    let mut matches: Vec<&String> = Vec::new();
    for map in &ctx.game.all_maps {
        if *map == lower || *map == prefixed {
            return Ok(map.clone());
        }
        if map.contains(&lower) {
            matches.push(map);
        }
    }
    match matches.len() {
        0 => Err(WardenError::TargetNotFound("^7Map not found".to_string())),
        1 => Ok(matches[0].clone()),
        _ => Err(WardenError::TargetAmbiguous(format!(
            "^7Maps matching {wanted}: ^3{}",
            matches
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

fn map(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !map <name>".to_string(),
        ));
    }
    let map = find_map(ctx, ctx.args)?;
    ctx.game.rcon.enqueue(format!("map {map}"));
    Ok(())
}

fn mapcycle(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.game.maplist.is_empty() {
        ctx.tell("^7Map rotation is empty");
    } else {
        ctx.tell(&format!("^7Map rotation: ^3{}", ctx.game.maplist.join(", ")));
    }
    Ok(())
}

fn maps(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.game.all_maps.is_empty() {
        ctx.reply("^7Map list not loaded yet, use !rebuild");
    } else {
        let msg = format!("^7Available maps: ^3{}", ctx.game.all_maps.join(", "));
        ctx.reply(&msg);
    }
    Ok(())
}

fn maprestart(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    ctx.game.rcon.enqueue("restart");
    Ok(())
}

fn moon(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    match ctx.args.trim() {
        "on" => ctx.game.rcon.enqueue("set g_gravity 100"),
        "off" => ctx
            .game
            .rcon
            .enqueue(format!("set g_gravity {}", ctx.daemon.config.lowgrav.gravity)),
        _ => {
            return Err(WardenError::InvalidArgument(
                "^7Usage: !moon <on/off>".to_string(),
            ));
        }
    }
    Ok(())
}

fn permban(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (who, reason) = ctx.split_args();
    if who.is_empty() || reason.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7You need to enter a reason: ^3!permban <name> <reason>".to_string(),
        ));
    }
    let slot = ctx.target_online(who)?;
    ctx.deny_self(slot, "ban")?;
    ctx.deny_equal_or_higher(slot, "ban")?;
    let caller_name = ctx.caller_player()?.name().to_string();
    let name = {
        let Some(p) = ctx.game.player(slot) else {
            return Ok(());
        };
        ctx.daemon
            .ban_player(p, PERMBAN_MAX_SECS, reason, Some(&caller_name), ctx.now)?;
        p.name().to_string()
    };
    ctx.say(&format!("^2{name} ^1banned permanently: ^3{reason}"));
    ctx.game.kick_player(slot, reason);
    Ok(())
}

fn putgroup(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (who, group) = ctx.split_args();
    if who.is_empty() || group.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !putgroup <name> <user/regular/mod/admin/fulladmin/senioradmin>".to_string(),
        ));
    }
    let Some(role) = AdminRole::parse(group) else {
        return Err(WardenError::InvalidArgument(format!(
            "^7Unknown group: ^3{group}"
        )));
    };
    if role >= ctx.caller_role() {
        return Err(WardenError::InvalidArgument(
            "^7You cannot put a player in a group at or above your own".to_string(),
        ));
    }
    let slot = ctx.target_online(who)?;
    let (name, guid, address, registered) = {
        let Some(p) = ctx.game.player(slot) else {
            return Ok(());
        };
        (
            p.name().to_string(),
            p.guid.clone(),
            p.address.clone(),
            p.registered,
        )
    };
    if registered {
        ctx.daemon.db.set_admin_role(&guid, role)?;
    } else {
        ctx.daemon
            .db
            .register_user(&guid, &name, &address, role, ctx.now)?;
    }
    if let Some(p) = ctx.game.player_mut(slot) {
        p.registered_with_role(role);
    }
    ctx.say(&format!("^7{name} ^7put in group ^2{role}"));
    Ok(())
}

/// Refreshes the available-map list from the server. The listing needs a
/// request/response exchange, so it runs off the lock and commits when the
/// reply arrives.
fn rebuild(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let daemon = ctx.daemon.clone();
    let caller = ctx.caller;
    tokio::spawn(async move {
        match daemon.client.rcon("dir map bsp").await {
            Ok((_, body)) => {
                let mut maps: Vec<String> = body
                    .split_whitespace()
                    .filter(|entry| entry.starts_with('/'))
                    .map(|entry| entry.trim_start_matches('/').trim_end_matches(".bsp").to_string())
                    .collect();
                maps.sort_unstable();
                let count = maps.len();
                let mut game = daemon.game.lock();
                game.all_maps = maps;
                game.rcon
                    .tell(caller, &format!("^7Map list rebuilt: ^2{count} ^7maps"), true);
            }
            Err(e) => warn!("map list rebuild failed: {e}"),
        }
    });
    Ok(())
}

fn setgravity(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let Ok(value) = ctx.args.trim().parse::<u32>() else {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !setgravity <value>".to_string(),
        ));
    };
    ctx.game.rcon.enqueue(format!("set g_gravity {value}"));
    Ok(())
}

fn setnextmap(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !setnextmap <name>".to_string(),
        ));
    }
    let map = find_map(ctx, ctx.args)?;
    ctx.game.rcon.enqueue(format!("set g_nextmap {map}"));
    ctx.game.next_mapname = Some(map.clone());
    ctx.tell(&format!("^7Next Map: ^3{map}"));
    Ok(())
}

fn swapteams(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    ctx.game.rcon.enqueue("swapteams");
    Ok(())
}

fn unban(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let Some(id) = ctx
        .args
        .trim()
        .strip_prefix('@')
        .and_then(|id| id.parse::<i64>().ok())
    else {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !unban @<id>".to_string(),
        ));
    };
    match ctx.daemon.db.unban(id)? {
        Some(record) => ctx.tell(&format!("^7Ban removed for ^3{}", record.name)),
        None => ctx.tell(&format!("^7No ban found with ID @{id}")),
    }
    Ok(())
}

fn unreg(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !unreg <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    ctx.deny_equal_or_higher(slot, "ungroup")?;
    let (name, guid) = {
        let Some(p) = ctx.game.player(slot) else {
            return Ok(());
        };
        (p.name().to_string(), p.guid.clone())
    };
    ctx.daemon.db.set_admin_role(&guid, AdminRole::User)?;
    if let Some(p) = ctx.game.player_mut(slot) {
        p.admin_role = AdminRole::User;
    }
    ctx.tell(&format!("^7{name} ^7put in group User"));
    Ok(())
}
