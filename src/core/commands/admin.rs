// src/core/commands/admin.rs

//! Admin commands (level 40): kicks, forced teams, tempbans and the
//! broadcast tools.

use crate::core::WardenError;
use crate::core::commands::duration::{TEMPBAN_MAX_SECS, parse_duration};
use crate::core::commands::{CmdCtx, CommandDef};
use crate::core::game::gametype::Team;
use crate::core::game::roles::AdminRole;

pub fn commands() -> Vec<CommandDef> {
    vec![
        CommandDef {
            name: "admins",
            alias: "",
            level: AdminRole::Admin,
            syntax: "!admins",
            desc: "list all online admins",
            handler: admins,
        },
        CommandDef {
            name: "aliases",
            alias: "alias",
            level: AdminRole::Admin,
            syntax: "!aliases <name>",
            desc: "list the aliases of a player",
            handler: aliases,
        },
        CommandDef {
            name: "bigtext",
            alias: "",
            level: AdminRole::Admin,
            syntax: "!bigtext <text>",
            desc: "display a message in big letters",
            handler: bigtext,
        },
        CommandDef {
            name: "exit",
            alias: "",
            level: AdminRole::Admin,
            syntax: "!exit",
            desc: "display the last disconnected player",
            handler: exit,
        },
        CommandDef {
            name: "find",
            alias: "",
            level: AdminRole::Admin,
            syntax: "!find <name>",
            desc: "display matching connected players",
            handler: find_player,
        },
        CommandDef {
            name: "force",
            alias: "",
            level: AdminRole::Admin,
            syntax: "!force <name> <red/blue/spec> [lock]",
            desc: "force a player to the given team",
            handler: force,
        },
        CommandDef {
            name: "kick",
            alias: "k",
            level: AdminRole::Admin,
            syntax: "!kick <name> <reason>",
            desc: "kick a player",
            handler: kick,
        },
        CommandDef {
            name: "nuke",
            alias: "",
            level: AdminRole::Admin,
            syntax: "!nuke <name>",
            desc: "nuke a player",
            handler: nuke,
        },
        CommandDef {
            name: "regulars",
            alias: "regs",
            level: AdminRole::Admin,
            syntax: "!regulars",
            desc: "display the regular players online",
            handler: regulars,
        },
        CommandDef {
            name: "say",
            alias: "",
            level: AdminRole::Admin,
            syntax: "!say <text>",
            desc: "say a message to all players",
            handler: say,
        },
        CommandDef {
            name: "tell",
            alias: "",
            level: AdminRole::Admin,
            syntax: "!tell <name> <text>",
            desc: "tell a message to a specific player",
            handler: tell,
        },
        CommandDef {
            name: "tempban",
            alias: "tb",
            level: AdminRole::Admin,
            syntax: "!tempban <name> [<duration>] [<reason>]",
            desc: "ban a player temporarily, up to 72 hours",
            handler: tempban,
        },
        CommandDef {
            name: "warnclear",
            alias: "wc",
            level: AdminRole::Admin,
            syntax: "!warnclear <name>",
            desc: "clear the warnings of a player",
            handler: warnclear,
        },
    ]
}

fn admins(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let entries: Vec<String> = ctx
        .game
        .players()
        .filter(|p| !p.is_world() && p.admin_role >= AdminRole::Moderator)
        .map(|p| format!("^3{} [^2{}^3]", p.name(), p.admin_role.level()))
        .collect();
    if entries.is_empty() {
        ctx.reply("^7No admins online");
    } else {
        let msg = format!("^7Admins online: {}", entries.join(", "));
        ctx.reply(&msg);
    }
    Ok(())
}

fn aliases(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !aliases <name>".to_string(),
        ));
    }
    match ctx.target(ctx.args)? {
        super::Target::Online(slot) => {
            if let Some(p) = ctx.game.player(slot) {
                let msg = format!("^7Aliases of ^5{}: ^3{}", p.name(), p.aliases.join(", "));
                ctx.reply(&msg);
            }
        }
        super::Target::Offline(shim) => {
            let msg = format!("^7Aliases of ^5{}: ^3{}", shim.name, shim.aliases.join(", "));
            ctx.reply(&msg);
        }
    }
    Ok(())
}

fn bigtext(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !bigtext <text>".to_string(),
        ));
    }
    ctx.game.rcon.bigtext(ctx.args);
    Ok(())
}

fn exit(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    match &ctx.game.last_disconnect {
        Some(name) => ctx.tell(&format!("^7Last disconnected player: ^3{name}")),
        None => ctx.tell("^7No player has disconnected yet"),
    }
    Ok(())
}

fn find_player(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !find <name>".to_string(),
        ));
    }
    let wanted = ctx.args.to_uppercase();
    let matches: Vec<String> = ctx
        .game
        .players()
        .filter(|p| !p.is_world() && p.name().to_uppercase().contains(&wanted))
        .map(|p| format!("^3{} [^2{}^3]", p.name(), p.slot()))
        .collect();
    if matches.is_empty() {
        ctx.tell("^7No Player found");
    } else {
        ctx.tell(&format!("^7Players matching {}: {}", ctx.args, matches.join(", ")));
    }
    Ok(())
}

fn force(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (who, rest) = ctx.split_args();
    let mut parts = rest.split_whitespace();
    let team_arg = parts.next().unwrap_or("");
    let lock = parts.next().is_some_and(|l| l.eq_ignore_ascii_case("lock"));
    if who.is_empty() || team_arg.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !force <name> <red/blue/spec> [lock]".to_string(),
        ));
    }
    let Some(team) = Team::parse(team_arg) else {
        return Err(WardenError::InvalidArgument(
            "^7Unknown team, use red, blue or spec".to_string(),
        ));
    };
    let slot = ctx.target_online(who)?;
    ctx.game.rcon.force_team(slot, &team.to_string());
    ctx.game
        .rcon
        .tell(slot, &format!("^3You are forced to: ^7{team}"), true);
    if let Some(p) = ctx.game.player_mut(slot) {
        p.team_lock = if lock { Some(team) } else { None };
    }
    Ok(())
}

fn kick(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (who, reason) = ctx.split_args();
    if who.is_empty() || reason.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7You need to enter a reason: ^3!kick <name> <reason>".to_string(),
        ));
    }
    let slot = ctx.target_online(who)?;
    ctx.deny_self(slot, "kick")?;
    ctx.deny_equal_or_higher(slot, "kick")?;
    let (name, caller_name) = {
        let name = ctx
            .game
            .player(slot)
            .map(|p| p.name().to_string())
            .unwrap_or_default();
        (name, ctx.caller_player()?.name().to_string())
    };
    ctx.game.kick_player(slot, reason);
    ctx.say(&format!(
        "^2{name} ^7was kicked by {caller_name}: ^3{reason}"
    ));
    Ok(())
}

fn nuke(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !nuke <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    ctx.deny_equal_or_higher(slot, "nuke")?;
    ctx.game.rcon.enqueue(format!("nuke {slot}"));
    Ok(())
}

fn regulars(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let entries: Vec<String> = ctx
        .game
        .players()
        .filter(|p| !p.is_world() && p.admin_role == AdminRole::Regular)
        .map(|p| format!("^3{}", p.name()))
        .collect();
    if entries.is_empty() {
        ctx.reply("^7No regular players online");
    } else {
        let msg = format!("^7Regular players online: {}", entries.join(", "));
        ctx.reply(&msg);
    }
    Ok(())
}

fn say(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !say <text>".to_string(),
        ));
    }
    let caller_name = ctx.caller_player()?.name().to_string();
    ctx.say(&format!("^4{caller_name}: ^7{}", ctx.args));
    Ok(())
}

fn tell(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (who, msg) = ctx.split_args();
    if who.is_empty() || msg.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !tell <name> <text>".to_string(),
        ));
    }
    let slot = ctx.target_online(who)?;
    let caller_name = ctx.caller_player()?.name().to_string();
    ctx.game
        .rcon
        .tell(slot, &format!("^4{caller_name}: ^7{msg}"), true);
    Ok(())
}

fn tempban(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (who, rest) = ctx.split_args();
    if who.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !tempban <name> [<duration>] [<reason>]".to_string(),
        ));
    }
    let slot = ctx.target_online(who)?;
    ctx.deny_self(slot, "ban")?;
    ctx.deny_equal_or_higher(slot, "ban")?;

    let (duration_arg, reason) = match rest.split_once(char::is_whitespace) {
        Some((d, r)) => (d, r.trim()),
        None => (rest, ""),
    };
    let (secs, human) = parse_duration(duration_arg, TEMPBAN_MAX_SECS);
    let reason = if reason.is_empty() { "tempban" } else { reason };

    let caller_name = ctx.caller_player()?.name().to_string();
    let name = {
        let Some(p) = ctx.game.player(slot) else {
            return Ok(());
        };
        ctx.daemon
            .ban_player(p, secs, reason, Some(&caller_name), ctx.now)?;
        p.name().to_string()
    };
    ctx.say(&format!("^2{name} ^7banned for ^1{human}: ^3{reason}"));
    ctx.game.kick_player(slot, reason);
    Ok(())
}

fn warnclear(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !warnclear <name>".to_string(),
        ));
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
