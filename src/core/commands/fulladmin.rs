// src/core/commands/fulladmin.rs

//! Full Admin commands (level 60): long bans, connection checks and the
//! rougher moderation toys.

use crate::core::WardenError;
use crate::core::commands::{CmdCtx, CommandDef, Target};
use crate::core::game::gametype::Team;
use crate::core::game::roles::AdminRole;

/// Ping above which a client counts as connection-interrupted.
const CI_PING: u16 = 500;

pub fn commands() -> Vec<CommandDef> {
    vec![
        CommandDef {
            name: "ban",
            alias: "b",
            level: AdminRole::FullAdmin,
            syntax: "!ban <name> <reason>",
            desc: "ban a player for the configured number of days",
            handler: ban,
        },
        CommandDef {
            name: "baninfo",
            alias: "bi",
            level: AdminRole::FullAdmin,
            syntax: "!baninfo <name>",
            desc: "display the active ban of a player",
            handler: baninfo,
        },
        CommandDef {
            name: "ci",
            alias: "",
            level: AdminRole::FullAdmin,
            syntax: "!ci <name>",
            desc: "kick a player with connection interrupted",
            handler: ci,
        },
        CommandDef {
            name: "forgiveclear",
            alias: "fc",
            level: AdminRole::FullAdmin,
            syntax: "!forgiveclear [<name>]",
            desc: "clear the team kills of a player",
            handler: forgiveclear,
        },
        CommandDef {
            name: "forgiveinfo",
            alias: "fi",
            level: AdminRole::FullAdmin,
            syntax: "!forgiveinfo <name>",
            desc: "display the team kills of a player",
            handler: forgiveinfo,
        },
        CommandDef {
            name: "ping",
            alias: "",
            level: AdminRole::FullAdmin,
            syntax: "!ping <name>",
            desc: "display the ping of a player",
            handler: ping,
        },
        CommandDef {
            name: "id",
            alias: "",
            level: AdminRole::FullAdmin,
            syntax: "!id <name>",
            desc: "display the IP, guid and auth of a player",
            handler: id,
        },
        CommandDef {
            name: "kickbots",
            alias: "kb",
            level: AdminRole::FullAdmin,
            syntax: "!kickbots",
            desc: "kick all bots",
            handler: kickbots,
        },
        CommandDef {
            name: "rain",
            alias: "",
            level: AdminRole::FullAdmin,
            syntax: "!rain <on/off>",
            desc: "enable or disable rain",
            handler: rain,
        },
        CommandDef {
            name: "scream",
            alias: "",
            level: AdminRole::FullAdmin,
            syntax: "!scream <text>",
            desc: "scream a message in different colors to all players",
            handler: scream,
        },
        CommandDef {
            name: "slap",
            alias: "",
            level: AdminRole::FullAdmin,
            syntax: "!slap <name> [<amount>]",
            desc: "slap a player, up to 10 times",
            handler: slap,
        },
        CommandDef {
            name: "status",
            alias: "",
            level: AdminRole::FullAdmin,
            syntax: "!status",
            desc: "display the server status",
            handler: status,
        },
        CommandDef {
            name: "swap",
            alias: "",
            level: AdminRole::FullAdmin,
            syntax: "!swap <name1> [<name2>]",
            desc: "swap teams for two players",
            handler: swap,
        },
        CommandDef {
            name: "version",
            alias: "",
            level: AdminRole::FullAdmin,
            syntax: "!version",
            desc: "display the daemon version",
            handler: version,
        },
        CommandDef {
            name: "veto",
            alias: "",
            level: AdminRole::FullAdmin,
            syntax: "!veto",
            desc: "veto the current vote",
            handler: veto,
        },
    ]
}

fn ban(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (who, reason) = ctx.split_args();
    if who.is_empty() || reason.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7You need to enter a reason: ^3!ban <name> <reason>".to_string(),
        ));
    }
    let slot = ctx.target_online(who)?;
    ctx.deny_self(slot, "ban")?;
    ctx.deny_equal_or_higher(slot, "ban")?;

    let days = ctx.daemon.config.bot.ban_duration_days as u64;
    let caller_name = ctx.caller_player()?.name().to_string();
    let name = {
        let Some(p) = ctx.game.player(slot) else {
            return Ok(());
        };
        ctx.daemon
            .ban_player(p, days * 86400, reason, Some(&caller_name), ctx.now)?;
        p.name().to_string()
    };
    ctx.say(&format!("^2{name} ^7banned for ^1{days} days: ^3{reason}"));
    ctx.game.kick_player(slot, reason);
    Ok(())
}

fn baninfo(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !baninfo <name>".to_string(),
        ));
    }
    let (name, guid, address) = match ctx.target(ctx.args)? {
        Target::Online(slot) => {
            let Some(p) = ctx.game.player(slot) else {
                return Ok(());
            };
            (p.name().to_string(), p.guid.clone(), p.address.clone())
        }
        Target::Offline(shim) => (shim.name, shim.guid, shim.ip_address),
    };
    match ctx.daemon.db.active_ban(&guid, &address, ctx.now)? {
        Some((id, reason)) => {
            let expires = ctx.daemon.db.ban_expiry(&guid)?.unwrap_or_default();
            ctx.tell(&format!(
                "^7{name} ^7is banned (ID @{id}) until ^1{expires}^7: ^3{reason}"
            ));
        }
        None => ctx.tell(&format!("^7{name} ^7has no active ban")),
    }
    Ok(())
}

fn ci(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !ci <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    ctx.deny_equal_or_higher(slot, "kick")?;
    let (name, ping_value) = {
        let Some(p) = ctx.game.player(slot) else {
            return Ok(());
        };
        (p.name().to_string(), p.ping_value)
    };
    if ping_value >= CI_PING {
        ctx.say(&format!("^2{name} ^7was kicked, connection interrupted"));
        ctx.game.kick_player(slot, "connection interrupted");
    } else {
        ctx.tell(&format!(
            "^7{name} ^7has a ping of ^4{ping_value}^7, no connection interrupt"
        ));
    }
    Ok(())
}

fn forgiveclear(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        // Clear the TK bookkeeping of everybody.
        for p in ctx.game.players_mut() {
            p.tk_victims.clear();
            p.killed_me.clear();
            p.grudged.clear();
            p.clear_specific_warning(crate::core::game::player::TK_WARNING);
        }
        ctx.say("^1All team kills cleared");
        return Ok(());
    }
    let slot = ctx.target_online(ctx.args)?;
    let name = {
        let Some(p) = ctx.game.player_mut(slot) else {
            return Ok(());
        };
        p.tk_victims.clear();
        p.clear_specific_warning(crate::core::game::player::TK_WARNING);
        p.name().to_string()
    };
    // Drop this player from every victim ledger as well.
    for p in ctx.game.players_mut() {
        p.killed_me.retain(|k| *k != slot);
        p.grudged.retain(|g| *g != slot);
    }
    ctx.say(&format!("^1Team kills cleared for ^2{name}"));
    Ok(())
}

fn forgiveinfo(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !forgiveinfo <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    let Some(p) = ctx.game.player(slot) else {
        return Ok(());
    };
    let msg = format!(
        "^7{}: ^1{} ^7team kills, killed by ^1{} ^7team attacks, ^3{} ^7grudged",
        p.name(),
        p.tk_victims.len(),
        p.killed_me.len(),
        p.grudged.len()
    );
    ctx.tell(&msg);
    Ok(())
}

fn ping(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !ping <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    let Some(p) = ctx.game.player(slot) else {
        return Ok(());
    };
    if p.ping_value > 0 {
        let msg = format!("^7{} ^7has a ping of ^4{}", p.name(), p.ping_value);
        ctx.tell(&msg);
    } else {
        let msg = format!("^7No ping measured yet for {}", p.name());
        ctx.tell(&msg);
    }
    Ok(())
}

fn id(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !id <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    let Some(p) = ctx.game.player(slot) else {
        return Ok(());
    };
    let auth = p.authname.as_deref().unwrap_or("---");
    let msg = format!(
        "^7{} [^2@{}^7]: ^3{} ^7{} auth: ^3{auth}",
        p.name(),
        p.player_id,
        p.guid,
        p.address
    );
    ctx.tell(&msg);
    Ok(())
}

fn kickbots(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let bots: Vec<u16> = ctx
        .game
        .players()
        .filter(|p| p.guid.starts_with("BOT"))
        .map(|p| p.slot())
        .collect();
    if bots.is_empty() {
        ctx.tell("^7No bots connected");
        return Ok(());
    }
    for slot in bots {
        ctx.game.kick_player(slot, "");
    }
    Ok(())
}

fn rain(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    match ctx.args.trim() {
        "on" => ctx.game.rcon.enqueue("set g_enableprecip 1"),
        "off" => ctx.game.rcon.enqueue("set g_enableprecip 0"),
        _ => {
            return Err(WardenError::InvalidArgument(
                "^7Usage: !rain <on/off>".to_string(),
            ));
        }
    }
    Ok(())
}

fn scream(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !scream <text>".to_string(),
        ));
    }
    for color in ["^1", "^2", "^3", "^5"] {
        ctx.game.rcon.enqueue(format!("say {color}{}", ctx.args));
    }
    Ok(())
}

fn slap(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (who, amount) = ctx.split_args();
    if who.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !slap <name> [<amount>]".to_string(),
        ));
    }
    let slot = ctx.target_online(who)?;
    ctx.deny_equal_or_higher(slot, "slap")?;
    let times = amount.parse::<u32>().unwrap_or(1).clamp(1, 10);
    for _ in 0..times {
        ctx.game.rcon.enqueue(format!("slap {slot}"));
    }
    Ok(())
}

fn status(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let map = ctx.game.mapname.as_deref().unwrap_or("unknown");
    let (red, blue, spec) = ctx.game.team_counts();
    let msg = format!(
        "^7Map: ^3{map} ^7({}) ^7- players: ^1{red} ^7red, ^4{blue} ^7blue, ^3{spec} ^7spec",
        ctx.game.gametype
    );
    ctx.tell(&msg);
    Ok(())
}

fn swap(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.game.gametype.free_for_all() {
        ctx.tell("^7Command is disabled for this game mode");
        return Ok(());
    }
    let (first, second) = ctx.split_args();
    if first.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !swap <name1> [<name2>]".to_string(),
        ));
    }
    let slot_a = ctx.target_online(first)?;
    let slot_b = if second.is_empty() {
        ctx.caller
    } else {
        ctx.target_online(second)?
    };
    let team_a = ctx.game.player(slot_a).map(|p| p.team);
    let team_b = ctx.game.player(slot_b).map(|p| p.team);
    let (Some(team_a), Some(team_b)) = (team_a, team_b) else {
        return Ok(());
    };
    if team_a == team_b || team_a == Team::Spectator || team_b == Team::Spectator {
        ctx.tell("^7Both players must be on opposing teams");
        return Ok(());
    }
    ctx.game.rcon.force_team(slot_a, &team_b.to_string());
    ctx.game.rcon.force_team(slot_b, &team_a.to_string());
    Ok(())
}

fn version(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    ctx.reply(&format!(
        "^7urtwarden ^2v{} ^7- www.urtwarden.net",
        env!("CARGO_PKG_VERSION")
    ));
    Ok(())
}

fn veto(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    ctx.game.rcon.enqueue("veto");
    Ok(())
}
