// src/core/commands/superadmin.rs

//! Super Admin commands (level 90): gametype switching and server control.

use crate::core::WardenError;
use crate::core::commands::{CmdCtx, CommandDef};
use crate::core::game::Gametype;
use crate::core::game::roles::AdminRole;

pub fn commands() -> Vec<CommandDef> {
    let mut defs = vec![
        CommandDef {
            name: "ungroup",
            alias: "",
            level: AdminRole::SuperAdmin,
            syntax: "!ungroup <name>",
            desc: "remove a player from all admin groups",
            handler: ungroup,
        },
        CommandDef {
            name: "password",
            alias: "",
            level: AdminRole::SuperAdmin,
            syntax: "!password [<password>]",
            desc: "set or clear the server password",
            handler: password,
        },
        CommandDef {
            name: "reload",
            alias: "",
            level: AdminRole::SuperAdmin,
            syntax: "!reload",
            desc: "reload the current map",
            handler: reload,
        },
    ];
    for (name, _) in GAMETYPE_SWITCHES {
        defs.push(CommandDef {
            name,
            alias: "",
            level: AdminRole::SuperAdmin,
            syntax: name_syntax(name),
            desc: "switch the gametype, active on next map",
            handler: switch_gametype,
        });
    }
    defs
}

const GAMETYPE_SWITCHES: [(&str, Gametype); 8] = [
    ("bomb", Gametype::Bomb),
    ("ctf", Gametype::Ctf),
    ("ffa", Gametype::Ffa),
    ("gungame", Gametype::GunGame),
    ("jump", Gametype::Jump),
    ("lms", Gametype::Lms),
    ("tdm", Gametype::Tdm),
    ("ts", Gametype::TeamSurvivor),
];

fn name_syntax(name: &'static str) -> &'static str {
    match name {
        "bomb" => "!bomb",
        "ctf" => "!ctf",
        "ffa" => "!ffa",
        "gungame" => "!gungame",
        "jump" => "!jump",
        "lms" => "!lms",
        "tdm" => "!tdm",
        _ => "!ts",
    }
}

/// One handler serves all eight switches; the invoked name selects the mode.
fn switch_gametype(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    // The dispatcher resolved the command by name, but the handler does not
    // receive it; re-derive the gametype from the first word of the raw
    // invocation stored on the context.
    let Some((_, gametype)) = GAMETYPE_SWITCHES
        .iter()
        .find(|(name, _)| *name == ctx.invoked)
    else {
        return Err(WardenError::Internal("unknown gametype switch".to_string()));
    };
    ctx.game
        .rcon
        .enqueue(format!("set g_gametype {}", gametype.id()));
    ctx.say(&format!(
        "^7Gametype ^3{gametype} ^7will be loaded with the next map"
    ));
    Ok(())
}

fn ungroup(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return Err(WardenError::InvalidArgument(
            "^7Usage: !ungroup <name>".to_string(),
        ));
    }
    let slot = ctx.target_online(ctx.args)?;
    ctx.deny_self(slot, "ungroup")?;
    ctx.deny_equal_or_higher(slot, "ungroup")?;
    let (name, guid) = {
        let Some(p) = ctx.game.player(slot) else {
            return Ok(());
        };
        (p.name().to_string(), p.guid.clone())
    };
    ctx.daemon.db.set_admin_role(&guid, AdminRole::Guest)?;
    if let Some(p) = ctx.game.player_mut(slot) {
        p.admin_role = AdminRole::Guest;
    }
    ctx.say(&format!("^7{name} ^7removed from all admin groups"));
    Ok(())
}

fn password(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        ctx.game.rcon.enqueue("set g_password \"\"");
        ctx.tell("^7Server password removed");
    } else {
        ctx.game
            .rcon
            .enqueue(format!("set g_password \"{}\"", ctx.args.trim()));
        ctx.tell("^7Server password set");
    }
    Ok(())
}

fn reload(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    ctx.game.rcon.enqueue("reload");
    Ok(())
}
