// src/core/commands/user.rs

//! Commands open to everybody: registration, personal statistics, the
//! forgiveness surface and the head-admin bootstrap.

use crate::core::WardenError;
use crate::core::commands::{CmdCtx, CommandDef, available, find};
use crate::core::game::Gametype;
use crate::core::game::player::NO_CAPTURE_TIME;
use crate::core::game::roles::AdminRole;
use crate::core::handlers::objective::request_team_balance;

pub fn commands() -> Vec<CommandDef> {
    vec![
        CommandDef {
            name: "register",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!register",
            desc: "register yourself as a basic user",
            handler: register,
        },
        CommandDef {
            name: "regtest",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!regtest",
            desc: "display your current user status",
            handler: regtest,
        },
        CommandDef {
            name: "time",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!time",
            desc: "display the current server time",
            handler: time,
        },
        CommandDef {
            name: "help",
            alias: "h",
            level: AdminRole::Guest,
            syntax: "!help [<command>]",
            desc: "display all available commands or the usage of one",
            handler: help,
        },
        CommandDef {
            name: "stats",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!stats",
            desc: "display your current map stats",
            handler: stats,
        },
        CommandDef {
            name: "xlrstats",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!xlrstats [<name>]",
            desc: "display full player stats",
            handler: xlrstats,
        },
        CommandDef {
            name: "hs",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!hs",
            desc: "display your headshot counter",
            handler: hs,
        },
        CommandDef {
            name: "spree",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!spree",
            desc: "display your current kill streak",
            handler: spree,
        },
        CommandDef {
            name: "hits",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!hits",
            desc: "display your hit zone stats",
            handler: hits,
        },
        CommandDef {
            name: "hestats",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!hestats",
            desc: "display your HE grenade kills",
            handler: hestats,
        },
        CommandDef {
            name: "knife",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!knife",
            desc: "display your knife kills",
            handler: knife,
        },
        CommandDef {
            name: "bombstats",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!bombstats",
            desc: "display your bomb stats",
            handler: bombstats,
        },
        CommandDef {
            name: "ctfstats",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!ctfstats",
            desc: "display your CTF stats",
            handler: ctfstats,
        },
        CommandDef {
            name: "freezestats",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!freezestats",
            desc: "display your freeze tag stats",
            handler: freezestats,
        },
        CommandDef {
            name: "teams",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!teams",
            desc: "balance teams",
            handler: teams,
        },
        CommandDef {
            name: "forgive",
            alias: "f",
            level: AdminRole::Guest,
            syntax: "!forgive [<name>]",
            desc: "forgive a team kill",
            handler: forgive,
        },
        CommandDef {
            name: "forgiveall",
            alias: "fa",
            level: AdminRole::Guest,
            syntax: "!forgiveall",
            desc: "forgive all team kills",
            handler: forgiveall,
        },
        CommandDef {
            name: "forgivelist",
            alias: "fl",
            level: AdminRole::Guest,
            syntax: "!forgivelist",
            desc: "list players who team killed you",
            handler: forgivelist,
        },
        CommandDef {
            name: "forgiveprev",
            alias: "fp",
            level: AdminRole::Guest,
            syntax: "!forgiveprev",
            desc: "forgive the last team kill",
            handler: forgiveprev,
        },
        CommandDef {
            name: "grudge",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!grudge [<name>]",
            desc: "grudge a player for team killing, a grudged player is never forgiven",
            handler: grudge,
        },
        CommandDef {
            name: "iamgod",
            alias: "",
            level: AdminRole::Guest,
            syntax: "!iamgod",
            desc: "claim the head admin role while none exists",
            handler: iamgod,
        },
    ]
}

fn register(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let (registered, name, guid, address) = {
        let p = ctx.caller_player()?;
        (
            p.registered,
            p.name().to_string(),
            p.guid.clone(),
            p.address.clone(),
        )
    };
    if registered {
        ctx.tell(&format!("^7{name} ^7is already in a higher level group"));
        return Ok(());
    }
    ctx.daemon
        .db
        .register_user(&guid, &name, &address, AdminRole::User, ctx.now)?;
    if let Some(p) = ctx.game.player_mut(ctx.caller) {
        p.registered_with_role(AdminRole::User);
    }
    ctx.tell(&format!("^7{name} ^7put in group User"));
    Ok(())
}

fn regtest(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let p = ctx.caller_player()?;
    let msg = if p.registered {
        format!(
            "^7{} [^2@{}^7] is registered since ^2{}",
            p.name(),
            p.player_id,
            p.first_seen.as_deref().unwrap_or("today")
        )
    } else {
        format!("^7{} ^7is not a registered user", p.name())
    };
    ctx.tell(&msg);
    Ok(())
}

fn time(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let now = chrono::Local::now().format("%H:%M").to_string();
    ctx.reply(&format!("^7{now}"));
    Ok(())
}

fn help(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let role = ctx.caller_role();
    if !ctx.args.is_empty() {
        let wanted = ctx.args.trim().trim_start_matches('!').to_ascii_lowercase();
        match find(&wanted) {
            Some(def) if role >= def.level => {
                ctx.tell(&format!("^7Usage: ^3{} ^7- {}", def.syntax, def.desc));
            }
            _ => ctx.tell(&format!("^7Unknown command: ^3{wanted}")),
        }
        return Ok(());
    }
    let names = available(role);
    ctx.tell(&format!("^7Available commands ({}):", names.len()));
    ctx.game
        .rcon
        .tell(ctx.caller, &names.join(", "), false);
    Ok(())
}

fn stats(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let freeze = ctx.game.gametype == Gametype::FreezeTag;
    let p = ctx.caller_player()?;
    if freeze {
        ctx.tell(&format!(
            "^7Freeze Stats {}: ^7F ^2{} ^7T ^3{} ^7TK ^1{} ^7HS ^2{}",
            p.name(),
            p.freezes,
            p.thawouts,
            p.tk_count,
            p.head_shots
        ));
    } else {
        let ratio = if p.deaths == 0 {
            1.0
        } else {
            p.kills as f64 / p.deaths as f64
        };
        ctx.tell(&format!(
            "^7Map Stats {}: ^7K ^2{} ^7D ^3{} ^7TK ^1{} ^7Ratio ^5{ratio:.2} ^7HS ^2{}",
            p.name(),
            p.kills,
            p.deaths,
            p.tk_count,
            p.head_shots
        ));
    }
    Ok(())
}

fn xlrstats(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let slot = if ctx.args.is_empty() {
        ctx.caller
    } else {
        ctx.target_online(ctx.args)?
    };
    let Some(p) = ctx.game.player(slot) else {
        return Ok(());
    };
    if !p.registered {
        if slot == ctx.caller {
            ctx.tell("^7You need to ^2!register ^7first");
        } else {
            ctx.tell("^7Sorry, this player is not registered");
        }
        return Ok(());
    }
    let ratio = if p.db_deaths == 0 {
        1.0
    } else {
        p.db_kills as f64 / p.db_deaths as f64
    };
    ctx.tell(&format!(
        "^7Stats {}: ^7K ^2{} ^7D ^3{} ^7TK ^1{} ^7Ratio ^5{ratio:.2} ^7HS ^2{}",
        p.name(),
        p.db_kills,
        p.db_deaths,
        p.db_tk_count,
        p.db_head_shots
    ));
    Ok(())
}

fn hs(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let count = ctx.caller_player()?.head_shots;
    if count > 0 {
        let plural = if count > 1 { "s" } else { "" };
        ctx.tell(&format!("^7You made ^2{count} ^7headshot{plural}"));
    } else {
        ctx.tell("^7You made no headshot");
    }
    Ok(())
}

fn spree(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let count = ctx.caller_player()?.killing_streak;
    if count > 0 {
        let plural = if count > 1 { "s" } else { "" };
        ctx.tell(&format!("^7You have ^2{count} ^7kill{plural} in a row"));
    } else {
        ctx.tell("^7You are currently not having a killing spree");
    }
    Ok(())
}

fn hits(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let p = ctx.caller_player()?;
    ctx.tell(&format!(
        "^7Hits {}: ^2{} ^7total, ^2{} ^7body, ^2{} ^7arms, ^2{} ^7legs",
        p.name(),
        p.all_hits,
        p.hit_zones.body,
        p.hit_zones.arms,
        p.hit_zones.legs
    ));
    Ok(())
}

fn hestats(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let count = ctx.caller_player()?.he_kills;
    if count > 0 {
        let plural = if count > 1 { "s" } else { "" };
        ctx.tell(&format!("^7You made ^2{count} ^7HE grenade kill{plural}"));
    } else {
        ctx.tell("^7You made no HE grenade kill");
    }
    Ok(())
}

fn knife(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let count = ctx.caller_player()?.knife_kills;
    if count > 0 {
        let plural = if count > 1 { "s" } else { "" };
        ctx.tell(&format!("^7You made ^2{count} ^7knife kill{plural}"));
    } else {
        ctx.tell("^7You made no knife kill");
    }
    Ok(())
}

fn bombstats(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.game.gametype != Gametype::Bomb {
        ctx.tell("^7Bomb stats are only available in Bomb mode");
        return Ok(());
    }
    let p = ctx.caller_player()?;
    ctx.tell(&format!(
        "^7planted: ^2{} ^7- defused: ^2{}",
        p.bomb_planted, p.bomb_defused
    ));
    ctx.tell(&format!(
        "^7bomb carrier killed: ^2{} ^7- enemies bombed: ^2{}",
        p.bomb_carrier_kills, p.kills_with_bomb
    ));
    Ok(())
}

fn ctfstats(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.game.gametype != Gametype::Ctf {
        ctx.tell("^7CTF stats are only available in CTF mode");
        return Ok(());
    }
    let p = ctx.caller_player()?;
    let mut msg = format!(
        "^7captured: ^2{} ^7- returned: ^2{}",
        p.flags_captured, p.flags_returned
    );
    if p.fastest_cap_secs < NO_CAPTURE_TIME {
        msg.push_str(&format!(" ^7- fastest cap: ^2{:.2} ^7sec", p.fastest_cap_secs));
    }
    ctx.tell(&msg);
    Ok(())
}

fn freezestats(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.game.gametype != Gametype::FreezeTag {
        ctx.tell("^7Freeze stats are only available in Freeze Tag mode");
        return Ok(());
    }
    let p = ctx.caller_player()?;
    ctx.tell(&format!(
        "^7freeze: ^2{} ^7- thaw out: ^2{}",
        p.freezes, p.thawouts
    ));
    Ok(())
}

fn teams(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.game.gametype.free_for_all() {
        ctx.tell("^7Command is disabled for this game mode");
        return Ok(());
    }
    request_team_balance(ctx.daemon, ctx.game);
    Ok(())
}

/// Carries out one forgiveness between the caller and a killer slot.
fn forgive_one(ctx: &mut CmdCtx<'_>, killer_slot: u16) -> Result<bool, WardenError> {
    let caller = ctx.caller;
    let (victim_name, killer_name) = {
        let Some((victim, killer)) = ctx.game.two_players_mut(caller, killer_slot) else {
            return Ok(false);
        };
        if !victim.forgive_killer(killer_slot) {
            return Ok(false);
        }
        killer.forgiven_by(caller);
        (victim.name().to_string(), killer.name().to_string())
    };
    ctx.say(&format!(
        "^7{victim_name} has forgiven {killer_name}'s attack"
    ));
    Ok(true)
}

fn forgive(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if ctx.args.is_empty() {
        return forgiveprev(ctx);
    }
    let killer_slot = ctx.target_online(ctx.args)?;
    if !forgive_one(ctx, killer_slot)? {
        ctx.tell("^7No one to forgive");
    }
    Ok(())
}

fn forgiveprev(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let last = ctx.caller_player()?.killed_me.last().copied();
    match last {
        Some(killer_slot) => {
            if !forgive_one(ctx, killer_slot)? {
                ctx.tell("^7No one to forgive");
            }
        }
        None => ctx.tell("^7No one to forgive"),
    }
    Ok(())
}

fn forgiveall(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let killers: Vec<u16> = {
        let mut seen = Vec::new();
        for k in &ctx.caller_player()?.killed_me {
            if !seen.contains(k) {
                seen.push(*k);
            }
        }
        seen
    };
    if killers.is_empty() {
        ctx.tell("^7No one to forgive");
        return Ok(());
    }
    let caller = ctx.caller;
    let mut names = Vec::new();
    for killer_slot in killers {
        let Some((victim, killer)) = ctx.game.two_players_mut(caller, killer_slot) else {
            continue;
        };
        while victim.forgive_killer(killer_slot) {
            killer.forgiven_by(caller);
        }
        names.push(killer.name().to_string());
    }
    let victim_name = ctx.caller_player()?.name().to_string();
    ctx.say(&format!(
        "^7{victim_name} has forgiven: {}",
        names.join(", ")
    ));
    Ok(())
}

fn forgivelist(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let killers = ctx.caller_player()?.killed_me.clone();
    if killers.is_empty() {
        ctx.tell("^7No one to forgive");
        return Ok(());
    }
    let mut names: Vec<String> = Vec::new();
    for slot in killers {
        if let Some(p) = ctx.game.player(slot) {
            let name = p.name().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    ctx.tell(&format!("^7Players to forgive: ^3{}", names.join(", ")));
    Ok(())
}

fn grudge(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    let killer_slot = if ctx.args.is_empty() {
        match ctx.caller_player()?.killed_me.last().copied() {
            Some(slot) => slot,
            None => {
                ctx.tell("^7No one to grudge");
                return Ok(());
            }
        }
    } else {
        ctx.target_online(ctx.args)?
    };
    let caller = ctx.caller;
    let killer_name = {
        let Some((victim, killer)) = ctx.game.two_players_mut(caller, killer_slot) else {
            ctx.tell("^7No one to grudge");
            return Ok(());
        };
        victim.grudge(killer_slot);
        killer.forgiven_by(caller);
        killer.name().to_string()
    };
    ctx.tell(&format!(
        "^7You hold a grudge against ^3{killer_name}^7, their attacks will not be forgiven"
    ));
    Ok(())
}

fn iamgod(ctx: &mut CmdCtx<'_>) -> Result<(), WardenError> {
    if !ctx.daemon.iamgod_armed() {
        ctx.tell("^7Command not available");
        return Ok(());
    }
    if ctx.daemon.db.has_head_admin()? {
        ctx.daemon.disarm_iamgod();
        ctx.tell("^7There already is a Head Admin");
        return Ok(());
    }
    let (registered, name, guid, address) = {
        let p = ctx.caller_player()?;
        (
            p.registered,
            p.name().to_string(),
            p.guid.clone(),
            p.address.clone(),
        )
    };
    if registered {
        ctx.daemon.db.set_admin_role(&guid, AdminRole::HeadAdmin)?;
    } else {
        ctx.daemon
            .db
            .register_user(&guid, &name, &address, AdminRole::HeadAdmin, ctx.now)?;
    }
    if let Some(p) = ctx.game.player_mut(ctx.caller) {
        p.registered_with_role(AdminRole::HeadAdmin);
    }
    ctx.daemon.disarm_iamgod();
    ctx.tell(&format!("^7{name} ^7put in group ^2Head Admin"));
    Ok(())
}
