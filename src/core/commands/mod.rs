// src/core/commands/mod.rs

//! The chat command surface.
//!
//! Commands are data: one [`CommandDef`] per command with its canonical
//! name, short alias, minimum role, syntax and handler function, collected
//! into a registry the dispatcher indexes by name. Handlers run under the
//! players lock and only enqueue outbound RCON traffic.
//!
//! Failures (`PermissionDenied`, `TargetNotFound`, `TargetAmbiguous`,
//! `InvalidArgument`) are surfaced only to the caller, as a private tell.

pub mod duration;
pub mod targeting;

mod admin;
mod fulladmin;
mod moderator;
mod senioradmin;
mod superadmin;
mod user;

use crate::core::Daemon;
use crate::core::WardenError;
use crate::core::game::player::Player;
use crate::core::game::roles::AdminRole;
use crate::core::game::{Game, now_secs};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub use targeting::Target;

/// Handler signature: mutate the game, enqueue RCON traffic, or fail with a
/// caller-visible error.
pub type Handler = fn(&mut CmdCtx<'_>) -> Result<(), WardenError>;

/// One chat command.
pub struct CommandDef {
    pub name: &'static str,
    /// Short alias, empty when the command has none.
    pub alias: &'static str,
    pub level: AdminRole,
    pub syntax: &'static str,
    pub desc: &'static str,
    pub handler: Handler,
}

static REGISTRY: Lazy<Vec<CommandDef>> = Lazy::new(|| {
    let mut defs = Vec::new();
    defs.extend(user::commands());
    defs.extend(moderator::commands());
    defs.extend(admin::commands());
    defs.extend(fulladmin::commands());
    defs.extend(senioradmin::commands());
    defs.extend(superadmin::commands());
    defs
});

static INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (i, def) in REGISTRY.iter().enumerate() {
        index.insert(def.name, i);
        if !def.alias.is_empty() {
            index.insert(def.alias, i);
        }
    }
    index
});

pub fn find(name: &str) -> Option<&'static CommandDef> {
    INDEX.get(name).map(|i| &REGISTRY[*i])
}

/// All commands available at `role`, alphabetically.
pub fn available(role: AdminRole) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = REGISTRY
        .iter()
        .filter(|def| role >= def.level)
        .map(|def| def.name)
        .collect();
    names.sort_unstable();
    names
}

/// Execution context handed to each handler.
pub struct CmdCtx<'a> {
    pub daemon: &'a Arc<Daemon>,
    pub game: &'a mut Game,
    pub caller: u16,
    /// Canonical name the command was resolved to.
    pub invoked: &'a str,
    pub args: &'a str,
    /// True for the `@command` variant that broadcasts the answer.
    pub global: bool,
    pub now: f64,
}

impl<'a> CmdCtx<'a> {
    pub fn caller_player(&self) -> Result<&Player, WardenError> {
        self.game
            .player(self.caller)
            .ok_or_else(|| WardenError::Internal("caller left".to_string()))
    }

    pub fn caller_role(&self) -> AdminRole {
        self.game
            .player(self.caller)
            .map(|p| p.admin_role)
            .unwrap_or_default()
    }

    pub fn tell(&self, msg: &str) {
        self.game.rcon.tell(self.caller, msg, true);
    }

    pub fn say(&self, msg: &str) {
        self.game.rcon.say(msg);
    }

    /// Private reply for `!`, global broadcast for `@`.
    pub fn reply(&self, msg: &str) {
        if self.global {
            self.say(msg);
        } else {
            self.tell(msg);
        }
    }

    /// First whitespace token of the arguments plus the rest.
    pub fn split_args(&self) -> (&'a str, &'a str) {
        match self.args.split_once(char::is_whitespace) {
            Some((head, tail)) => (head, tail.trim()),
            None => (self.args, ""),
        }
    }

    pub fn target(&self, who: &str) -> Result<Target, WardenError> {
        targeting::resolve(self.game, &self.daemon.db, who)
    }

    pub fn target_online(&self, who: &str) -> Result<u16, WardenError> {
        targeting::resolve_online(self.game, &self.daemon.db, who)
    }

    /// Rejects acting on an equal-or-higher admin.
    pub fn deny_equal_or_higher(&self, target: u16, action: &str) -> Result<(), WardenError> {
        let target_role = self
            .game
            .player(target)
            .map(|p| p.admin_role)
            .unwrap_or_default();
        if target_role >= self.caller_role() {
            return Err(WardenError::InvalidArgument(format!(
                "^7You cannot {action} an admin"
            )));
        }
        Ok(())
    }

    pub fn deny_self(&self, target: u16, action: &str) -> Result<(), WardenError> {
        if target == self.caller {
            return Err(WardenError::InvalidArgument(format!(
                "^7You cannot {action} yourself"
            )));
        }
        Ok(())
    }
}

/// Entry point from the say handler. `text` still carries its `!` or `@`.
pub fn dispatch(daemon: &Arc<Daemon>, slot: u16, text: &str) {
    let global = text.starts_with('@');
    let body = &text[1..];
    let (word, args) = match body.split_once(char::is_whitespace) {
        Some((w, rest)) => (w, rest.trim()),
        None => (body, ""),
    };
    let word = word.to_ascii_lowercase();
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphanumeric()) {
        return;
    }

    let now = now_secs();
    let mut game = daemon.game.lock();
    let Some(caller) = game.player(slot) else {
        return;
    };
    let caller_role = caller.admin_role;
    let caller_name = caller.name().to_string();

    let Some(def) = find(&word) else {
        game.rcon
            .tell(slot, &WardenError::UnknownCommand(word).to_string(), true);
        return;
    };
    if caller_role < def.level {
        game.rcon
            .tell(slot, "^3You have no permission to use this command", true);
        debug!("{caller_name} denied on !{word} (needs {:?})", def.level);
        return;
    }

    let result = {
        let mut ctx = CmdCtx {
            daemon,
            game: &mut *game,
            caller: slot,
            invoked: def.name,
            args,
            global,
            now,
        };
        (def.handler)(&mut ctx)
    };
    if let Err(e) = result {
        game.rcon.tell(slot, &e.to_string(), true);
    }
}
