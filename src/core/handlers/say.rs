// src/core/handlers/say.rs

//! Chat routing: `!command` and `@command` lines go to the dispatcher,
//! everything else is ignored.

use crate::core::Daemon;
use crate::core::WardenError;
use crate::core::commands;
use std::sync::Arc;

pub fn handle_say(
    daemon: &Arc<Daemon>,
    slot: u16,
    _name: &str,
    text: &str,
) -> Result<(), WardenError> {
    let trimmed = text.trim();
    if trimmed.starts_with('!') || trimmed.starts_with('@') {
        commands::dispatch(daemon, slot, trimmed);
    }
    Ok(())
}
