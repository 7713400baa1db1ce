// src/core/announcer.rs

//! Broadcast categories.
//!
//! Several announcement families can be switched off in the configuration.
//! The switches are folded into one flag set at startup so the policy
//! handlers test a single bit instead of re-reading config fields.

use crate::config::BotConfig;
use bitflags::bitflags;

bitflags! {
    /// Announcement categories that can be enabled in the `[bot]` section.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Announce: u32 {
        /// First blood / first HE kill / first knife kill of a match.
        const FIRST_KILL     = 1 << 0;
        /// Double kill, triple kill, monster kill.
        const MULTI_KILL     = 1 << 1;
        /// Knife kill broadcasts beyond the first.
        const KNIFE_KILLS    = 1 << 2;
        /// HE grenade kill broadcasts beyond the first.
        const NADE_KILLS     = 1 << 3;
        /// Per-hit headshot counter broadcasts.
        const HEADSHOT_HITS  = 1 << 4;
        /// Bomb planted countdown broadcast.
        const BOMB_PLANTED   = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Announcer {
    enabled: Announce,
}

impl Announcer {
    pub fn from_config(bot: &BotConfig) -> Self {
        let mut enabled = Announce::empty();
        if bot.show_first_kill {
            enabled |= Announce::FIRST_KILL;
        }
        if bot.show_multi_kill {
            enabled |= Announce::MULTI_KILL;
        }
        if bot.spam_knife_kills_msg {
            enabled |= Announce::KNIFE_KILLS;
        }
        if bot.spam_nade_kills_msg {
            enabled |= Announce::NADE_KILLS;
        }
        if bot.spam_headshot_hits_msg {
            enabled |= Announce::HEADSHOT_HITS;
        }
        if bot.spam_bomb_planted_msg {
            enabled |= Announce::BOMB_PLANTED;
        }
        Announcer { enabled }
    }

    pub fn allows(&self, category: Announce) -> bool {
        self.enabled.contains(category)
    }
}
