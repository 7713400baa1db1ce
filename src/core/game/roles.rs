// src/core/game/roles.rs

//! The ordered admin role ladder. Permission checks everywhere in the daemon
//! reduce to a single `>=` comparison between two roles.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Admin roles in ascending order of privilege. The numeric levels are part
/// of the persisted schema (`xlrstats.admin_role`) and of the chat surface
/// (`!putgroup`, `!leveltest`), so they are fixed.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AdminRole {
    Guest,
    User,
    Regular,
    Moderator,
    Admin,
    #[strum(serialize = "Full Admin")]
    FullAdmin,
    #[strum(serialize = "Senior Admin")]
    SeniorAdmin,
    #[strum(serialize = "Super Admin")]
    SuperAdmin,
    #[strum(serialize = "Head Admin")]
    HeadAdmin,
}

impl AdminRole {
    /// The numeric level stored in the database and shown in chat.
    pub fn level(self) -> u8 {
        match self {
            AdminRole::Guest => 0,
            AdminRole::User => 1,
            AdminRole::Regular => 2,
            AdminRole::Moderator => 20,
            AdminRole::Admin => 40,
            AdminRole::FullAdmin => 60,
            AdminRole::SeniorAdmin => 80,
            AdminRole::SuperAdmin => 90,
            AdminRole::HeadAdmin => 100,
        }
    }

    /// Maps a stored numeric level back to a role. Unknown levels collapse
    /// to `Guest` so a hand-edited database row cannot crash the daemon.
    pub fn from_level(level: u8) -> Self {
        match level {
            100.. => AdminRole::HeadAdmin,
            90..=99 => AdminRole::SuperAdmin,
            80..=89 => AdminRole::SeniorAdmin,
            60..=79 => AdminRole::FullAdmin,
            40..=59 => AdminRole::Admin,
            20..=39 => AdminRole::Moderator,
            2..=19 => AdminRole::Regular,
            1 => AdminRole::User,
            0 => AdminRole::Guest,
        }
    }

    /// The single privilege predicate used by the command dispatcher and the
    /// policy engine.
    pub fn at_least(self, other: AdminRole) -> bool {
        self >= other
    }

    /// Parses a role name or numeric level as given to `!putgroup`.
    pub fn parse(s: &str) -> Option<Self> {
        if let Ok(level) = s.parse::<u8>() {
            return Some(Self::from_level(level));
        }
        match s.to_ascii_lowercase().as_str() {
            "guest" => Some(AdminRole::Guest),
            "user" => Some(AdminRole::User),
            "regular" | "reg" => Some(AdminRole::Regular),
            "moderator" | "mod" => Some(AdminRole::Moderator),
            "admin" => Some(AdminRole::Admin),
            "fulladmin" => Some(AdminRole::FullAdmin),
            "senioradmin" => Some(AdminRole::SeniorAdmin),
            "superadmin" => Some(AdminRole::SuperAdmin),
            _ => None,
        }
    }
}

impl Default for AdminRole {
    fn default() -> Self {
        AdminRole::Guest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_order_follows_levels() {
        assert!(AdminRole::Moderator.at_least(AdminRole::Regular));
        assert!(AdminRole::HeadAdmin.at_least(AdminRole::SuperAdmin));
        assert!(!AdminRole::User.at_least(AdminRole::Moderator));
    }

    #[test]
    fn level_roundtrip() {
        for role in [
            AdminRole::Guest,
            AdminRole::User,
            AdminRole::Regular,
            AdminRole::Moderator,
            AdminRole::Admin,
            AdminRole::FullAdmin,
            AdminRole::SeniorAdmin,
            AdminRole::SuperAdmin,
            AdminRole::HeadAdmin,
        ] {
            assert_eq!(AdminRole::from_level(role.level()), role);
        }
    }

    #[test]
    fn parse_accepts_names_and_levels() {
        assert_eq!(AdminRole::parse("mod"), Some(AdminRole::Moderator));
        assert_eq!(AdminRole::parse("80"), Some(AdminRole::SeniorAdmin));
        assert_eq!(AdminRole::parse("nonsense"), None);
    }
}
