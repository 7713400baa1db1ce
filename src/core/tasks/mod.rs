// src/core/tasks/mod.rs

//! Long-running background tasks: periodic housekeeping over the player
//! table, ban-point expiry and the rotating-message broadcaster.

pub mod ban_points;
pub mod housekeeping;
pub mod rules;
