// src/core/parser/mod.rs

//! Decodes one line of the games log into a typed event.

pub mod events;

pub use events::{BombAction, Event, InitInfo};
