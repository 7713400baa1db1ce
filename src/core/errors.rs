// src/core/errors.rs

//! Defines the primary error type for the entire daemon.

use std::num::ParseIntError;
use thiserror::Error;

/// The main error enum, representing all possible failures within the daemon.
/// Using `thiserror` allows for clean error definitions and automatic `From` trait implementations.
#[derive(Error, Debug)]
pub enum WardenError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server response timed out")]
    RconTimeout,

    #[error("RCON authentication rejected: {0}")]
    RconAuth(String),

    #[error("Malformed RCON packet")]
    MalformedPacket,

    #[error("CVAR '{0}' missing from server reply")]
    CvarMissing(String),

    #[error("Games log file not found: {0}")]
    LogMissing(String),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Malformed log line: {0}")]
    ParseMalformed(String),

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Insufficient privileges")]
    PermissionDenied,

    #[error("{0}")]
    TargetNotFound(String),

    #[error("{0}")]
    TargetAmbiguous(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ParseIntError> for WardenError {
    fn from(e: ParseIntError) -> Self {
        WardenError::ParseMalformed(e.to_string())
    }
}
