// src/core/rcon/client.rs

//! Quake 3 out-of-band console client.
//!
//! Every request is a UDP datagram carrying the four-byte `0xFF` prefix, an
//! ASCII payload and a trailing newline. Replies share the prefix; the rest
//! of the first line is the response type, the remainder is the body.

use crate::core::WardenError;
use bytes::{BufMut, BytesMut};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::UdpSocket;

const OOB_PREFIX: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
const RECV_BUF: usize = 8192;

/// Default per-attempt reply timeout and retry budget for [`RconClient::request`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(1);
pub const REQUEST_RETRIES: u32 = 5;

/// Settle time after a served reply; responses arriving back to back are
/// conflated by the server.
const REPLY_SETTLE: Duration = Duration::from_millis(300);

static STATUS_PLAYER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(-?\d+) (-?\d+) "(.*)"$"#).expect("static regex"));

/// One row of a status reply.
#[derive(Debug, Clone)]
pub struct StatusPlayer {
    /// Slot number; only the `rcon status` variant reports it.
    pub slot: Option<u16>,
    pub frags: i32,
    pub ping: u16,
    pub name: String,
    pub address: Option<String>,
}

/// Connection-less UDP client with a fixed peer.
pub struct RconClient {
    sock: UdpSocket,
    password: String,
    /// Serialises request/response exchanges so replies cannot be attributed
    /// to the wrong request.
    exchange: tokio::sync::Mutex<()>,
    /// Last parsed `getstatus` key/value map.
    values: Mutex<HashMap<String, String>>,
    /// Last parsed player rows.
    players: Mutex<Vec<StatusPlayer>>,
}

impl RconClient {
    pub async fn connect(addr: &str, password: &str) -> Result<Self, WardenError> {
        let sock = UdpSocket::bind("0.0.0.0:0").await?;
        sock.connect(addr).await?;
        Ok(RconClient {
            sock,
            password: password.to_string(),
            exchange: tokio::sync::Mutex::new(()),
            values: Mutex::new(HashMap::new()),
            players: Mutex::new(Vec::new()),
        })
    }

    /// Frames and transmits one datagram; no reply is awaited.
    pub async fn send(&self, payload: &str) -> Result<(), WardenError> {
        let mut buf = BytesMut::with_capacity(payload.len() + 5);
        buf.put_slice(&OOB_PREFIX);
        buf.put_slice(payload.as_bytes());
        buf.put_u8(b'\n');
        self.sock.send(&buf).await?;
        Ok(())
    }

    /// Fire-and-forget variant that wraps the payload into an rcon command.
    pub async fn send_rcon(&self, command: &str) -> Result<(), WardenError> {
        self.send(&format!("rcon \"{}\" {}", self.password, command))
            .await
    }

    async fn recv_one(&self, timeout: Duration) -> Result<Vec<u8>, WardenError> {
        let mut buf = vec![0u8; RECV_BUF];
        let n = tokio::time::timeout(timeout, self.sock.recv(&mut buf))
            .await
            .map_err(|_| WardenError::RconTimeout)??;
        buf.truncate(n);
        Ok(buf)
    }

    /// Sends `payload` and waits for one reply datagram, retrying the whole
    /// exchange until the retry budget is exhausted.
    pub async fn request(
        &self,
        payload: &str,
        timeout: Duration,
        retries: u32,
    ) -> Result<(String, String), WardenError> {
        let _guard = self.exchange.lock().await;
        for _ in 0..retries.max(1) {
            self.send(payload).await?;
            match self.recv_one(timeout).await {
                Ok(data) => return parse_packet(&data),
                Err(WardenError::RconTimeout) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(WardenError::RconTimeout)
    }

    /// Sends an rcon command and returns `(type, body)` of the reply.
    pub async fn rcon(&self, command: &str) -> Result<(String, String), WardenError> {
        let payload = format!("rcon \"{}\" {}", self.password, command);
        let (kind, body) = self
            .request(&payload, REQUEST_TIMEOUT, REQUEST_RETRIES)
            .await?;
        if body == "No rconpassword set on the server.\n" || body == "Bad rconpassword.\n" {
            return Err(WardenError::RconAuth(body.trim_end().to_string()));
        }
        Ok((kind, body))
    }

    /// Reads a cvar value, e.g. `mapname` -> `ut4_casa`.
    pub async fn cvar(&self, name: &str) -> Result<String, WardenError> {
        let (_, body) = self.rcon(name).await?;
        // Replies arriving too quickly after one another get conflated by
        // the server; give it a moment before the next exchange.
        tokio::time::sleep(REPLY_SETTLE).await;
        extract_cvar(&body).ok_or_else(|| WardenError::CvarMissing(name.to_string()))
    }

    /// Issues `getstatus` and refreshes the cached value map and player list.
    pub async fn status_refresh(&self) -> Result<(), WardenError> {
        let (_, body) = self
            .request("getstatus", REQUEST_TIMEOUT, REQUEST_RETRIES)
            .await?;
        let (values, players) = parse_status(&body);
        *self.values.lock() = values;
        *self.players.lock() = players;
        Ok(())
    }

    /// Issues the rcon `status` command and returns the slot-indexed player
    /// rows (score, ping, name, address).
    pub async fn player_status(&self) -> Result<Vec<StatusPlayer>, WardenError> {
        let (kind, body) = self.rcon("status").await?;
        if kind != "print" || !body.starts_with("map") {
            return Ok(Vec::new());
        }
        Ok(parse_player_status(&body))
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    pub fn players(&self) -> Vec<StatusPlayer> {
        self.players.lock().clone()
    }
}

/// Splits a reply datagram into response type and body.
fn parse_packet(data: &[u8]) -> Result<(String, String), WardenError> {
    if data.len() < OOB_PREFIX.len() || data[..OOB_PREFIX.len()] != OOB_PREFIX {
        return Err(WardenError::MalformedPacket);
    }
    let text = String::from_utf8_lossy(&data[OOB_PREFIX.len()..]);
    let Some(newline) = text.find('\n') else {
        return Err(WardenError::MalformedPacket);
    };
    Ok((
        text[..newline].to_string(),
        text[newline + 1..].to_string(),
    ))
}

/// Extracts a cvar value from a `"<name>" is:"<value>^7" default:...` body.
fn extract_cvar(body: &str) -> Option<String> {
    let (_, rest) = body.split_once(":\"")?;
    let (value, _) = rest.split_once("^7")?;
    Some(value.trim_start_matches('"').to_string())
}

/// Parses a `getstatus` body: a backslash-delimited key/value map whose last
/// value may carry the per-player block after an embedded newline.
fn parse_status(body: &str) -> (HashMap<String, String>, Vec<StatusPlayer>) {
    let mut values = HashMap::new();
    let mut players = Vec::new();
    let trimmed = body.strip_prefix('\\').unwrap_or(body);
    let mut parts = trimmed.split('\\');
    while let (Some(key), Some(val)) = (parts.next(), parts.next()) {
        match val.split_once('\n') {
            Some((head, player_block)) => {
                values.insert(key.to_string(), head.to_string());
                for line in player_block.lines() {
                    if let Some(caps) = STATUS_PLAYER.captures(line) {
                        players.push(StatusPlayer {
                            slot: None,
                            frags: caps[1].parse().unwrap_or(0),
                            ping: caps[2].parse().unwrap_or(0),
                            name: caps[3].to_string(),
                            address: None,
                        });
                    }
                }
            }
            None => {
                values.insert(key.to_string(), val.to_string());
            }
        }
    }
    (values, players)
}

/// Parses the rcon `status` table. The header is three lines; the rows are
/// whitespace-aligned columns `num score ping name lastmsg address ...`.
fn parse_player_status(body: &str) -> Vec<StatusPlayer> {
    let mut players = Vec::new();
    for line in body.lines().skip(3) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            continue;
        }
        let (Ok(slot), Ok(frags), Ok(ping)) = (
            fields[0].parse::<u16>(),
            fields[1].parse::<i32>(),
            fields[2].parse::<u16>(),
        ) else {
            continue;
        };
        players.push(StatusPlayer {
            slot: Some(slot),
            frags,
            ping,
            name: fields[3].to_string(),
            address: Some(fields[5].to_string()),
        });
    }
    players
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_packet_splits_type_and_body() {
        let mut data = OOB_PREFIX.to_vec();
        data.extend_from_slice(b"statusResponse\n\\mapname\\ut4_casa");
        let (kind, body) = parse_packet(&data).unwrap();
        assert_eq!(kind, "statusResponse");
        assert_eq!(body, "\\mapname\\ut4_casa");
    }

    #[test]
    fn parse_packet_rejects_bad_prefix() {
        assert!(matches!(
            parse_packet(b"nonsense\n"),
            Err(WardenError::MalformedPacket)
        ));
    }

    #[test]
    fn status_body_with_players() {
        let body = "\\mapname\\ut4_casa\\sv_maxclients\\16\n3 48 \"^1Shooter\"\n0 999 \"lagger\"\n";
        let (values, players) = parse_status(body);
        assert_eq!(values.get("mapname").map(String::as_str), Some("ut4_casa"));
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].frags, 3);
        assert_eq!(players[0].ping, 48);
        assert_eq!(players[0].name, "^1Shooter");
    }

    #[test]
    fn cvar_extraction() {
        let body = "\"mapname\" is:\"ut4_casa^7\" default:\"ut4_abbey^7\"\n";
        assert_eq!(extract_cvar(body).as_deref(), Some("ut4_casa"));
        assert_eq!(extract_cvar("no such framing"), None);
    }

    #[test]
    fn player_status_rows() {
        let body = "map: ut4_casa\nnum score ping name lastmsg address qport rate\n--- ----- ---- ---- ------- ------- ----- -----\n  2     7   42 Gunner 0 10.0.0.7:27960 1234 25000\n";
        let rows = parse_player_status(body);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].slot, Some(2));
        assert_eq!(rows[0].ping, 42);
        assert_eq!(rows[0].address.as_deref(), Some("10.0.0.7:27960"));
    }
}
