// src/core/tailer.rs

//! The games-log tailer: the daemon's heartbeat.
//!
//! Starts at the end of the append-only log, walks backwards to the most
//! recent `InitGame` to seed the match state, then follows the file line by
//! line. The first empty poll flips the live gate: from that point onward
//! events describe the present, and outbound RCON commands are allowed out.

use crate::core::Daemon;
use crate::core::WardenError;
use crate::core::handlers;
use crate::core::parser::Event;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Chunk size for the backwards `InitGame` scan.
const SCAN_CHUNK: u64 = 768;
/// Upper bound on the backwards scan; one match always fits.
const SCAN_LIMIT: u64 = 1024 * 1024;
/// Poll delay at end-of-file.
const EOF_POLL: std::time::Duration = std::time::Duration::from_millis(125);

pub struct LogTailer {
    daemon: Arc<Daemon>,
    path: PathBuf,
}

impl LogTailer {
    pub fn new(daemon: Arc<Daemon>, path: impl Into<PathBuf>) -> Self {
        LogTailer {
            daemon,
            path: path.into(),
        }
    }

    /// Runs until shutdown. A missing log file is fatal; a bad line is not.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<(), WardenError> {
        if !self.path.exists() {
            return Err(WardenError::LogMissing(
                self.path.to_string_lossy().into_owned(),
            ));
        }
        // Seed the match state from the most recent InitGame line.
        if let Some(line) = find_game_start(&self.path)? {
            match Event::parse(&line) {
                Ok(Some(event @ Event::InitGame(_))) => {
                    handlers::handle_event(&self.daemon, event).await;
                }
                _ => debug!("no usable InitGame line in the scan window"),
            }
        }

        let file = tokio::fs::File::open(&self.path).await?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::End(0)).await?;
        info!("tailing games log '{}'", self.path.display());

        let mut line = String::new();
        loop {
            line.clear();
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("log tailer stopping");
                    return Ok(());
                }
                read = reader.read_line(&mut line) => {
                    match read {
                        Ok(0) => {
                            if !self.daemon.rcon.is_live() {
                                self.go_live().await;
                            }
                            tokio::time::sleep(EOF_POLL).await;
                        }
                        Ok(_) => self.dispatch(&line).await,
                        Err(e) => {
                            warn!("log read error: {e}");
                            tokio::time::sleep(EOF_POLL).await;
                        }
                    }
                }
            }
        }
    }

    async fn dispatch(&self, line: &str) {
        match Event::parse(line) {
            Ok(Some(event)) => handlers::handle_event(&self.daemon, event).await,
            Ok(None) => {}
            // One bad line is logged and skipped; the tailer never aborts.
            Err(e) => debug!("skipping malformed line: {e}"),
        }
    }

    /// First end-of-file: open the gate and take the initial server snapshot.
    async fn go_live(&self) {
        self.daemon.rcon.go_live();

        let maps = match self.daemon.client.rcon("dir map bsp").await {
            Ok((_, body)) => {
                let mut maps: Vec<String> = body
                    .split_whitespace()
                    .filter(|entry| entry.starts_with('/'))
                    .map(|entry| {
                        entry
                            .trim_start_matches('/')
                            .trim_end_matches(".bsp")
                            .to_string()
                    })
                    .collect();
                maps.sort_unstable();
                maps
            }
            Err(e) => {
                warn!("cannot list server maps: {e}");
                Vec::new()
            }
        };
        let maplist = self.load_mapcycle().await;
        let mapname = self.daemon.client.cvar("mapname").await.ok();

        let mut game = self.daemon.game.lock();
        if !maps.is_empty() {
            game.all_maps = maps;
        }
        if !maplist.is_empty() {
            game.maplist = maplist;
        }
        game.set_current_map(mapname);
        info!(
            "live on map {} ({} maps known, {} in rotation)",
            game.mapname.as_deref().unwrap_or("unknown"),
            game.all_maps.len(),
            game.maplist.len()
        );
    }

    /// The rotation comes from the configured dynamic cycles or from the
    /// file the server's `g_mapcycle` cvar names.
    async fn load_mapcycle(&self) -> Vec<String> {
        let mc = &self.daemon.config.mapcycle;
        if mc.dynamic_mapcycle {
            return mc.small_cycle.split_whitespace().map(str::to_string).collect();
        }
        let Ok(cycle_file) = self.daemon.client.cvar("g_mapcycle").await else {
            return Vec::new();
        };
        match tokio::fs::read_to_string(&cycle_file).await {
            Ok(content) => parse_mapcycle(&content),
            Err(e) => {
                warn!("cannot read mapcycle file '{cycle_file}': {e}");
                Vec::new()
            }
        }
    }
}

/// Walks backwards through the log in fixed-size chunks until an `InitGame`
/// line is found, and returns that line (the most recent one).
fn find_game_start(path: &Path) -> Result<Option<String>, WardenError> {
    let mut file = std::fs::File::open(path)?;
    let len = file.seek(SeekFrom::End(0))?;
    let mut window = SCAN_CHUNK;
    loop {
        let start = len.saturating_sub(window);
        file.seek(SeekFrom::Start(start))?;
        let mut buf = Vec::with_capacity((len - start) as usize);
        file.read_to_end(&mut buf)?;
        let text = String::from_utf8_lossy(&buf);
        if let Some(line) = text
            .lines()
            .rev()
            .find(|line| line.contains("InitGame:"))
        {
            return Ok(Some(line.to_string()));
        }
        if start == 0 || window >= SCAN_LIMIT {
            return Ok(None);
        }
        window += SCAN_CHUNK;
    }
}

/// Extracts map names from a `mapcycle.txt`, skipping per-map option blocks.
fn parse_mapcycle(content: &str) -> Vec<String> {
    let mut maps = Vec::new();
    let mut depth = 0usize;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        match line {
            "{" => depth += 1,
            "}" => depth = depth.saturating_sub(1),
            _ if depth == 0 => maps.push(line.to_string()),
            _ => {}
        }
    }
    maps
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn finds_most_recent_init_game() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  0:00 InitGame: \\g_gametype\\4\\mapname\\ut4_abbey").unwrap();
        for i in 0..100 {
            writeln!(file, "  0:{i:02} Kill: 1 2 19: A killed B by UT_MOD_LR300").unwrap();
        }
        writeln!(file, "  3:00 InitGame: \\g_gametype\\7\\mapname\\ut4_casa").unwrap();
        writeln!(file, "  3:05 ClientSpawn: 2").unwrap();
        let line = find_game_start(file.path()).unwrap().unwrap();
        assert!(line.contains("ut4_casa"));
    }

    #[test]
    fn empty_log_has_no_game_start() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(find_game_start(file.path()).unwrap().is_none());
    }

    #[test]
    fn mapcycle_blocks_are_skipped() {
        let content = "ut4_casa\n{\n  g_gametype 7\n}\nut4_abbey\nut4_turnpike\n";
        assert_eq!(
            parse_mapcycle(content),
            vec!["ut4_casa", "ut4_abbey", "ut4_turnpike"]
        );
    }
}
