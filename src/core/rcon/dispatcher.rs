// src/core/rcon/dispatcher.rs

//! The single-writer RCON dispatcher.
//!
//! All outbound commands funnel through one FIFO drained by a dedicated
//! worker that sleeps between sends; the server conflates or drops packets
//! arriving too close together. The queue is gated: until the log tailer
//! reaches end-of-file the first time, enqueued commands are dropped so the
//! daemon does not replay reactions to stale log lines.

use crate::core::rcon::client::RconClient;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, broadcast};
use tracing::{debug, info, warn};

/// Chat width the server renders before clipping a `say` line.
const SAY_WRAP: usize = 145;
/// Same for `tell`; slightly narrower because of the `[pm]` tag.
const TELL_WRAP: usize = 135;

struct QueueInner {
    queue: Mutex<VecDeque<String>>,
    notify: Notify,
    live: AtomicBool,
}

/// Cheaply clonable enqueue handle. Every component other than the worker
/// talks to the server through one of these.
#[derive(Clone)]
pub struct RconHandle(Arc<QueueInner>);

impl RconHandle {
    pub fn new() -> Self {
        RconHandle(Arc::new(QueueInner {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            live: AtomicBool::new(false),
        }))
    }

    /// Queues one raw server command. Dropped while the live gate is down.
    pub fn enqueue(&self, command: impl Into<String>) {
        if !self.is_live() {
            return;
        }
        self.0.queue.lock().push_back(command.into());
        self.0.notify.notify_one();
    }

    /// Empties the queue atomically; used at map change and shutdown.
    pub fn clear(&self) {
        self.0.queue.lock().clear();
    }

    pub fn go_live(&self) {
        self.0.live.store(true, Ordering::Release);
        info!("RCON dispatcher is live");
    }

    pub fn is_live(&self) -> bool {
        self.0.live.load(Ordering::Acquire)
    }

    pub fn queued(&self) -> usize {
        self.0.queue.lock().len()
    }

    /// Takes the next queued command; the worker's accessor.
    pub fn pop(&self) -> Option<String> {
        self.0.queue.lock().pop_front()
    }

    // --- Message composition ----------------------------------------------

    /// Global chat message, wrapped into server-sized lines.
    pub fn say(&self, msg: &str) {
        for line in wrap(msg, SAY_WRAP) {
            self.enqueue(format!("say ^3{line}"));
        }
    }

    /// Private message to one slot. The first line carries a `[pm]` tag
    /// unless suppressed.
    pub fn tell(&self, slot: u16, msg: &str, pm_tag: bool) {
        let mut prefix = if pm_tag { "^4[pm] " } else { "" };
        for line in wrap(msg, TELL_WRAP) {
            self.enqueue(format!("tell {slot} {prefix}^3{line}"));
            prefix = "";
        }
    }

    pub fn bigtext(&self, msg: &str) {
        self.enqueue(format!("bigtext \"{msg}\""));
    }

    pub fn force_team(&self, slot: u16, team: &str) {
        self.enqueue(format!("forceteam {slot} {team}"));
    }
}

impl Default for RconHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Greedy word wrap; a single overlong word becomes its own line.
fn wrap(msg: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in msg.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// The worker owning the send side of the socket.
pub struct RconDispatcher {
    handle: RconHandle,
    client: Arc<RconClient>,
    delay: Duration,
}

impl RconDispatcher {
    pub fn new(handle: RconHandle, client: Arc<RconClient>, delay: Duration) -> Self {
        RconDispatcher {
            handle,
            client,
            delay,
        }
    }

    /// Runs the send loop until shutdown, then drains the queue to zero.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            "RCON dispatcher started (inter-send delay {} ms)",
            self.delay.as_millis()
        );
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    let mut drained = 0usize;
                    while let Some(cmd) = self.handle.pop() {
                        if let Err(e) = self.client.send_rcon(&cmd).await {
                            warn!("RCON send failed during drain: {e}");
                        }
                        drained += 1;
                    }
                    if drained > 0 {
                        debug!("Drained {drained} queued RCON commands at shutdown");
                    }
                    return;
                }
                _ = self.handle.0.notify.notified() => {
                    while let Some(cmd) = self.handle.pop() {
                        if let Err(e) = self.client.send_rcon(&cmd).await {
                            warn!("RCON send failed: {e}");
                        }
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_drops_until_live() {
        let handle = RconHandle::new();
        handle.enqueue("say hello");
        assert_eq!(handle.queued(), 0);
        handle.go_live();
        handle.enqueue("say hello");
        assert_eq!(handle.queued(), 1);
    }

    #[test]
    fn enqueue_preserves_order() {
        let handle = RconHandle::new();
        handle.go_live();
        handle.enqueue("first");
        handle.enqueue("second");
        assert_eq!(handle.pop().as_deref(), Some("first"));
        assert_eq!(handle.pop().as_deref(), Some("second"));
    }

    #[test]
    fn clear_empties_the_queue() {
        let handle = RconHandle::new();
        handle.go_live();
        handle.enqueue("a");
        handle.enqueue("b");
        handle.clear();
        assert_eq!(handle.queued(), 0);
    }

    #[test]
    fn say_wraps_long_messages() {
        let handle = RconHandle::new();
        handle.go_live();
        let long = "word ".repeat(60);
        handle.say(&long);
        assert!(handle.queued() > 1);
    }

    #[test]
    fn tell_tags_only_first_line() {
        let handle = RconHandle::new();
        handle.go_live();
        let long = "word ".repeat(60);
        handle.tell(3, &long, true);
        let first = handle.pop().unwrap();
        let second = handle.pop().unwrap();
        assert!(first.contains("[pm]"));
        assert!(!second.contains("[pm]"));
    }
}
