//! # Heartbeat Monitor
//!
//! Liveness bookkeeping for the active connection. Detects silently-dead
//! transports that the socket layer itself would never report as closed.
//!
//! Only a server `"heartbeat"` frame refreshes the liveness timestamp; a
//! successfully-sent ping proves nothing about the other side.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Outbound keepalive frame, sent on each tick while the transport is open
pub const PING_FRAME: &str = r#"{"type":"ping"}"#;

/// Tracks when the server last proved it was alive
#[derive(Debug)]
pub struct HeartbeatMonitor {
    interval: Duration,
    last_seen: Mutex<Instant>,
}

impl HeartbeatMonitor {
    /// Create a monitor; the connection counts as alive right now
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_seen: Mutex::new(Instant::now()),
        }
    }

    /// Tick period for the driving timer
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record proof of liveness (a server heartbeat frame, or connection open)
    pub fn mark_alive(&self) {
        if let Ok(mut last) = self.last_seen.lock() {
            *last = Instant::now();
        }
    }

    /// Whether the connection should be treated as dead: more than twice
    /// the heartbeat interval has passed since the last proof of life.
    pub fn is_stale(&self) -> bool {
        self.last_seen
            .lock()
            .map(|last| last.elapsed() > 2 * self.interval)
            .unwrap_or(false)
    }
}
