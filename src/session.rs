//! Session struct definition
//!
//! Represents one live connection: its addressable name, outbound line
//! channel, and the liveness bookkeeping used by the idle reaper.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::types::ConnId;

/// Live connection information
///
/// One entry per accepted connection. The `addr` string (`ip:port`) is the
/// addressable name used in directed messaging and is unique among live
/// sessions by construction.
#[derive(Debug)]
pub struct Session {
    /// Unique identifier for this connection
    pub id: ConnId,
    /// Peer address string (`ip:port`)
    pub addr: String,
    /// Server → connection outbound line channel
    pub sender: mpsc::Sender<String>,
    /// Updated on every successful inbound read
    pub last_activity: Instant,
    /// Set the instant the reaper picks this session, so no delivery path
    /// writes to a connection mid-teardown
    pub eviction_pending: bool,
}

impl Session {
    /// Create a new session with the given id, peer address and sender channel
    pub fn new(id: ConnId, addr: String, sender: mpsc::Sender<String>) -> Self {
        Self {
            id,
            addr,
            sender,
            last_activity: Instant::now(),
            eviction_pending: false,
        }
    }

    /// Queue one outbound line for this connection's write pump
    ///
    /// Returns an error if the channel is closed (connection torn down).
    pub async fn send(&self, line: String) -> Result<(), SendError> {
        self.sender
            .send(line)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Refresh the activity timestamp
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Time since the last inbound read as of `now`
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }
}
