//! Relay actor implementation
//!
//! The central actor that owns the connection registry and performs all
//! routing: broadcast, directed delivery, membership announcements, and
//! idle eviction. Uses the Actor pattern with mpsc channels for message
//! passing - connection tasks never touch shared state, so the registry
//! has exactly one writer and needs no lock.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::codec::TextCodec;
use crate::config::Config;
use crate::message::{self, Inbound};
use crate::registry::Registry;
use crate::session::Session;
use crate::types::ConnId;

/// Reaper tick period
///
/// Eviction latency is bounded by one tick beyond the idle threshold.
const REAP_TICK: Duration = Duration::from_secs(1);

/// Why a connection is being torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Peer closed the connection in an orderly way (zero-byte read)
    Left,
    /// Read or write error: reset, broken pipe
    Dropped,
    /// Idle beyond the configured threshold
    Evicted,
}

/// Commands sent from connection tasks to the relay actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection accepted
    Connect {
        id: ConnId,
        addr: String,
        sender: mpsc::Sender<String>,
    },
    /// One received chunk of raw bytes
    Inbound { id: ConnId, bytes: Vec<u8> },
    /// Connection closed from the socket side
    Disconnect { id: ConnId, reason: DisconnectReason },
}

/// The main relay actor
///
/// Owns the registry and processes commands from connection tasks. The
/// idle reaper shares the loop through a timer tick, so registry mutation
/// never races live traffic.
pub struct RelayServer {
    registry: Registry,
    receiver: mpsc::Receiver<ServerCommand>,
    codec: TextCodec,
    idle_threshold: Duration,
    echo_to_sender: bool,
}

impl RelayServer {
    /// Create a new relay actor with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, codec: TextCodec, config: &Config) -> Self {
        Self {
            registry: Registry::new(),
            receiver,
            codec,
            idle_threshold: config.idle_threshold(),
            echo_to_sender: config.echo_to_sender,
        }
    }

    /// Run the relay event loop
    ///
    /// Processes commands until all senders are dropped. A failure on one
    /// connection tears down only that connection, never the loop.
    pub async fn run(mut self) {
        info!("relay actor started");

        let mut tick = time::interval(REAP_TICK);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                _ = tick.tick() => self.reap().await,
            }
        }

        info!("relay actor shutting down");
    }

    /// Process a single command
    async fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect { id, addr, sender } => {
                self.handle_connect(id, addr, sender).await;
            }
            ServerCommand::Inbound { id, bytes } => {
                self.handle_inbound(id, bytes).await;
            }
            ServerCommand::Disconnect { id, reason } => {
                self.handle_disconnect(id, reason).await;
            }
        }
    }

    /// Handle a newly accepted connection
    async fn handle_connect(&mut self, id: ConnId, addr: String, sender: mpsc::Sender<String>) {
        info!("{} joined", addr);
        self.registry.insert(Session::new(id, addr.clone(), sender));

        // Join notice and refreshed roster go to everyone but the joiner;
        // the roster itself includes the joiner.
        self.announce(Some(id), &format!("{addr} joined")).await;
        self.send_roster(Some(id)).await;

        debug!("live sessions: {}", self.registry.len());
    }

    /// Handle one received chunk from a connection
    async fn handle_inbound(&mut self, id: ConnId, bytes: Vec<u8>) {
        // A chunk can outlive its session when eviction races a read.
        let Some(session) = self.registry.get_mut(id) else {
            return;
        };
        if session.eviction_pending {
            return;
        }
        // The read itself proves liveness, even if the bytes turn out to
        // be undecodable.
        session.touch();
        let sender_addr = session.addr.clone();

        let text = match self.codec.decode(&bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("dropping message from {}: {}", sender_addr, e);
                return;
            }
        };
        let line = message::strip_terminator(&text);
        debug!("{}: {}", sender_addr, line);

        match message::classify(line) {
            Inbound::Directed { to, body } => {
                self.deliver_directed(id, &sender_addr, &to, &body).await;
            }
            Inbound::Broadcast(body) => {
                self.deliver_broadcast(id, &sender_addr, &body).await;
            }
        }
    }

    /// Handle a connection teardown
    ///
    /// Removal from the registry is the teardown: dropping the session
    /// closes its outbound channel, which ends the write pump and the
    /// socket. Survivors then get the departure notice and a refreshed
    /// roster; the removed session never sees its own announcement.
    async fn handle_disconnect(&mut self, id: ConnId, reason: DisconnectReason) {
        // Eviction may already have removed this session; the socket-side
        // command that follows is then a no-op.
        let Some(session) = self.registry.remove(id) else {
            return;
        };

        let notice = match reason {
            DisconnectReason::Left => format!("{} left", session.addr),
            DisconnectReason::Dropped => format!("{} disconnected", session.addr),
            DisconnectReason::Evicted => {
                format!("{} was disconnected for inactivity", session.addr)
            }
        };
        info!("{}", notice);

        self.announce(None, &notice).await;
        self.send_roster(None).await;

        debug!("live sessions: {}", self.registry.len());
    }

    /// Deliver a directed message to exactly one addressed peer
    ///
    /// If the address resolves to no live session, only the sender hears
    /// about it.
    async fn deliver_directed(&self, sender_id: ConnId, sender_addr: &str, to: &str, body: &str) {
        let target = self
            .registry
            .resolve(to)
            .and_then(|id| self.registry.get(id))
            .filter(|session| !session.eviction_pending);

        match target {
            Some(target) => {
                let _ = target.send(message::directed_line(sender_addr, body)).await;
            }
            None => {
                debug!("directed delivery from {} to {} failed", sender_addr, to);
                if let Some(sender) = self.registry.get(sender_id) {
                    let _ = sender
                        .send(message::admin_line(&format!(
                            "directed delivery failed: {to} not found"
                        )))
                        .await;
                }
            }
        }
    }

    /// Deliver a broadcast to every live session
    ///
    /// The sender is included unless `echo_to_sender` is configured off.
    async fn deliver_broadcast(&self, sender_id: ConnId, sender_addr: &str, body: &str) {
        let line = message::broadcast_line(sender_addr, body);
        for session in self.registry.live() {
            if !self.echo_to_sender && session.id == sender_id {
                continue;
            }
            let _ = session.send(line.clone()).await;
        }
    }

    /// One reaper pass: evict every session idle beyond the threshold
    ///
    /// All victims are marked before any teardown, so a departure
    /// announcement is never delivered to a fellow victim. Each victim
    /// gets a final notice, then the common teardown path runs.
    async fn reap(&mut self) {
        let now = Instant::now();
        let victims = self.registry.idle(now, self.idle_threshold);

        for &id in &victims {
            if let Some(session) = self.registry.get_mut(id) {
                session.eviction_pending = true;
            }
        }

        for id in victims {
            if let Some(session) = self.registry.get(id) {
                let _ = session
                    .send(message::admin_line("you were disconnected for inactivity"))
                    .await;
            }
            self.handle_disconnect(id, DisconnectReason::Evicted).await;
        }
    }

    /// Admin notice to every live session except `skip`
    async fn announce(&self, skip: Option<ConnId>, notice: &str) {
        let line = message::admin_line(notice);
        for session in self.registry.live() {
            if Some(session.id) == skip {
                continue;
            }
            let _ = session.send(line.clone()).await;
        }
    }

    /// Refreshed roster to every live session except `skip`
    async fn send_roster(&self, skip: Option<ConnId>) {
        let line = message::roster_line(&self.registry.roster());
        for session in self.registry.live() {
            if Some(session.id) == skip {
                continue;
            }
            let _ = session.send(line.clone()).await;
        }
    }
}
