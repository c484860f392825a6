//! Process configuration
//!
//! Every knob is fixed at process start: bind address, read chunk size,
//! idle eviction threshold, the global text encoding, and whether a
//! broadcast is echoed back to its sender. There is no runtime
//! reconfiguration.

use std::time::Duration;

use clap::Parser;

/// Relay server configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "chat-relay", about = "Line-oriented TCP chat relay")]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "RELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "RELAY_PORT", default_value_t = 8888)]
    pub port: u16,

    /// Read chunk size in bytes; one chunk is treated as one message unit
    #[arg(long, default_value_t = 1024)]
    pub buffer_size: usize,

    /// Seconds of inbound silence before a connection is evicted
    #[arg(long, default_value_t = 60)]
    pub idle_timeout: u64,

    /// Text encoding label shared by all connections (e.g. utf-8, gbk)
    #[arg(long, env = "RELAY_ENCODING", default_value = "utf-8")]
    pub encoding: String,

    /// Whether a broadcast is echoed back to its sender
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub echo_to_sender: bool,
}

impl Config {
    /// The `host:port` string handed to the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Idle eviction threshold as a duration
    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }
}
