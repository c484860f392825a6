//! Line-oriented TCP Chat Relay Library
//!
//! A chat relay over plain TCP: clients connect, send text, and the server
//! fans each message out to every connected peer or to one addressed peer,
//! while tracking liveness and evicting idle connections.
//!
//! # Features
//! - Broadcast messaging (`<sender>: <payload>`, sender echo configurable)
//! - Directed messaging (`@ip:port payload` -> `from <sender>: <payload>`)
//! - Join/leave announcements with a refreshed roster on every membership change
//! - Idle eviction on a one-second reaper tick
//! - Configurable global text encoding (UTF-8 default, GBK for legacy deployments)
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `RelayServer` is the central actor owning the connection registry
//! - Each connection runs a read task and a write pump communicating with
//!   the actor
//! - No locks needed - all registry access goes through message passing,
//!   so the registry has exactly one writer
//!
//! # Example
//! ```ignore
//! use clap::Parser;
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use chat_relay::{handle_connection, Config, RelayServer, TextCodec};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::parse();
//!     let codec = TextCodec::for_label(&config.encoding).unwrap();
//!     let listener = TcpListener::bind(config.bind_addr()).await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(RelayServer::new(cmd_rx, codec, &config).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx, codec, config.buffer_size));
//!     }
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use codec::TextCodec;
pub use config::Config;
pub use error::{RelayError, SendError};
pub use handler::handle_connection;
pub use message::Inbound;
pub use registry::Registry;
pub use server::{DisconnectReason, RelayServer, ServerCommand};
pub use session::Session;
pub use types::ConnId;
