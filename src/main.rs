//! TCP Chat Relay - Entry Point
//!
//! Parses configuration, binds the listening socket, starts the relay
//! actor, and accepts connections.

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chat_relay::{handle_connection, Config, RelayError, RelayServer, TextCodec};

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    let config = Config::parse();

    // The encoding is a single global setting shared by all connections;
    // an unknown label is fatal at startup.
    let codec = match TextCodec::for_label(&config.encoding) {
        Ok(codec) => codec,
        Err(e) => {
            error!("{}", e);
            return Err(e);
        }
    };

    // Bind failure (e.g. port in use) is fatal: report and exit, no retry.
    let addr = config.bind_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to bind {}: {}", addr, e);
            return Err(RelayError::Bind { addr, source: e });
        }
    };
    info!(
        "chat relay listening on {} (encoding {}, idle timeout {}s)",
        addr,
        codec.name(),
        config.idle_timeout
    );

    // Create relay actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let server = RelayServer::new(cmd_rx, codec, &config);
    tokio::spawn(server.run());

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                info!("new connection from {}", peer);
                let cmd_tx = cmd_tx.clone();
                let buffer_size = config.buffer_size;

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx, codec, buffer_size).await {
                        error!("connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}
