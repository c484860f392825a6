//! Connection handler
//!
//! Handles one TCP connection: registers it with the relay actor, turns
//! received chunks into commands, and pumps outbound lines back to the
//! socket. One chunk read is one message unit - there is no framing, so a
//! message larger than the buffer, or two messages arriving in one read,
//! are not split (a known boundary condition inherited from the wire
//! format).

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::codec::TextCodec;
use crate::error::RelayError;
use crate::server::{DisconnectReason, ServerCommand};
use crate::types::ConnId;

/// Outbound line channel depth per connection
const OUTBOUND_BUFFER: usize = 32;

/// Handle a new TCP connection
///
/// Registers the connection, then runs a read task and a write pump until
/// either side finishes: the peer closing or erroring ends the read task,
/// the actor unregistering the session (dropping its sender) ends the
/// write pump. Whichever finishes first aborts the other, which drops both
/// socket halves and closes the connection.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
    codec: TextCodec,
    buffer_size: usize,
) -> Result<(), RelayError> {
    let addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let (mut reader, mut writer) = stream.into_split();

    let id = ConnId::new();
    info!("{} connected", addr);

    // Channel for actor -> connection outbound lines
    let (line_tx, mut line_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);

    // Register with the relay actor
    if cmd_tx
        .send(ServerCommand::Connect {
            id,
            addr: addr.clone(),
            sender: line_tx,
        })
        .await
        .is_err()
    {
        error!("failed to register {} - server closed", addr);
        return Err(RelayError::ChannelSend);
    }

    let cmd_tx_read = cmd_tx.clone();
    let read_addr = addr.clone();

    // Read task: one chunk is one message unit, handed to the actor raw.
    let mut read_task = tokio::spawn(async move {
        let mut buf = vec![0u8; buffer_size];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => {
                    // Orderly peer close, not an error.
                    debug!("{} closed the connection", read_addr);
                    break DisconnectReason::Left;
                }
                Ok(n) => {
                    let cmd = ServerCommand::Inbound {
                        id,
                        bytes: buf[..n].to_vec(),
                    };
                    if cmd_tx_read.send(cmd).await.is_err() {
                        debug!("server closed, ending read task for {}", read_addr);
                        break DisconnectReason::Dropped;
                    }
                }
                Err(e) => {
                    // Reset / broken pipe: abnormal close, same teardown.
                    warn!("read error from {}: {}", read_addr, e);
                    break DisconnectReason::Dropped;
                }
            }
        }
    });

    let write_addr = addr.clone();

    // Write pump: encode and flush queued lines. Returns Some when the
    // socket failed, None when the actor dropped the session.
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = line_rx.recv().await {
            let bytes = codec.encode(&line);
            if let Err(e) = writer.write_all(&bytes).await {
                debug!("write to {} failed: {}", write_addr, e);
                return Some(DisconnectReason::Dropped);
            }
        }
        // Channel closed: the session was unregistered; flush done, shut
        // the socket down.
        let _ = writer.shutdown().await;
        debug!("write pump ended for {}", write_addr);
        None
    });

    let reason = tokio::select! {
        res = &mut read_task => {
            write_task.abort();
            res.unwrap_or(DisconnectReason::Dropped)
        }
        res = &mut write_task => {
            read_task.abort();
            res.ok().flatten().unwrap_or(DisconnectReason::Dropped)
        }
    };

    // No-op if the actor already tore the session down (eviction).
    let _ = cmd_tx.send(ServerCommand::Disconnect { id, reason }).await;

    debug!("{} handler finished", addr);

    Ok(())
}
