//! Error types for the relay server
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal startup errors (bind failure, unknown encoding) and
/// per-connection recoverable errors (undecodable messages).
#[derive(Debug, Error)]
pub enum RelayError {
    /// Failed to bind the listening socket (fatal, e.g. port in use)
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error on a client connection
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding label not recognized by encoding_rs (fatal at startup)
    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// Inbound bytes are not valid in the configured encoding
    ///
    /// The message is dropped; the connection stays up.
    #[error("bytes are not valid {0}")]
    Decode(&'static str),

    /// Channel send error (fatal - internal channel broken)
    #[error("channel send error")]
    ChannelSend,
}

/// Message send errors
///
/// Occurs when attempting to send lines through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("channel closed")]
    ChannelClosed,
}
