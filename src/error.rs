//! Error types for sphinx-client.

use std::time::Duration;

use thiserror::Error;

/// A codec read ran past the end of the available bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("buffer underflow: needed {needed} bytes, {remaining} remaining")]
pub struct UnderflowError {
    /// Bytes the read required.
    pub needed: usize,
    /// Bytes that were left in the buffer.
    pub remaining: usize,
}

/// A codec write exceeded the 32-bit length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("length overflow: {len} bytes exceed the 32-bit length prefix")]
pub struct LengthOverflowError {
    /// Length that did not fit.
    pub len: usize,
}

/// Main error type for all searchd operations.
#[derive(Debug, Error)]
pub enum SphinxError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error (configuration and query descriptions).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server announced a protocol version this client cannot talk to.
    #[error("Wrong protocol version: {version}")]
    HandshakeVersion { version: i32 },

    /// An operation was attempted without an open connection.
    #[error("Not connected to searchd")]
    NotConnected,

    /// Peer closed the connection before the response was complete.
    #[error("Connection closed while {state} ({received} bytes received)")]
    ConnectionClosed {
        state: &'static str,
        received: usize,
    },

    /// Raw codec read past the available bytes.
    #[error(transparent)]
    Underflow(#[from] UnderflowError),

    /// Raw codec write exceeded the length prefix.
    #[error(transparent)]
    LengthOverflow(#[from] LengthOverflowError),

    /// Response body could not be decoded.
    #[error("Malformed searchd response in {section}: {reason}")]
    MalformedResponse {
        section: &'static str,
        reason: String,
    },

    /// Declared body length does not match the bytes received.
    #[error("Failed to read searchd response (len={declared}, read={received})")]
    LengthMismatch { declared: usize, received: usize },

    /// Data arrived past the end of the declared response body.
    #[error("Received {extra} bytes past the declared response length {declared}")]
    TrailingBytes { declared: usize, extra: usize },

    /// Protocol error (bad header, unknown status, oversized body).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// searchd answered with ERROR.
    #[error("Server issued ERROR: {message}")]
    ServerError { message: String },

    /// searchd answered with RETRY (temporary failure).
    #[error("Server issued RETRY: {message}")]
    ServerRetry { message: String },

    /// No complete response within the configured query timeout.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// Query description cannot be encoded.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl SphinxError {
    /// Whether the connection must be dropped after this error.
    ///
    /// Server-side and decode errors leave the stream at a frame boundary;
    /// transport failures and timeouts do not.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            SphinxError::Io(_)
                | SphinxError::ConnectionClosed { .. }
                | SphinxError::Timeout(_)
                | SphinxError::TrailingBytes { .. }
                | SphinxError::Protocol(_)
        )
    }
}

/// Result type alias using SphinxError.
pub type Result<T> = std::result::Result<T, SphinxError>;
