//! Wire format encoding and decoding.
//!
//! Request header (client -> searchd):
//! ```text
//! ┌──────────┬──────────┬──────────┐
//! │ Command  │ Version  │ Length   │
//! │ 2 bytes  │ 2 bytes  │ 4 bytes  │
//! │ uint16 BE│ uint16 BE│ uint32 BE│
//! └──────────┴──────────┴──────────┘
//! ```
//!
//! Response header (searchd -> client):
//! ```text
//! ┌──────────┬──────────┬──────────┐
//! │ Status   │ Version  │ Length   │
//! │ 2 bytes  │ 2 bytes  │ 4 bytes  │
//! │ uint16 BE│ uint16 BE│ uint32 BE│
//! └──────────┴──────────┴──────────┘
//! ```
//!
//! All multi-byte integers are Big Endian.

use serde::Serialize;

use crate::error::{Result, SphinxError};

/// Header size in bytes (fixed, exactly 8).
pub const HEADER_SIZE: usize = 8;

/// Default searchd port.
pub const DEFAULT_PORT: u16 = 9312;

/// Version the client announces in the connection handshake.
pub const CLIENT_PROTOCOL_VERSION: u32 = 1;

/// Search command version this client speaks (0x116).
pub const VER_COMMAND_SEARCH: u16 = 0x116;

/// Default maximum response body size (64 MiB).
pub const DEFAULT_MAX_RESPONSE_SIZE: u32 = 64 * 1024 * 1024;

/// Command identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    /// Full-text search.
    Search,
}

impl Command {
    /// Wire value of the command.
    pub fn id(self) -> u16 {
        match self {
            Command::Search => 0,
        }
    }

    /// Command version this client implements.
    pub fn version(self) -> u16 {
        match self {
            Command::Search => VER_COMMAND_SEARCH,
        }
    }
}

/// Status codes carried by response headers and result bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Error,
    Retry,
    Warning,
}

impl Status {
    /// Wire value of the status.
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 0,
            Status::Error => 1,
            Status::Retry => 2,
            Status::Warning => 3,
        }
    }

    /// Parse a wire value, returning `None` for unknown codes.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Status::Ok),
            1 => Some(Status::Error),
            2 => Some(Status::Retry),
            3 => Some(Status::Warning),
            _ => None,
        }
    }
}

/// Header of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Command identifier.
    pub command: Command,
    /// Command version.
    pub version: u16,
    /// Body length in bytes.
    pub length: u32,
}

impl RequestHeader {
    /// Create a header for `command` at the client's version.
    pub fn new(command: Command, length: u32) -> Self {
        Self {
            command,
            version: command.version(),
            length,
        }
    }

    /// Encode header to bytes (Big Endian).
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.command.id().to_be_bytes());
        buf[2..4].copy_from_slice(&self.version.to_be_bytes());
        buf[4..8].copy_from_slice(&self.length.to_be_bytes());
        buf
    }
}

/// Header of an inbound response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Response status.
    pub status: Status,
    /// Command version the server answered with.
    pub version: u16,
    /// Body length in bytes.
    pub length: u32,
}

impl ResponseHeader {
    /// Create a new header.
    pub fn new(status: Status, version: u16, length: u32) -> Self {
        Self {
            status,
            version,
            length,
        }
    }

    /// Encode header to bytes (Big Endian).
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.status.code().to_be_bytes());
        buf[2..4].copy_from_slice(&self.version.to_be_bytes());
        buf[4..8].copy_from_slice(&self.length.to_be_bytes());
        buf
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `Ok(None)` if the buffer is too short.
    ///
    /// # Errors
    ///
    /// Returns `Protocol` for an unknown status code.
    ///
    /// # Example
    ///
    /// ```
    /// use sphinx_client::protocol::{ResponseHeader, Status};
    ///
    /// let bytes = [0, 3, 1, 0x16, 0, 0, 0, 100];
    /// let header = ResponseHeader::decode(&bytes).unwrap().unwrap();
    /// assert_eq!(header.status, Status::Warning);
    /// assert_eq!(header.version, 0x116);
    /// assert_eq!(header.length, 100);
    /// ```
    pub fn decode(buf: &[u8]) -> Result<Option<Self>> {
        if buf.len() < HEADER_SIZE {
            return Ok(None);
        }
        let code = u16::from_be_bytes([buf[0], buf[1]]);
        let status = Status::from_code(u32::from(code))
            .ok_or_else(|| SphinxError::Protocol(format!("Unknown response status {}", code)))?;
        Ok(Some(Self {
            status,
            version: u16::from_be_bytes([buf[2], buf[3]]),
            length: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
        }))
    }

    /// Validate the declared body length.
    pub fn validate(&self, max_body_size: u32) -> Result<()> {
        if self.length > max_body_size {
            return Err(SphinxError::Protocol(format!(
                "Response size {} exceeds maximum {}",
                self.length, max_body_size
            )));
        }
        Ok(())
    }

    /// Check if the server speaks an older command version than `expected`.
    #[inline]
    pub fn is_older_than(&self, expected: u16) -> bool {
        self.version < expected
    }
}
