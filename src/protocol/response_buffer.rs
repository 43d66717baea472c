//! Response buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for one in-flight response:
//! - `AwaitingHeader`: Need at least 8 bytes
//! - `AwaitingBody`: Header parsed, need `length` body bytes
//! - `Complete`: Frame handed out, further data is a protocol violation
//!
//! # Example
//!
//! ```
//! use sphinx_client::protocol::{build_response, ResponseBuffer, ResponseHeader, Status};
//!
//! let wire = build_response(&ResponseHeader::new(Status::Ok, 0x116, 3), b"abc");
//! let mut buffer = ResponseBuffer::new();
//!
//! assert!(buffer.push(&wire[..5]).unwrap().is_none());
//! let frame = buffer.push(&wire[5..]).unwrap().unwrap();
//! assert_eq!(&frame.body[..], b"abc");
//! ```

use bytes::{Buf, BytesMut};

use super::wire_format::{ResponseHeader, DEFAULT_MAX_RESPONSE_SIZE, HEADER_SIZE};
use super::ResponseFrame;
use crate::error::{Result, SphinxError};

/// State machine for response assembly.
#[derive(Debug, Clone)]
enum State {
    /// Waiting for the complete 8-byte header.
    AwaitingHeader,
    /// Header parsed, waiting for body bytes.
    AwaitingBody { header: ResponseHeader },
    /// Frame delivered.
    Complete { declared: usize },
}

/// Buffer for accumulating incoming bytes of a single response.
pub struct ResponseBuffer {
    /// Accumulated bytes (header bytes until parsed, then body bytes).
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Maximum allowed body size.
    max_body_size: u32,
    /// Total bytes pushed since the last reset.
    received: usize,
}

impl ResponseBuffer {
    /// Create a new response buffer with default settings.
    ///
    /// Default capacity: 64KB, max body: 64MB.
    pub fn new() -> Self {
        Self::with_max_body(DEFAULT_MAX_RESPONSE_SIZE)
    }

    /// Create a new response buffer with custom max body size.
    pub fn with_max_body(max_body_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            state: State::AwaitingHeader,
            max_body_size,
            received: 0,
        }
    }

    /// Push an inbound chunk and return the frame once it is complete.
    ///
    /// Chunks may split the header or body anywhere. The frame is returned
    /// exactly once, on the first push that brings the body up to its
    /// declared length.
    ///
    /// # Errors
    ///
    /// - `Protocol` for an unknown status or an oversized body
    /// - `TrailingBytes` if data extends past the declared body length
    pub fn push(&mut self, data: &[u8]) -> Result<Option<ResponseFrame>> {
        if let State::Complete { declared } = self.state {
            if data.is_empty() {
                return Ok(None);
            }
            return Err(SphinxError::TrailingBytes {
                declared,
                extra: data.len(),
            });
        }

        self.buffer.extend_from_slice(data);
        self.received += data.len();

        loop {
            match &self.state {
                State::AwaitingHeader => {
                    let Some(header) = ResponseHeader::decode(&self.buffer)? else {
                        return Ok(None);
                    };
                    header.validate(self.max_body_size)?;

                    self.buffer.advance(HEADER_SIZE);
                    tracing::trace!(
                        status = ?header.status,
                        version = header.version,
                        length = header.length,
                        "Response header parsed"
                    );
                    self.state = State::AwaitingBody { header };
                }

                State::AwaitingBody { header } => {
                    let declared = header.length as usize;
                    if self.buffer.len() < declared {
                        return Ok(None);
                    }
                    if self.buffer.len() > declared {
                        return Err(SphinxError::TrailingBytes {
                            declared,
                            extra: self.buffer.len() - declared,
                        });
                    }

                    let header = *header;
                    let body = self.buffer.split().freeze();
                    self.state = State::Complete { declared };
                    return Ok(Some(ResponseFrame::new(header, body)));
                }

                State::Complete { .. } => return Ok(None),
            }
        }
    }

    /// Total bytes pushed since the last reset (header included).
    pub fn received(&self) -> usize {
        self.received
    }

    /// Check if the frame has been delivered.
    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::Complete { .. })
    }

    /// Human-readable name of the current state.
    pub fn state_name(&self) -> &'static str {
        match &self.state {
            State::AwaitingHeader => "awaiting header",
            State::AwaitingBody { .. } => "awaiting body",
            State::Complete { .. } => "complete",
        }
    }

    /// Clear the buffer and return to `AwaitingHeader`.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = State::AwaitingHeader;
        self.received = 0;
    }
}

impl Default for ResponseBuffer {
    fn default() -> Self {
        Self::new()
    }
}
