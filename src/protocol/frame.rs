//! Request and response frames.
//!
//! Both frame types own their body as `bytes::Bytes`, so handing a body to
//! the decoder or the socket never copies it.

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{Command, RequestHeader, ResponseHeader, HEADER_SIZE};
use crate::error::{Result, SphinxError};

/// A complete outbound message.
///
/// The header's length field always matches the body; the only way to
/// build one is [`RequestFrame::new`].
#[derive(Debug, Clone)]
pub struct RequestFrame {
    header: RequestHeader,
    body: Bytes,
}

impl RequestFrame {
    /// Frame `body` for `command`, filling in the body length.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuery` if the body does not fit a 32-bit length.
    pub fn new(command: Command, body: Bytes) -> Result<Self> {
        let length = u32::try_from(body.len()).map_err(|_| {
            SphinxError::InvalidQuery(format!("request body of {} bytes is too large", body.len()))
        })?;
        Ok(Self {
            header: RequestHeader::new(command, length),
            body,
        })
    }

    /// The frame header.
    #[inline]
    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    /// The body bytes.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Header and body as one contiguous buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.body.len());
        buf.put_slice(&self.header.encode());
        buf.put_slice(&self.body);
        buf.freeze()
    }
}

/// A complete inbound message produced by the response assembler.
#[derive(Debug, Clone)]
pub struct ResponseFrame {
    /// Decoded header.
    pub header: ResponseHeader,
    /// Body bytes.
    pub body: Bytes,
}

impl ResponseFrame {
    /// Create a new frame from header and body.
    pub fn new(header: ResponseHeader, body: Bytes) -> Self {
        Self { header, body }
    }

    /// Check that the declared length matches the body.
    pub fn check_length(&self) -> Result<()> {
        let declared = self.header.length as usize;
        if declared != self.body.len() {
            return Err(SphinxError::LengthMismatch {
                declared,
                received: self.body.len(),
            });
        }
        Ok(())
    }
}

/// Build a complete response as a single byte vector.
///
/// Used by tests and mock servers to produce wire-exact responses.
pub fn build_response(header: &ResponseHeader, body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(body);
    buf
}
