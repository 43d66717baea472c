//! Body encoder.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::LengthOverflowError;

/// Accumulates big-endian values into a growable buffer.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a signed 32-bit integer.
    #[inline]
    pub fn append_i32(&mut self, value: i32) -> &mut Self {
        self.buf.put_i32(value);
        self
    }

    /// Append an unsigned 32-bit integer.
    #[inline]
    pub fn append_u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32(value);
        self
    }

    /// Append a 64-bit value as two 32-bit words, high word first.
    #[inline]
    pub fn append_u64(&mut self, value: u64) -> &mut Self {
        self.buf.put_u32((value >> 32) as u32);
        self.buf.put_u32(value as u32);
        self
    }

    /// Append a length-prefixed string.
    ///
    /// # Errors
    ///
    /// Returns `LengthOverflowError` if the string does not fit a 32-bit
    /// length.
    pub fn append_lstring(
        &mut self,
        value: impl AsRef<[u8]>,
    ) -> Result<&mut Self, LengthOverflowError> {
        let value = value.as_ref();
        let len = u32::try_from(value.len())
            .map_err(|_| LengthOverflowError { len: value.len() })?;
        self.buf.reserve(4 + value.len());
        self.buf.put_u32(len);
        self.buf.put_slice(value);
        Ok(self)
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Materialize the accumulated bytes.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}
