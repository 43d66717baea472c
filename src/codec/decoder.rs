//! Body decoder.

use bytes::{Buf, Bytes};

use crate::error::UnderflowError;

/// Sequential reader over a fixed byte sequence.
///
/// Reads never look ahead or backtrack. A read that would run past the end
/// fails with [`UnderflowError`] and leaves the cursor untouched.
#[derive(Debug, Clone)]
pub struct Decoder {
    buf: Bytes,
}

impl Decoder {
    /// Wrap a byte sequence.
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    #[inline]
    fn ensure(&self, needed: usize) -> Result<(), UnderflowError> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(UnderflowError { needed, remaining });
        }
        Ok(())
    }

    /// Read a signed 16-bit integer.
    pub fn read_i16(&mut self) -> Result<i16, UnderflowError> {
        self.ensure(2)?;
        Ok(self.buf.get_i16())
    }

    /// Read an unsigned 16-bit integer.
    pub fn read_u16(&mut self) -> Result<u16, UnderflowError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    /// Read a signed 32-bit integer.
    pub fn read_i32(&mut self) -> Result<i32, UnderflowError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    /// Read an unsigned 32-bit integer.
    pub fn read_u32(&mut self) -> Result<u32, UnderflowError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    /// Read a 64-bit value sent as two 32-bit words, high word first.
    pub fn read_u64(&mut self) -> Result<u64, UnderflowError> {
        self.ensure(8)?;
        let hi = u64::from(self.buf.get_u32());
        let lo = u64::from(self.buf.get_u32());
        Ok((hi << 32) | lo)
    }

    /// Read a length-prefixed string as raw bytes.
    pub fn read_lstring(&mut self) -> Result<Bytes, UnderflowError> {
        self.ensure(4)?;
        let len = u32::from_be_bytes([self.buf[0], self.buf[1], self.buf[2], self.buf[3]]) as usize;
        self.ensure(4 + len)?;
        self.buf.advance(4);
        Ok(self.buf.split_to(len))
    }

    /// Read a length-prefixed string, replacing invalid UTF-8.
    pub fn read_string(&mut self) -> Result<String, UnderflowError> {
        let raw = self.read_lstring()?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Consume the decoder, returning whatever was not read.
    pub fn into_remaining(self) -> Bytes {
        self.buf
    }
}
