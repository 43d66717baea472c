//! Codec module - big-endian primitives for request and response bodies.
//!
//! - [`Encoder`] - chained appends into a growable `BytesMut`
//! - [`Decoder`] - sequential, destructive reads over a `Bytes` cursor
//!
//! Every integer on the wire is big-endian. A length-prefixed string
//! ("lstring") is a 32-bit byte count followed by exactly that many raw
//! bytes; no character encoding is applied.
//!
//! # Example
//!
//! ```
//! use sphinx_client::codec::{Decoder, Encoder};
//!
//! let mut encoder = Encoder::new();
//! encoder.append_i32(20).append_lstring(b"hello").unwrap();
//!
//! let mut decoder = Decoder::new(encoder.finish());
//! assert_eq!(decoder.read_i32().unwrap(), 20);
//! assert_eq!(&decoder.read_lstring().unwrap()[..], b"hello");
//! assert!(decoder.read_i32().is_err());
//! ```

mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::Encoder;
