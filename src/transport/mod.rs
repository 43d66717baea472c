//! Transport module - TCP connection setup and version handshake.

mod tcp;

pub use tcp::{connect_tcp, handshake};
