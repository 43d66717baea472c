//! Protocol module - wire format, framing, and response assembly.
//!
//! This module implements the searchd binary framing:
//! - 8-byte request and response headers
//! - Request/response frame types
//! - Response buffer for accumulating partial reads

mod frame;
mod response_buffer;
mod wire_format;

pub use frame::{build_response, RequestFrame, ResponseFrame};
pub use response_buffer::ResponseBuffer;
pub use wire_format::{
    Command, RequestHeader, ResponseHeader, Status, CLIENT_PROTOCOL_VERSION,
    DEFAULT_MAX_RESPONSE_SIZE, DEFAULT_PORT, HEADER_SIZE, VER_COMMAND_SEARCH,
};
