//! Search request builder.
//!
//! The search body is positional: every field is written in a fixed order
//! with no tags, so the order below is the protocol.

use crate::codec::Encoder;
use crate::error::{Result, SphinxError};
use crate::protocol::{Command, RequestFrame};
use crate::query::Query;

/// Marker telling searchd to send 64-bit document ids.
const ID64_MARKER: u32 = 1;

/// Serialize `query` into a complete SEARCH request frame.
///
/// # Errors
///
/// Returns `InvalidQuery` if the query text is empty or a string field
/// does not fit a 32-bit length.
///
/// # Example
///
/// ```
/// use sphinx_client::query::Query;
/// use sphinx_client::request::build_search_request;
///
/// let frame = build_search_request(&Query::new("hello")).unwrap();
/// assert_eq!(frame.header().length as usize, frame.body().len());
/// ```
pub fn build_search_request(query: &Query) -> Result<RequestFrame> {
    if query.query.is_empty() {
        return Err(SphinxError::InvalidQuery("query text is empty".to_string()));
    }
    let weight_count = u32::try_from(query.weights.len())
        .map_err(|_| SphinxError::InvalidQuery("too many weights".to_string()))?;

    let mut enc = Encoder::with_capacity(256 + query.query.len());

    enc.append_u32(query.offset)
        .append_u32(query.limit)
        .append_u32(query.mode.code())
        .append_u32(query.ranking.code())
        .append_u32(query.sort.code());
    enc.append_lstring(&query.sort_by)?
        .append_lstring(&query.query)?;

    enc.append_u32(weight_count);
    for weight in &query.weights {
        enc.append_i32(*weight);
    }

    enc.append_lstring(&query.index)?;

    // id range: min and max as 64-bit values, zero means unbounded
    enc.append_u32(ID64_MARKER).append_u64(0).append_u64(0);

    // filters
    enc.append_u32(0);

    enc.append_u32(query.group_mode.code())
        .append_lstring(&query.group_by)?;
    enc.append_u32(query.max_matches)
        .append_lstring(&query.group_sort)?;

    // cutoff, retry count, retry delay
    enc.append_u32(0).append_u32(0).append_u32(0);

    enc.append_lstring(&query.group_distinct)?;

    // geo anchor, per-index weights, max query time, per-field weights
    enc.append_u32(0).append_u32(0).append_u32(0).append_u32(0);

    enc.append_lstring(&query.comment)?;

    // attribute overrides
    enc.append_u32(0);

    enc.append_lstring(&query.select)?;

    let body = enc.finish();
    tracing::trace!(bytes = body.len(), "Search request encoded");
    RequestFrame::new(Command::Search, body)
}
