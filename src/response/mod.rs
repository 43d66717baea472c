//! Response module - typed search results and the body decoder.

mod decode;
mod types;

pub use decode::{
    decode_match, decode_schema, decode_search_response, DecodeOptions, KeywordStatsLayout,
    ResultStatusLayout,
};
pub use types::{
    AttrValue, AttributeDef, AttributeSchema, AttributeType, Match, SearchResponse, SearchResult,
    Warning, WordStats, ATTR_MULTI_FLAG,
};
