//! Search response decoder.
//!
//! Decoding is two-phase: the attribute schema is read first and returned
//! as data, then every match is decoded against that schema. A read past
//! the end of the body at any point aborts the whole decode.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::types::{
    AttrValue, AttributeDef, AttributeSchema, AttributeType, Match, SearchResponse, SearchResult,
    Warning, WordStats,
};
use crate::codec::Decoder;
use crate::error::{Result, SphinxError, UnderflowError};
use crate::protocol::{ResponseFrame, Status, VER_COMMAND_SEARCH};

/// Layout of each keyword entry in the result trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordStatsLayout {
    /// One length-prefixed word per entry.
    #[default]
    WordsOnly,
    /// Word followed by document and hit counts (int32 each).
    WithCounts,
}

/// What follows the result status word at the start of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatusLayout {
    /// The status word alone; the field list follows directly.
    #[default]
    StatusOnly,
    /// A non-OK status carries a length-prefixed message, and ERROR or
    /// RETRY end the result there.
    WithMessage,
}

/// Knobs for [`decode_search_response`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub result_status: ResultStatusLayout,
    pub keyword_stats: KeywordStatsLayout,
}

fn malformed(section: &'static str, reason: impl Into<String>) -> SphinxError {
    SphinxError::MalformedResponse {
        section,
        reason: reason.into(),
    }
}

/// Attach the body section to a codec underflow.
trait InSection<T> {
    fn in_section(self, section: &'static str) -> Result<T>;
}

impl<T> InSection<T> for std::result::Result<T, UnderflowError> {
    fn in_section(self, section: &'static str) -> Result<T> {
        self.map_err(|e| malformed(section, e.to_string()))
    }
}

fn read_count(d: &mut Decoder, section: &'static str) -> Result<usize> {
    let count = d.read_i32().in_section(section)?;
    usize::try_from(count).map_err(|_| malformed(section, format!("negative count {}", count)))
}

/// Capacity hint that a hostile count cannot inflate past the body size.
fn capacity_for(d: &Decoder, count: usize, min_item_size: usize) -> usize {
    count.min(d.remaining() / min_item_size)
}

/// Decode a complete search response.
///
/// # Errors
///
/// - `LengthMismatch` if the body does not match the declared length
/// - `ServerError` / `ServerRetry` if searchd reported a failure
/// - `MalformedResponse` if the body is truncated or inconsistent
pub fn decode_search_response(
    frame: &ResponseFrame,
    options: &DecodeOptions,
) -> Result<SearchResponse> {
    frame.check_length()?;

    let mut warnings = Vec::new();
    if frame.header.is_older_than(VER_COMMAND_SEARCH) {
        let warning = Warning::StaleVersion {
            server: frame.header.version,
            client: VER_COMMAND_SEARCH,
        };
        tracing::warn!("{}", warning);
        warnings.push(warning);
    }

    let mut d = Decoder::new(frame.body.clone());
    match frame.header.status {
        Status::Ok => {}
        Status::Warning => {
            let message = d.read_string().in_section("warning")?;
            tracing::warn!(%message, "searchd issued WARNING");
            warnings.push(Warning::Server { message });
        }
        Status::Error => {
            return Err(SphinxError::ServerError {
                message: error_message(&frame.body),
            })
        }
        Status::Retry => {
            return Err(SphinxError::ServerRetry {
                message: error_message(&frame.body),
            })
        }
    }

    let result = decode_result(&mut d, options, &mut warnings)?;
    if d.remaining() > 0 {
        tracing::debug!(unused = d.remaining(), "Unread bytes after search result");
    }

    Ok(SearchResponse { result, warnings })
}

/// Error text of an ERROR/RETRY body: a length-prefixed string, or the
/// raw body when it is not one.
fn error_message(body: &Bytes) -> String {
    let mut d = Decoder::new(body.clone());
    match d.read_string() {
        Ok(message) if d.remaining() == 0 => message,
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

fn decode_result(
    d: &mut Decoder,
    options: &DecodeOptions,
    warnings: &mut Vec<Warning>,
) -> Result<SearchResult> {
    let code = d.read_u32().in_section("status")?;
    let status = Status::from_code(code)
        .ok_or_else(|| malformed("status", format!("unknown result status {}", code)))?;
    if options.result_status == ResultStatusLayout::WithMessage {
        read_status_message(d, status, warnings)?;
    }

    let fields = decode_fields(d)?;
    let attributes = decode_schema(d)?;
    let matches = decode_matches(d, &attributes)?;

    let total = d.read_i32().in_section("trailer")?;
    let total_found = d.read_i32().in_section("trailer")?;
    let time_ms = d.read_i32().in_section("trailer")?;
    let words = decode_words(d, options.keyword_stats)?;

    tracing::debug!(
        matches = matches.len(),
        total,
        total_found,
        time_ms,
        "Search result decoded"
    );

    Ok(SearchResult {
        status,
        fields,
        attributes,
        matches,
        total,
        total_found,
        time_ms,
        words,
    })
}

/// Message that follows a non-OK result status in searchd-style results.
fn read_status_message(
    d: &mut Decoder,
    status: Status,
    warnings: &mut Vec<Warning>,
) -> Result<()> {
    match status {
        Status::Ok => {}
        Status::Warning => {
            let message = d.read_string().in_section("status")?;
            tracing::warn!(%message, "search result carries a warning");
            warnings.push(Warning::Server { message });
        }
        Status::Error => {
            let message = d.read_string().in_section("status")?;
            return Err(SphinxError::ServerError { message });
        }
        Status::Retry => {
            let message = d.read_string().in_section("status")?;
            return Err(SphinxError::ServerRetry { message });
        }
    }
    Ok(())
}

fn decode_fields(d: &mut Decoder) -> Result<Vec<String>> {
    let count = read_count(d, "fields")?;
    let mut fields = Vec::with_capacity(capacity_for(d, count, 4));
    for _ in 0..count {
        fields.push(d.read_string().in_section("fields")?);
    }
    Ok(fields)
}

/// Read the attribute schema that shapes every match in this response.
pub fn decode_schema(d: &mut Decoder) -> Result<AttributeSchema> {
    let count = read_count(d, "attributes")?;
    let mut entries = Vec::with_capacity(capacity_for(d, count, 8));
    for _ in 0..count {
        let name = d.read_string().in_section("attributes")?;
        let code = d.read_u32().in_section("attributes")?;
        let kind = AttributeType::from_code(code).ok_or_else(|| {
            malformed(
                "attributes",
                format!("unknown type {:#x} for attribute '{}'", code, name),
            )
        })?;
        entries.push(AttributeDef { name, kind });
    }
    Ok(AttributeSchema::new(entries))
}

fn decode_matches(d: &mut Decoder, schema: &AttributeSchema) -> Result<Vec<Match>> {
    let count = read_count(d, "matches")?;
    let id64 = d.read_u32().in_section("matches")? != 0;

    let id_size = if id64 { 8 } else { 4 };
    let min_size = id_size + 4 + 4 * schema.len();
    let mut matches = Vec::with_capacity(capacity_for(d, count, min_size));
    for _ in 0..count {
        matches.push(decode_match(d, schema, id64)?);
    }
    Ok(matches)
}

/// Decode one match against `schema`.
pub fn decode_match(d: &mut Decoder, schema: &AttributeSchema, id64: bool) -> Result<Match> {
    let doc = if id64 {
        d.read_u64()
    } else {
        d.read_u32().map(u64::from)
    };
    let doc = doc.in_section("matches")?;
    let weight = d.read_i32().in_section("matches")?;

    let mut attrs = BTreeMap::new();
    for def in schema {
        attrs.insert(def.name.clone(), decode_value(d, def)?);
    }

    Ok(Match { doc, weight, attrs })
}

fn decode_value(d: &mut Decoder, def: &AttributeDef) -> Result<AttrValue> {
    const SECTION: &str = "match attributes";

    let value = match def.kind {
        AttributeType::Integer
        | AttributeType::Timestamp
        | AttributeType::Ordinal
        | AttributeType::Bool => AttrValue::Int(d.read_i32().in_section(SECTION)?),
        AttributeType::Float => AttrValue::Float(f32::from_bits(d.read_u32().in_section(SECTION)?)),
        AttributeType::BigInt => AttrValue::BigInt(d.read_u64().in_section(SECTION)? as i64),
        AttributeType::Multi => {
            let count = read_count(d, SECTION)?;
            let mut values = Vec::with_capacity(capacity_for(d, count, 4));
            for _ in 0..count {
                values.push(i64::from(d.read_i32().in_section(SECTION)?));
            }
            AttrValue::Multi(values)
        }
        AttributeType::MultiBigInt => {
            let words = read_count(d, SECTION)?;
            if words % 2 != 0 {
                return Err(malformed(
                    SECTION,
                    format!("odd word count {} for 64-bit attribute '{}'", words, def.name),
                ));
            }
            let mut values = Vec::with_capacity(capacity_for(d, words / 2, 8));
            for _ in 0..words / 2 {
                values.push(d.read_u64().in_section(SECTION)? as i64);
            }
            AttrValue::Multi(values)
        }
    };
    Ok(value)
}

fn decode_words(d: &mut Decoder, layout: KeywordStatsLayout) -> Result<Vec<WordStats>> {
    let count = read_count(d, "keywords")?;
    let mut words = Vec::with_capacity(capacity_for(d, count, 4));
    for _ in 0..count {
        let word = d.read_string().in_section("keywords")?;
        let (docs, hits) = match layout {
            KeywordStatsLayout::WordsOnly => (None, None),
            KeywordStatsLayout::WithCounts => (
                Some(d.read_u32().in_section("keywords")?),
                Some(d.read_u32().in_section("keywords")?),
            ),
        };
        words.push(WordStats { word, docs, hits });
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encoder;
    use crate::protocol::ResponseHeader;

    fn frame(status: Status, body: Bytes) -> ResponseFrame {
        let header = ResponseHeader::new(status, VER_COMMAND_SEARCH, body.len() as u32);
        ResponseFrame::new(header, body)
    }

    fn decode(status: Status, body: Bytes) -> Result<SearchResponse> {
        decode_search_response(&frame(status, body), &DecodeOptions::default())
    }

    /// Trailer with no keywords.
    fn trailer(enc: &mut Encoder, total: i32, found: i32, msecs: i32) {
        enc.append_i32(total)
            .append_i32(found)
            .append_i32(msecs)
            .append_i32(0);
    }

    /// Body with one FLOAT attribute and one 32-bit-id match.
    fn price_body(raw_price: u32) -> Bytes {
        let mut enc = Encoder::new();
        enc.append_u32(0); // status OK
        enc.append_i32(0); // fields
        enc.append_i32(1).append_lstring("price").unwrap().append_u32(5);
        enc.append_i32(1).append_u32(0); // one match, 32-bit ids
        enc.append_u32(42).append_i32(7).append_u32(raw_price);
        trailer(&mut enc, 1, 1, 3);
        enc.finish()
    }

    #[test]
    fn test_float_attribute_example() {
        let raw = 19.5f32.to_bits();
        let response = decode(Status::Ok, price_body(raw)).unwrap();
        let result = &response.result;

        assert!(response.warnings.is_empty());
        assert_eq!(result.status, Status::Ok);
        assert!(result.fields.is_empty());
        assert_eq!(result.attributes.len(), 1);
        assert_eq!(result.matches.len(), 1);

        let m = &result.matches[0];
        assert_eq!(m.doc, 42);
        assert_eq!(m.weight, 7);
        assert_eq!(m.attrs["price"], AttrValue::Float(f32::from_bits(raw)));
        assert_eq!(m.attrs["price"].as_f32(), Some(19.5));
        assert_eq!((result.total, result.total_found, result.time_ms), (1, 1, 3));
    }

    #[test]
    fn test_full_schema_and_64bit_ids() {
        let mut enc = Encoder::new();
        enc.append_u32(0);
        enc.append_i32(2)
            .append_lstring("title")
            .unwrap()
            .append_lstring("body")
            .unwrap();
        enc.append_i32(5);
        for (name, code) in [
            ("group_id", 1u32),
            ("added", 2),
            ("big", 6),
            ("tags", 0x4000_0001),
            ("wide", 0x4000_0006),
        ] {
            enc.append_lstring(name).unwrap().append_u32(code);
        }
        enc.append_i32(1).append_u32(1);
        enc.append_u64(0x0000_0002_0000_0001).append_i32(1500);
        enc.append_i32(12);
        enc.append_i32(1_700_000_000);
        enc.append_u64(0x0000_0001_0000_0005);
        enc.append_i32(3).append_i32(4).append_i32(5).append_i32(-6);
        enc.append_i32(2).append_u64(1 << 40);
        enc.append_i32(1).append_i32(9).append_i32(2);
        enc.append_i32(1).append_lstring("hello").unwrap();

        let result = decode(Status::Ok, enc.finish()).unwrap().result;

        assert_eq!(result.fields, vec!["title", "body"]);
        let kinds: Vec<_> = result.attributes.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AttributeType::Integer,
                AttributeType::Timestamp,
                AttributeType::BigInt,
                AttributeType::Multi,
                AttributeType::MultiBigInt,
            ]
        );

        let m = &result.matches[0];
        assert_eq!(m.doc, 0x0000_0002_0000_0001);
        assert_eq!(m.weight, 1500);
        assert_eq!(m.attrs["group_id"], AttrValue::Int(12));
        assert_eq!(m.attrs["added"], AttrValue::Int(1_700_000_000));
        assert_eq!(m.attrs["big"], AttrValue::BigInt(0x0000_0001_0000_0005));
        assert_eq!(m.attrs["tags"], AttrValue::Multi(vec![4, 5, -6]));
        assert_eq!(m.attrs["wide"], AttrValue::Multi(vec![1 << 40]));

        assert_eq!(result.total, 1);
        assert_eq!(result.total_found, 9);
        assert_eq!(result.time_ms, 2);
        assert_eq!(result.words.len(), 1);
        assert_eq!(result.words[0].word, "hello");
        assert_eq!(result.words[0].docs, None);
    }

    #[test]
    fn test_keywords_with_counts() {
        let mut enc = Encoder::new();
        enc.append_u32(0).append_i32(0).append_i32(0);
        enc.append_i32(0).append_u32(0);
        enc.append_i32(0).append_i32(0).append_i32(0);
        enc.append_i32(2);
        enc.append_lstring("alpha").unwrap().append_u32(10).append_u32(25);
        enc.append_lstring("beta").unwrap().append_u32(1).append_u32(1);

        let options = DecodeOptions {
            keyword_stats: KeywordStatsLayout::WithCounts,
            ..DecodeOptions::default()
        };
        let response = decode_search_response(&frame(Status::Ok, enc.finish()), &options).unwrap();
        let words = response.result.words;

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "alpha");
        assert_eq!((words[0].docs, words[0].hits), (Some(10), Some(25)));
        assert_eq!(words[1].word, "beta");
    }

    #[test]
    fn test_keywords_read_declared_count() {
        let mut enc = Encoder::new();
        enc.append_u32(0).append_i32(0).append_i32(0);
        enc.append_i32(0).append_u32(0);
        enc.append_i32(0).append_i32(0).append_i32(0);
        enc.append_i32(3);
        for word in ["a", "b", "c"] {
            enc.append_lstring(word).unwrap();
        }

        let words = decode(Status::Ok, enc.finish()).unwrap().result.words;
        let words: Vec<_> = words.into_iter().map(|w| w.word).collect();
        assert_eq!(words, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_warning_header_surfaces_text() {
        let mut enc = Encoder::new();
        enc.append_lstring("index 'x' is stale").unwrap();
        let mut body = enc.finish().to_vec();
        body.extend_from_slice(&price_body(0));

        let response = decode(Status::Warning, Bytes::from(body)).unwrap();
        assert_eq!(response.server_warning(), Some("index 'x' is stale"));
        assert_eq!(response.result.matches.len(), 1);
    }

    #[test]
    fn test_error_header_never_returns_result() {
        let mut enc = Encoder::new();
        enc.append_lstring("unknown index 'nope'").unwrap();

        let err = decode(Status::Error, enc.finish()).unwrap_err();
        match err {
            SphinxError::ServerError { message } => assert_eq!(message, "unknown index 'nope'"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_header_with_raw_text() {
        let err = decode(Status::Error, Bytes::from_static(b"plain")).unwrap_err();
        assert!(matches!(err, SphinxError::ServerError { message } if message == "plain"));
    }

    #[test]
    fn test_retry_header() {
        let mut enc = Encoder::new();
        enc.append_lstring("busy").unwrap();
        let err = decode(Status::Retry, enc.finish()).unwrap_err();
        assert!(matches!(err, SphinxError::ServerRetry { message } if message == "busy"));
    }

    fn decode_with_messages(body: Bytes) -> Result<SearchResponse> {
        let options = DecodeOptions {
            result_status: ResultStatusLayout::WithMessage,
            ..DecodeOptions::default()
        };
        decode_search_response(&frame(Status::Ok, body), &options)
    }

    #[test]
    fn test_result_status_without_message() {
        let mut enc = Encoder::new();
        enc.append_u32(3); // WARNING, no message follows
        enc.append_i32(0).append_i32(0);
        enc.append_i32(0).append_u32(0);
        trailer(&mut enc, 0, 5, 1);

        let response = decode(Status::Ok, enc.finish()).unwrap();
        let result = &response.result;

        assert_eq!(result.status, Status::Warning);
        assert!(response.warnings.is_empty());
        assert!(result.fields.is_empty());
        assert!(result.matches.is_empty());
        assert_eq!((result.total, result.total_found, result.time_ms), (0, 5, 1));
        assert!(result.words.is_empty());
    }

    #[test]
    fn test_result_error_status_without_message() {
        let mut body = price_body(0).to_vec();
        body[3] = 1;

        let result = decode(Status::Ok, Bytes::from(body)).unwrap().result;
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.matches[0].doc, 42);
    }

    #[test]
    fn test_result_level_error() {
        let mut enc = Encoder::new();
        enc.append_u32(1).append_lstring("query parse error").unwrap();
        let err = decode_with_messages(enc.finish()).unwrap_err();
        assert!(matches!(
            err,
            SphinxError::ServerError { message } if message == "query parse error"
        ));
    }

    #[test]
    fn test_result_level_warning() {
        let base = price_body(0);
        let mut enc = Encoder::new();
        enc.append_u32(3).append_lstring("too many matches").unwrap();
        let mut body = enc.finish().to_vec();
        body.extend_from_slice(&base[4..]);

        let response = decode_with_messages(Bytes::from(body)).unwrap();
        assert_eq!(response.result.status, Status::Warning);
        assert_eq!(response.server_warning(), Some("too many matches"));
        assert_eq!(response.result.matches[0].doc, 42);
    }

    #[test]
    fn test_truncated_body_is_malformed() {
        let full = price_body(1);
        for cut in [0, 3, 10, 20, full.len() - 1] {
            let err = decode(Status::Ok, full.slice(..cut)).unwrap_err();
            assert!(
                matches!(err, SphinxError::MalformedResponse { .. }),
                "cut at {cut}: {err}"
            );
        }
    }

    #[test]
    fn test_length_mismatch() {
        let header = ResponseHeader::new(Status::Ok, VER_COMMAND_SEARCH, 100);
        let frame = ResponseFrame::new(header, price_body(0));
        let err = decode_search_response(&frame, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, SphinxError::LengthMismatch { declared: 100, .. }));
    }

    #[test]
    fn test_stale_version_is_warning() {
        let body = price_body(0);
        let header = ResponseHeader::new(Status::Ok, 0x113, body.len() as u32);
        let response =
            decode_search_response(&ResponseFrame::new(header, body), &DecodeOptions::default())
                .unwrap();

        assert_eq!(
            response.warnings,
            vec![Warning::StaleVersion {
                server: 0x113,
                client: VER_COMMAND_SEARCH
            }]
        );
        assert_eq!(response.server_warning(), None);
    }

    #[test]
    fn test_unknown_attribute_type() {
        let mut enc = Encoder::new();
        enc.append_u32(0).append_i32(0);
        enc.append_i32(1).append_lstring("blob").unwrap().append_u32(99);
        let err = decode(Status::Ok, enc.finish()).unwrap_err();
        assert!(err.to_string().contains("unknown type 0x63"));
    }

    #[test]
    fn test_negative_count() {
        let mut enc = Encoder::new();
        enc.append_u32(0).append_i32(-1);
        let err = decode(Status::Ok, enc.finish()).unwrap_err();
        assert!(matches!(
            err,
            SphinxError::MalformedResponse {
                section: "fields",
                ..
            }
        ));
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        let mut enc = Encoder::new();
        enc.append_u32(0).append_i32(i32::MAX);
        let err = decode(Status::Ok, enc.finish()).unwrap_err();
        assert!(matches!(err, SphinxError::MalformedResponse { .. }));
    }

    #[test]
    fn test_odd_mva64_word_count() {
        let schema = AttributeSchema::new(vec![AttributeDef {
            name: "wide".into(),
            kind: AttributeType::MultiBigInt,
        }]);
        let mut enc = Encoder::new();
        enc.append_u32(1).append_i32(0).append_i32(3);
        let mut d = Decoder::new(enc.finish());
        let err = decode_match(&mut d, &schema, false).unwrap_err();
        assert!(err.to_string().contains("odd word count 3"));
    }

    #[test]
    fn test_schema_is_explicit_parameter() {
        let mut enc = Encoder::new();
        enc.append_i32(2);
        enc.append_lstring("a").unwrap().append_u32(6);
        enc.append_lstring("b").unwrap().append_u32(5);
        let schema = decode_schema(&mut Decoder::new(enc.finish())).unwrap();

        let mut enc = Encoder::new();
        enc.append_u32(9).append_i32(1);
        enc.append_u64(7).append_u32(2.0f32.to_bits());
        let m = decode_match(&mut Decoder::new(enc.finish()), &schema, false).unwrap();

        assert_eq!(m.attrs["a"], AttrValue::BigInt(7));
        assert_eq!(m.attrs["b"], AttrValue::Float(2.0));
    }
}
