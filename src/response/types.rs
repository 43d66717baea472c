//! Decoded search result types.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::protocol::Status;

/// Flag marking a multi-valued attribute type.
pub const ATTR_MULTI_FLAG: u32 = 0x4000_0000;

/// Declared type of an attribute column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeType {
    Integer,
    Timestamp,
    Ordinal,
    Bool,
    Float,
    BigInt,
    /// Multi-valued 32-bit attribute.
    Multi,
    /// Multi-valued 64-bit attribute.
    MultiBigInt,
}

impl AttributeType {
    /// Parse a wire type tag, returning `None` for unknown tags.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(AttributeType::Integer),
            2 => Some(AttributeType::Timestamp),
            3 => Some(AttributeType::Ordinal),
            4 => Some(AttributeType::Bool),
            5 => Some(AttributeType::Float),
            6 => Some(AttributeType::BigInt),
            c if c == ATTR_MULTI_FLAG | 6 => Some(AttributeType::MultiBigInt),
            c if c & ATTR_MULTI_FLAG != 0 => Some(AttributeType::Multi),
            _ => None,
        }
    }

    /// Wire type tag.
    pub fn code(self) -> u32 {
        match self {
            AttributeType::Integer => 1,
            AttributeType::Timestamp => 2,
            AttributeType::Ordinal => 3,
            AttributeType::Bool => 4,
            AttributeType::Float => 5,
            AttributeType::BigInt => 6,
            AttributeType::Multi => ATTR_MULTI_FLAG | 1,
            AttributeType::MultiBigInt => ATTR_MULTI_FLAG | 6,
        }
    }
}

/// One column of the attribute schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttributeType,
}

/// Ordered attribute columns declared by a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeSchema {
    entries: Vec<AttributeDef>,
}

impl AttributeSchema {
    /// Build a schema from ordered entries.
    pub fn new(entries: Vec<AttributeDef>) -> Self {
        Self { entries }
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, AttributeDef> {
        self.entries.iter()
    }

    /// Look up a column by name.
    pub fn get(&self, name: &str) -> Option<&AttributeDef> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a AttributeSchema {
    type Item = &'a AttributeDef;
    type IntoIter = std::slice::Iter<'a, AttributeDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Decoded value of one attribute of one match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Integer, timestamp, ordinal and bool columns.
    Int(i32),
    BigInt(i64),
    Float(f32),
    Multi(Vec<i64>),
}

impl AttrValue {
    /// Integer view of scalar integer values.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(i64::from(*v)),
            AttrValue::BigInt(v) => Some(*v),
            AttrValue::Float(_) | AttrValue::Multi(_) => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

/// One scored document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// Document id.
    pub doc: u64,
    /// Relevance weight.
    pub weight: i32,
    /// Attribute values keyed by column name.
    pub attrs: BTreeMap<String, AttrValue>,
}

/// Per-keyword statistics from the result trailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordStats {
    pub word: String,
    /// Documents containing the word, when the server sends counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<u32>,
    /// Total occurrences, when the server sends counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits: Option<u32>,
}

/// A fully decoded search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Result status (OK or WARNING).
    pub status: Status,
    /// Full-text field names.
    pub fields: Vec<String>,
    /// Attribute schema used to decode `matches`.
    pub attributes: AttributeSchema,
    /// Matches in server order.
    pub matches: Vec<Match>,
    /// Matches returned in this result.
    pub total: i32,
    /// Matches found server-side.
    pub total_found: i32,
    /// Server-side query time in milliseconds.
    pub time_ms: i32,
    /// Keyword statistics.
    pub words: Vec<WordStats>,
}

/// Non-fatal condition reported alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// searchd issued WARNING with this text.
    Server { message: String },
    /// searchd speaks an older command version than the client.
    StaleVersion { server: u16, client: u16 },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::Server { message } => write!(f, "Server issued WARNING: {}", message),
            Warning::StaleVersion { server, client } => write!(
                f,
                "searchd command v.{}.{} older than client's v.{}.{}, some options might not work",
                server >> 8,
                server & 0xFF,
                client >> 8,
                client & 0xFF
            ),
        }
    }
}

/// Result of a successful query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub result: SearchResult,
    pub warnings: Vec<Warning>,
}

impl SearchResponse {
    /// Server warning text, if searchd issued one.
    pub fn server_warning(&self) -> Option<&str> {
        self.warnings.iter().find_map(|w| match w {
            Warning::Server { message } => Some(message.as_str()),
            Warning::StaleVersion { .. } => None,
        })
    }
}
