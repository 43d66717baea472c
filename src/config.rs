//! Client configuration.
//!
//! ```
//! use sphinx_client::ClientConfig;
//!
//! let json = r#"{"host": "search.local", "query_timeout_ms": 2500}"#;
//! let config = ClientConfig::from_json(json).unwrap();
//! assert_eq!(config.addr(), "search.local:9312");
//! assert_eq!(config.query_timeout.unwrap().as_millis(), 2500);
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::Result;
use crate::protocol::{DEFAULT_MAX_RESPONSE_SIZE, DEFAULT_PORT};
use crate::response::{DecodeOptions, KeywordStatsLayout, ResultStatusLayout};

/// Default searchd host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Connection and decoding settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// searchd host name or address.
    pub host: String,
    /// searchd port.
    pub port: u16,
    /// Limit on establishing the TCP connection plus handshake.
    #[serde(rename = "connect_timeout_ms", deserialize_with = "millis")]
    pub connect_timeout: Option<Duration>,
    /// Limit on one query round trip. `None` waits indefinitely.
    #[serde(rename = "query_timeout_ms", deserialize_with = "millis")]
    pub query_timeout: Option<Duration>,
    /// Largest response body accepted.
    pub max_response_size: u32,
    /// Whether a non-OK result status carries a message.
    pub result_status: ResultStatusLayout,
    /// Layout of keyword statistics in the result trailer.
    pub keyword_stats: KeywordStatsLayout,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: None,
            query_timeout: None,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            result_status: ResultStatusLayout::default(),
            keyword_stats: KeywordStatsLayout::default(),
        }
    }
}

impl ClientConfig {
    /// Parse a JSON configuration; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `host:port` string for connecting.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Decoder settings derived from this configuration.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            result_status: self.result_status,
            keyword_stats: self.keyword_stats,
        }
    }
}

fn millis<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}
