//! # sphinx-client
//!
//! Async client for the Sphinx searchd binary protocol.
//!
//! The client speaks the SEARCH command over TCP: it performs the version
//! handshake, serializes a [`Query`] into a request frame, reassembles the
//! response from arbitrarily segmented reads and decodes it into a typed
//! [`SearchResponse`].
//!
//! ## Layers
//!
//! - **codec**: big-endian integers and length-prefixed strings
//! - **protocol**: frame headers, status codes, response reassembly
//! - **request / response**: SEARCH body encoding and decoding
//! - **client**: connection lifecycle and timeouts
//!
//! ## Example
//!
//! ```ignore
//! use sphinx_client::{Client, Query, SortMode};
//!
//! #[tokio::main]
//! async fn main() -> sphinx_client::Result<()> {
//!     let mut client = Client::builder().host("127.0.0.1").connect().await?;
//!
//!     let query = Query::new("hello world")
//!         .index("articles")
//!         .sort(SortMode::AttrDesc, "published_at")
//!         .limit(10);
//!     let response = client.query(&query).await?;
//!
//!     println!("{} of {} matches", response.result.matches.len(), response.result.total_found);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod query;
pub mod request;
pub mod response;
pub mod transport;

mod client;

pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::{Result, SphinxError};
pub use query::{GroupMode, Query, RankingMode, SearchMode, SortMode};
pub use response::{
    AttrValue, AttributeType, DecodeOptions, KeywordStatsLayout, Match, ResultStatusLayout,
    SearchResponse, SearchResult, Warning, WordStats,
};
