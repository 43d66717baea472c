//! Client builder and query round trip.
//!
//! The [`ClientBuilder`] provides a fluent API for configuring the
//! connection. The [`Client`] owns one searchd connection:
//! 1. Connect over TCP (Nagle disabled)
//! 2. Exchange protocol versions
//! 3. For each query: write the request frame, assemble the response,
//!    decode it
//!
//! One query is in flight at a time; [`Client::query`] takes `&mut self`.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use sphinx_client::{Client, Query};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::builder()
//!         .host("127.0.0.1")
//!         .port(9312)
//!         .query_timeout(Duration::from_secs(5))
//!         .connect()
//!         .await?;
//!
//!     let response = client.query(&Query::new("hello world").limit(10)).await?;
//!     for m in &response.result.matches {
//!         println!("{} {}", m.doc, m.weight);
//!     }
//!
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```

use std::future::poll_fn;
use std::pin::Pin;
use std::task::Poll;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;

use crate::config::ClientConfig;
use crate::error::{Result, SphinxError};
use crate::protocol::{RequestFrame, ResponseBuffer, ResponseFrame};
use crate::query::Query;
use crate::request::build_search_request;
use crate::response::{
    decode_search_response, KeywordStatsLayout, ResultStatusLayout, SearchResponse,
};
use crate::transport::{connect_tcp, handshake};

/// Size of the socket read buffer.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Size of the read used to look for stray bytes between queries.
const IDLE_CHECK_SIZE: usize = 512;

/// Builder for configuring and connecting a searchd client.
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Replace every setting with `config`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the searchd host.
    ///
    /// Default: 127.0.0.1
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the searchd port.
    ///
    /// Default: 9312
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Limit connection setup (TCP connect plus handshake).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Limit each query round trip.
    ///
    /// A query that times out drops the connection.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.config.query_timeout = Some(timeout);
        self
    }

    /// Set the largest accepted response body.
    ///
    /// Default: 64 MiB
    pub fn max_response_size(mut self, bytes: u32) -> Self {
        self.config.max_response_size = bytes;
        self
    }

    /// Set whether a non-OK result status carries a message.
    pub fn result_status(mut self, layout: ResultStatusLayout) -> Self {
        self.config.result_status = layout;
        self
    }

    /// Set the keyword statistics layout the server uses.
    pub fn keyword_stats(mut self, layout: KeywordStatsLayout) -> Self {
        self.config.keyword_stats = layout;
        self
    }

    /// Connect over TCP and perform the handshake.
    pub async fn connect(self) -> Result<Client> {
        Client::connect(self.config).await
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A connection to searchd.
pub struct Client<S = TcpStream> {
    /// Open stream, `None` once disconnected or dropped after a fatal error.
    stream: Option<S>,
    /// Response assembly state, kept across queries on this connection.
    buffer: ResponseBuffer,
    config: ClientConfig,
    server_version: u32,
}

impl Client<TcpStream> {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Connect to `config.addr()` and perform the handshake.
    ///
    /// `config.connect_timeout` bounds the TCP connect and the handshake
    /// together.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let addr = config.addr();
        let connect_timeout = config.connect_timeout;
        let setup = async move {
            let stream = connect_tcp(&addr).await?;
            Client::with_stream(stream, config).await
        };

        match connect_timeout {
            Some(limit) => tokio::time::timeout(limit, setup)
                .await
                .map_err(|_| SphinxError::Timeout(limit))?,
            None => setup.await,
        }
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Perform the handshake over an already connected stream.
    pub async fn with_stream(mut stream: S, config: ClientConfig) -> Result<Self> {
        let server_version = handshake(&mut stream).await?;
        Ok(Self {
            stream: Some(stream),
            buffer: ResponseBuffer::with_max_body(config.max_response_size),
            config,
            server_version,
        })
    }

    /// Run one search and decode the result.
    ///
    /// # Errors
    ///
    /// - `NotConnected` if the connection was closed or dropped
    /// - `Timeout` if the configured query timeout expired
    /// - `ConnectionClosed` if searchd hung up mid-response
    /// - `ServerError` / `ServerRetry` / `MalformedResponse` from decoding
    ///
    /// Transport failures and timeouts drop the connection; server and
    /// decode errors leave it open.
    pub async fn query(&mut self, query: &Query) -> Result<SearchResponse> {
        let stream = self.stream.as_mut().ok_or(SphinxError::NotConnected)?;
        let request = build_search_request(query)?;
        let exchange = round_trip(stream, &mut self.buffer, &request);

        let outcome = match self.config.query_timeout {
            Some(limit) => match tokio::time::timeout(limit, exchange).await {
                Ok(outcome) => outcome,
                Err(_) => Err(SphinxError::Timeout(limit)),
            },
            None => exchange.await,
        };

        let frame = match outcome {
            Ok(frame) => frame,
            Err(e) => {
                if e.is_connection_fatal() {
                    tracing::warn!(error = %e, "Dropping searchd connection");
                    self.stream = None;
                }
                return Err(e);
            }
        };

        decode_search_response(&frame, &self.config.decode_options())
    }

    /// Close the connection. Further queries fail with `NotConnected`.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await?;
            tracing::debug!("Disconnected from searchd");
        }
        Ok(())
    }

    /// Check if the connection is open.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Protocol version the server announced in the handshake.
    pub fn server_version(&self) -> u32 {
        self.server_version
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Write `request` and read until one complete response frame arrived.
///
/// A buffer left `Complete` by the previous query is only reset once the
/// socket has been checked for bytes past that response.
async fn round_trip<S>(
    stream: &mut S,
    buffer: &mut ResponseBuffer,
    request: &RequestFrame,
) -> Result<ResponseFrame>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if buffer.is_complete() {
        check_idle(stream, buffer).await?;
    }
    buffer.reset();

    let bytes = request.to_bytes();
    stream.write_all(&bytes).await?;
    stream.flush().await?;
    tracing::debug!(bytes = bytes.len(), "Search request sent");

    let mut chunk = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(SphinxError::ConnectionClosed {
                state: buffer.state_name(),
                received: buffer.received(),
            });
        }

        tracing::trace!(bytes = n, state = buffer.state_name(), "Response chunk");
        if let Some(frame) = buffer.push(&chunk[..n])? {
            return Ok(frame);
        }
    }
}

/// Poll the idle socket once without waiting.
///
/// Data after a completed response surfaces as `TrailingBytes` from the
/// buffer; a hang-up surfaces as `ConnectionClosed`.
async fn check_idle<S>(stream: &mut S, buffer: &mut ResponseBuffer) -> Result<()>
where
    S: AsyncRead + Unpin,
{
    let mut chunk = [0u8; IDLE_CHECK_SIZE];
    let mut read_buf = ReadBuf::new(&mut chunk);
    let ready = poll_fn(|cx| match Pin::new(&mut *stream).poll_read(cx, &mut read_buf) {
        Poll::Ready(outcome) => Poll::Ready(Some(outcome)),
        Poll::Pending => Poll::Ready(None),
    })
    .await;

    match ready {
        None => Ok(()),
        Some(outcome) => {
            outcome?;
            let stray = read_buf.filled();
            if stray.is_empty() {
                return Err(SphinxError::ConnectionClosed {
                    state: buffer.state_name(),
                    received: buffer.received(),
                });
            }
            buffer.push(stray)?;
            Ok(())
        }
    }
}
