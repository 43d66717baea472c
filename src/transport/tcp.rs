//! TCP transport to searchd.
//!
//! # Example
//!
//! ```ignore
//! use sphinx_client::transport::{connect_tcp, handshake};
//!
//! let mut stream = connect_tcp("127.0.0.1:9312").await?;
//! let server_version = handshake(&mut stream).await?;
//! ```

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{Result, SphinxError};
use crate::protocol::CLIENT_PROTOCOL_VERSION;

/// Open a TCP connection with Nagle's algorithm disabled.
pub async fn connect_tcp(addr: &str) -> Result<TcpStream> {
    let stream = TcpStream::connect(addr).await?;
    stream.set_nodelay(true)?;
    tracing::debug!(addr, "Connected to searchd");
    Ok(stream)
}

/// Exchange protocol versions with searchd.
///
/// Writes the client version (a big-endian `1`) and reads the server's
/// 32-bit version. Returns the server version.
///
/// # Errors
///
/// - `HandshakeVersion` if the server version is below 1
/// - `ConnectionClosed` if the server hangs up mid-handshake
pub async fn handshake<S>(stream: &mut S) -> Result<u32>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(&CLIENT_PROTOCOL_VERSION.to_be_bytes())
        .await?;
    stream.flush().await?;

    let mut buf = [0u8; 4];
    match stream.read_exact(&mut buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            return Err(SphinxError::ConnectionClosed {
                state: "handshaking",
                received: 0,
            })
        }
        Err(e) => return Err(e.into()),
    }

    let version = i32::from_be_bytes(buf);
    if version < 1 {
        return Err(SphinxError::HandshakeVersion { version });
    }
    tracing::debug!(server_version = version, "Handshake complete");
    Ok(version as u32)
}
