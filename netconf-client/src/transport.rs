use crate::error::Result;
use crate::session::Session;
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

#[cfg(feature = "async-ssh2-lite")]
pub mod ssh;

/// Full-duplex byte stream carrying exactly one NETCONF session.
///
/// The session owns the stream for its whole lifetime; `close` shuts it
/// down gracefully and unblocks pending reads and writes with an error.
#[async_trait]
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {
    async fn close(&mut self) -> Result<()>;
}

/// Manufactures sessions over a possibly multiplexed connection, e.g. one
/// SSH connection carrying one channel per session. Sessions obtained from
/// the same client are independent of each other.
#[async_trait]
pub trait Client {
    async fn new_session(&mut self) -> Result<Session>;
    async fn close(&mut self) -> Result<()>;
}
