//! SSH transport: the `netconf` subsystem on one channel per session, as
//! specified by [RFC 6242 §3](https://www.rfc-editor.org/rfc/rfc6242.html#section-3).

use crate::error::{Error, Result};
use crate::session::Session;
use crate::transport::{Client, Transport};
use async_ssh2_lite::{ssh2, AsyncChannel, AsyncSession, SessionConfiguration};
use async_trait::async_trait;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;

/// NETCONF client over one authenticated SSH connection. Each
/// [`new_session`](Client::new_session) opens a fresh channel, so several
/// sessions can share the connection.
pub struct SshClient {
    session: AsyncSession<TcpStream>,
}

impl SshClient {
    /// Wraps an already authenticated SSH session.
    pub fn new_with_session(session: AsyncSession<TcpStream>) -> Result<SshClient> {
        if session.authenticated() {
            Ok(SshClient { session })
        } else {
            Err(Error::Transport(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "ssh session is not authenticated",
            )))
        }
    }

    /// Connects to `addr` and authenticates with a username and password.
    pub async fn new_with_user_auth(
        addr: &str,
        user_name: &str,
        password: &str,
    ) -> Result<SshClient> {
        let stream = TcpStream::connect(addr).await?;
        let mut configuration = SessionConfiguration::new();
        configuration.set_timeout(10_000);
        let mut session = AsyncSession::new(stream, configuration)?;
        session.handshake().await?;

        session.userauth_password(user_name, password).await?;
        SshClient::new_with_session(session)
    }
}

#[async_trait]
impl Client for SshClient {
    async fn new_session(&mut self) -> Result<Session> {
        let mut channel = self.session.channel_session().await?;
        channel.subsystem("netconf").await?;
        Session::open(SshTransport { channel }).await
    }

    async fn close(&mut self) -> Result<()> {
        self.session
            .disconnect(Some(ssh2::ByApplication), "Shutdown", None)
            .await?;
        Ok(())
    }
}

/// One SSH channel in the `netconf` subsystem: stdin is the write half,
/// stdout the read half.
pub struct SshTransport {
    channel: AsyncChannel<TcpStream>,
}

impl AsyncRead for SshTransport {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.channel).poll_read(cx, buf)
    }
}

impl AsyncWrite for SshTransport {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.channel).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.channel).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.channel).poll_shutdown(cx)
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn close(&mut self) -> Result<()> {
        self.channel.send_eof().await?;
        self.channel.close().await?;
        self.channel.wait_close().await?;
        Ok(())
    }
}
