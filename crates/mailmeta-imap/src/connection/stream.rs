//! Stream types for IMAP connections.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tracing::{debug, info};

use super::security::ConnectionSecurity;
use super::settings::ConnectSettings;
use super::ssl::SslContext;
use crate::{Error, Result};

/// A stream that can be either plaintext or TLS.
pub enum ImapStream {
    /// Plaintext TCP stream.
    Plain(TcpStream),
    /// TLS-encrypted stream (boxed to reduce enum size).
    Tls(Box<TlsStream<TcpStream>>),
}

impl ImapStream {
    /// Upgrades a plaintext stream to TLS after STARTTLS was accepted.
    ///
    /// # Errors
    ///
    /// Fails if the stream is already TLS, the handshake fails, or it does
    /// not finish within the settings timeout.
    pub async fn upgrade_to_tls(self, settings: &ConnectSettings) -> Result<Self> {
        match self {
            Self::Plain(tcp) => {
                let host = settings.ascii_host()?;
                let tls = handshake(tcp, host, settings).await?;
                Ok(Self::Tls(Box::new(tls)))
            }
            Self::Tls(_) => Err(Error::InvalidState("Stream is already TLS".to_string())),
        }
    }

    /// Returns true if the stream is TLS-encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }
}

impl std::fmt::Debug for ImapStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.is_tls() { "ImapStream::Tls" } else { "ImapStream::Plain" })
    }
}

impl AsyncRead for ImapStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for ImapStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Self::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Self::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

/// Creates a TLS connector from the TLS options.
///
/// # Errors
///
/// See [`SslContext::client_config`].
pub fn tls_connector(ssl: &SslContext) -> Result<TlsConnector> {
    Ok(TlsConnector::from(Arc::new(ssl.client_config()?)))
}

/// Opens a connection, negotiating implicit TLS when the settings call
/// for it.
///
/// The returned security is [`ConnectionSecurity::Plain`] unless TLS is
/// already up; callers resolve STARTTLS with
/// [`ConnectionSecurity::after_greeting`] once capabilities are known.
///
/// # Errors
///
/// Returns [`Error::Timeout`] if connecting or the handshake takes longer
/// than `settings.timeout`, and I/O or TLS errors otherwise.
pub async fn connect(settings: &ConnectSettings) -> Result<(ImapStream, ConnectionSecurity)> {
    let host = settings.ascii_host()?;
    let security = settings.initial_security();
    debug!(host = %host, port = settings.port, ?security, "Connecting");

    let tcp = timeout(settings.timeout, TcpStream::connect((host.as_str(), settings.port)))
        .await
        .map_err(|_| Error::Timeout(settings.timeout))??;

    let stream = match security {
        ConnectionSecurity::ImplicitTls => {
            ImapStream::Tls(Box::new(handshake(tcp, host.clone(), settings).await?))
        }
        ConnectionSecurity::Plain | ConnectionSecurity::StartTls => ImapStream::Plain(tcp),
    };
    info!(host = %host, port = settings.port, tls = stream.is_tls(), "Connected");
    Ok((stream, security))
}

async fn handshake(
    tcp: TcpStream,
    host: String,
    settings: &ConnectSettings,
) -> Result<TlsStream<TcpStream>> {
    let connector = tls_connector(&settings.ssl)?;
    let server_name = ServerName::try_from(host)?;
    let tls = timeout(settings.timeout, connector.connect(server_name, tcp))
        .await
        .map_err(|_| Error::Timeout(settings.timeout))??;
    Ok(tls)
}
