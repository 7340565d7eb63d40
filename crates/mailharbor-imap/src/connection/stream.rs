//! Transport stream: a byte-duplex channel, plaintext or TLS.
//!
//! TLS establishment and certificate policy belong to rustls; the engine
//! only consumes the resulting ordered byte stream.

#![allow(clippy::missing_errors_doc)]

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

use super::config::Config;
use crate::{Error, Result};

/// A stream that is either plaintext or TLS.
pub enum ImapStream {
    /// Plaintext TCP stream.
    Plain(TcpStream),
    /// TLS stream (boxed to keep the enum small).
    Tls(Box<TlsStream<TcpStream>>),
}

impl ImapStream {
    /// Wraps a plaintext stream.
    pub const fn plain(stream: TcpStream) -> Self {
        Self::Plain(stream)
    }

    /// Wraps a TLS stream.
    pub fn tls(stream: TlsStream<TcpStream>) -> Self {
        Self::Tls(Box::new(stream))
    }

    /// Upgrades a plaintext stream to TLS (the STARTTLS path).
    pub async fn upgrade_to_tls(self, host: &str) -> Result<Self> {
        match self {
            Self::Plain(tcp) => {
                let connector = tls_connector()?;
                let server_name = ServerName::try_from(host.to_string())?;
                let tls = connector.connect(server_name, tcp).await?;
                Ok(Self::Tls(Box::new(tls)))
            }
            Self::Tls(_) => Err(Error::InvalidState("stream is already TLS".to_string())),
        }
    }

    /// Returns true if the stream is encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
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

/// Builds a TLS connector with the bundled webpki roots.
pub fn tls_connector() -> Result<TlsConnector> {
    let root_store = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Connects according to the configuration's security mode.
///
/// `StartTls` connects in plaintext; the upgrade happens after the
/// STARTTLS command succeeds.
pub async fn connect(config: &Config) -> Result<ImapStream> {
    let addr = format!("{}:{}", config.host, config.port);
    let tcp = timeout(config.connect_timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| Error::Timeout(config.connect_timeout))??;

    match config.security {
        super::config::Security::Implicit => {
            let connector = tls_connector()?;
            let server_name = ServerName::try_from(config.host.clone())?;
            let tls = timeout(config.connect_timeout, connector.connect(server_name, tcp))
                .await
                .map_err(|_| Error::Timeout(config.connect_timeout))??;
            Ok(ImapStream::tls(tls))
        }
        super::config::Security::StartTls | super::config::Security::None => {
            Ok(ImapStream::plain(tcp))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_connector_builds() {
        assert!(tls_connector().is_ok());
    }
}
