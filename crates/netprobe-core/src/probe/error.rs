use std::io;

use thiserror::Error;

use crate::locale::{MessageKey, Translate};

/// Errors returned by the probe engine, one variant per failure category.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),
    #[error("tcp connection failed: {0}")]
    TcpConnect(#[source] io::Error),
    #[error("udp address resolution failed: {0}")]
    ResolveUdp(#[source] io::Error),
    #[error("udp connection failed: {0}")]
    UdpConnect(#[source] io::Error),
    #[error("send failed: {0}")]
    SendData(#[source] io::Error),
    #[error("read failed: {0}")]
    ReadData(#[source] io::Error),
}

impl ProbeError {
    pub fn key(&self) -> MessageKey {
        match self {
            ProbeError::UnsupportedProtocol(_) => MessageKey::UnsupportedProtocol,
            ProbeError::TcpConnect(_) => MessageKey::TcpConnectionFailed,
            ProbeError::ResolveUdp(_) => MessageKey::ResolveUdpFailed,
            ProbeError::UdpConnect(_) => MessageKey::UdpConnectionFailed,
            ProbeError::SendData(_) => MessageKey::SendDataFailed,
            ProbeError::ReadData(_) => MessageKey::ReadDataFailed,
        }
    }

    /// `"<localized category>: <detail>"`.
    pub fn localize<T: Translate + ?Sized>(&self, tr: &T) -> String {
        let prefix = tr.message(self.key());
        match self {
            ProbeError::UnsupportedProtocol(name) => format!("{prefix}: {name}"),
            ProbeError::TcpConnect(err)
            | ProbeError::ResolveUdp(err)
            | ProbeError::UdpConnect(err)
            | ProbeError::SendData(err)
            | ProbeError::ReadData(err) => format!("{prefix}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Catalog;

    #[test]
    fn localized_message_has_category_prefix() {
        let catalog = Catalog::with_language("en-US");
        let err = ProbeError::TcpConnect(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert_eq!(
            err.localize(&catalog),
            "TCP connection failed: connection refused"
        );
    }

    #[test]
    fn unsupported_protocol_names_the_protocol() {
        let catalog = Catalog::with_language("en-US");
        let err = ProbeError::UnsupportedProtocol("sctp".to_string());
        assert_eq!(err.localize(&catalog), "Unsupported protocol: sctp");
        assert_eq!(err.key(), MessageKey::UnsupportedProtocol);
    }
}
