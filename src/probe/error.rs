use std::io;

use thiserror::Error;

/// Failures below the protocol level, or a session the server refused to
/// set up. Never confused with a recipient rejection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("{stage} refused with {code}: {text}")]
    Refused {
        stage: &'static str,
        code: u16,
        text: String,
    },
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Connect { source, .. } | Self::Io { source } => matches!(
                source.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// Status code returned by the server, when the failure carried one.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Refused { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}
