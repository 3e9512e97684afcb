//! High-level error types

use scalewire_core::Protocol;
use scalewire_types::{ReadError, ReadErrorKind};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] scalewire_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] scalewire_transport::Error),

    #[error("Configuration error: {0}")]
    Types(#[from] scalewire_types::Error),

    #[error("Scale already connected")]
    AlreadyConnected,

    #[error("Scale not connected")]
    NotConnected,

    #[error("Cannot change protocol from {current} to {requested} while connected")]
    ProtocolLocked {
        current: Protocol,
        requested: Protocol,
    },
}

impl Error {
    /// Check if this is session misuse rather than a read failure
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::AlreadyConnected | Self::NotConnected | Self::ProtocolLocked { .. }
        )
    }

    /// Convert a read-path failure into the payload of an error reading
    pub fn to_read_error(&self) -> ReadError {
        let kind = match self {
            Self::Core(e) if e.is_decode_failure() => ReadErrorKind::Format,
            _ => ReadErrorKind::Transport,
        };
        ReadError::new(kind, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_kind() {
        let format = Error::Core(scalewire_core::Error::ResponseTooShort {
            expected: 6,
            actual: 2,
        });
        assert_eq!(format.to_read_error().kind, ReadErrorKind::Format);

        let transport = Error::Transport(scalewire_transport::Error::ConnectionClosed);
        assert_eq!(transport.to_read_error().kind, ReadErrorKind::Transport);
    }

    #[test]
    fn test_lifecycle_errors() {
        assert!(Error::NotConnected.is_lifecycle());
        assert!(
            Error::ProtocolLocked {
                current: Protocol::Toledo,
                requested: Protocol::Filizola,
            }
            .is_lifecycle()
        );
        assert!(!Error::Transport(scalewire_transport::Error::ConnectionClosed).is_lifecycle());
    }
}
