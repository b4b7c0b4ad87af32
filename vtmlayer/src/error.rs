//! Tile fetch error.

use thiserror::Error;

use crate::decoder::DecodeError;
use crate::transport::{ConfigError, ConnectError, ProtocolError};

/// Why a tile fetch produced no result.
///
/// Every variant concerns a single tile; none of them leave the session
/// unusable.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Connection error: {0}")]
    Connect(#[from] ConnectError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl FetchError {
    /// Whether the failure leaves the connection in an unknown state.
    ///
    /// A payload that was fully read but failed to decode does not; a
    /// payload cut short by the peer does.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Config(_) => false,
            Self::Connect(_) | Self::Protocol(_) => true,
            Self::Decode(DecodeError::Io(_) | DecodeError::Truncated { .. }) => true,
            Self::Decode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_transport_classification() {
        assert!(FetchError::from(ProtocolError::TruncatedHeader).is_transport());
        assert!(FetchError::from(ConnectError::Dns {
            host: "x".into()
        })
        .is_transport());
        assert!(FetchError::from(DecodeError::Truncated {
            expected: 10,
            received: 2
        })
        .is_transport());
        assert!(
            FetchError::from(DecodeError::Io(io::Error::new(io::ErrorKind::Other, "x")))
                .is_transport()
        );
        assert!(!FetchError::from(DecodeError::MissingTags).is_transport());
    }

    #[test]
    fn test_display_wraps_inner() {
        let err = FetchError::from(DecodeError::VersionMismatch {
            expected: 4,
            found: 5,
        });
        assert_eq!(
            err.to_string(),
            "Decode error: Unsupported tile version 5 (expected 4)"
        );
    }
}
