//! Error types for the Vigil client

use std::time::Duration;

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the source services or the sink
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not open a connection (refused, unreachable, reset during connect)
    #[error("Connection to {addr} failed: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A connect, read or write did not finish in time
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O failure on an established connection
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer sent something that does not follow the framing
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The source answered with an `ERROR:` line
    #[error("Source reported error: {0}")]
    Remote(String),

    /// The peer closed before the declared body length arrived
    #[error("Partial transfer: received {received} of {expected} bytes")]
    PartialTransfer {
        /// Declared body length
        expected: u64,
        /// Bytes received before the peer closed
        received: u64,
    },

    /// A JSON reply could not be decoded
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// HTTP request to the sink failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The sink answered with something other than 201 Created
    #[error("Sink rejected record (status {status}): {message}")]
    SinkRejected {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },
}

impl ClientError {
    /// Create a sink rejection from status code and body
    pub fn sink_rejected(status: u16, message: impl Into<String>) -> Self {
        Self::SinkRejected {
            status,
            message: message.into(),
        }
    }

    /// Check if the peer violated the wire format or refused the request
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::Protocol(_) | Self::Remote(_) | Self::ParseError(_)
        )
    }

    /// Check if this error is a network-level failure
    ///
    /// These are the conditions a later attempt can reasonably be expected
    /// to get past.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. }
            | Self::Timeout(_)
            | Self::Io(_)
            | Self::PartialTransfer { .. }
            | Self::RequestFailed(_) => true,
            Self::SinkRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(ClientError::Protocol("bad".into()).is_protocol_error());
        assert!(ClientError::Remote("Imagen no encontrada".into()).is_protocol_error());
        assert!(!ClientError::Timeout(Duration::from_secs(5)).is_protocol_error());

        let partial = ClientError::PartialTransfer {
            expected: 1000,
            received: 500,
        };
        assert!(partial.is_transient());
        assert_eq!(
            partial.to_string(),
            "Partial transfer: received 500 of 1000 bytes"
        );

        assert!(ClientError::sink_rejected(503, "").is_transient());
        assert!(!ClientError::sink_rejected(400, "missing field").is_transient());
    }
}
