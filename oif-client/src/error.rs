//! Client error types.

use oif_protocol::{ErrorCode, ModelMismatch, ProtocolError, ServerError};
use thiserror::Error;

/// Result type alias using [`ClientError`].
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(ProtocolError),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("not connected")]
    NotConnected,

    #[error("already connected")]
    AlreadyConnected,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("session closed")]
    SessionClosed,

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    ModelMismatch(#[from] ModelMismatch),

    #[error("unexpected reply to {command}: {reply:?}")]
    UnexpectedReply {
        command: &'static str,
        reply: String,
    },
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Server(err) => ClientError::Server(err),
            ProtocolError::ModelMismatch(err) => ClientError::ModelMismatch(err),
            other => ClientError::Protocol(other),
        }
    }
}

impl ClientError {
    /// Returns whether repeating the operation, possibly on a new
    /// connection, might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Io(_) => true,
            ClientError::Timeout(_) => true,
            ClientError::ConnectionClosed => true,
            ClientError::Server(err) => err.code.is_retryable(),
            _ => false,
        }
    }

    /// Returns whether the stream can no longer carry commands.
    ///
    /// An oversized line counts: its tail is still in flight, so later
    /// replies cannot be told apart from it.
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            ClientError::Io(_)
                | ClientError::ConnectionClosed
                | ClientError::Protocol(ProtocolError::LineTooLong { .. })
        )
    }

    /// Returns the controller's error code, if this is a server error.
    pub fn server_code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Server(err) => Some(err.code),
            _ => None,
        }
    }
}
