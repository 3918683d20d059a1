//! Error types for transport operations.

use thiserror::Error;

/// Failures of the single connection attempt. None of them are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Opening the socket or the websocket upgrade failed.
    #[error("dial failed: {0}")]
    Dial(String),
    /// Writing a frame failed.
    #[error("send failed: {0}")]
    Send(String),
    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    Receive(String),
    /// The closing handshake failed.
    #[error("close failed: {0}")]
    Close(String),
    /// The peer closed the stream before a frame arrived.
    #[error("connection closed by peer")]
    ConnectionClosed,
}

impl TransportError {
    /// Underlying cause without the operation prefix.
    pub fn reason(&self) -> String {
        match self {
            TransportError::Dial(reason)
            | TransportError::Send(reason)
            | TransportError::Receive(reason)
            | TransportError::Close(reason) => reason.clone(),
            TransportError::ConnectionClosed => self.to_string(),
        }
    }
}
