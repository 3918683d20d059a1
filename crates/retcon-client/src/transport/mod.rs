//! Transport seam: dial, single-frame write/read, close.

mod ws;

pub use ws::WsTransport;

use crate::TransportError;
use async_trait::async_trait;
use std::fmt;

/// Opcode class of a received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Binary,
    Ping,
    Pong,
    Close,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FrameKind::Text => "Text",
            FrameKind::Binary => "Binary",
            FrameKind::Ping => "Ping",
            FrameKind::Pong => "Pong",
            FrameKind::Close => "Close",
        };
        f.write_str(label)
    }
}

/// A single frame read from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Text frame carrying `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Text,
            payload: text.into().into_bytes(),
        }
    }

    /// Payload rendered as text, replacing invalid UTF-8.
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Opens connections to a websocket endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dial `url` and complete the websocket upgrade.
    async fn dial(&self, url: &str) -> Result<Box<dyn Connection>, TransportError>;
}

/// An open client connection.
///
/// Dropping a connection without `close` tears the socket down without a
/// closing handshake.
#[async_trait]
pub trait Connection: Send {
    /// Write one text frame.
    async fn write_text(&mut self, payload: &str) -> Result<(), TransportError>;

    /// Block until the next server frame of any opcode.
    async fn read_frame(&mut self) -> Result<Frame, TransportError>;

    /// Perform the closing handshake.
    async fn close(&mut self) -> Result<(), TransportError>;
}
