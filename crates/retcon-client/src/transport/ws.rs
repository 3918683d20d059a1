//! Websocket transport backed by `tokio-tungstenite`.

use super::{Connection, Frame, FrameKind, Transport};
use crate::TransportError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use log::debug;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Plain websocket transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsTransport;

impl WsTransport {
    /// Create a new websocket transport.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn dial(&self, url: &str) -> Result<Box<dyn Connection>, TransportError> {
        debug!("dialing websocket (url={})", url);
        let (stream, response) = connect_async(url)
            .await
            .map_err(|err| TransportError::Dial(err.to_string()))?;
        debug!(
            "websocket upgrade complete (url={}, status={})",
            url,
            response.status()
        );
        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn write_text(&mut self, payload: &str) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(payload.to_string()))
            .await
            .map_err(|err| TransportError::Send(err.to_string()))
    }

    async fn read_frame(&mut self) -> Result<Frame, TransportError> {
        match self.stream.next().await {
            Some(Ok(message)) => Ok(frame_from_message(message)),
            Some(Err(err)) => Err(TransportError::Receive(err.to_string())),
            None => Err(TransportError::ConnectionClosed),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .close(None)
            .await
            .map_err(|err| TransportError::Close(err.to_string()))
    }
}

fn frame_from_message(message: Message) -> Frame {
    let (kind, payload) = match message {
        Message::Text(text) => (FrameKind::Text, text.into_bytes()),
        Message::Binary(data) => (FrameKind::Binary, data),
        Message::Ping(data) => (FrameKind::Ping, data),
        Message::Pong(data) => (FrameKind::Pong, data),
        Message::Close(frame) => (
            FrameKind::Close,
            frame
                .map(|frame| frame.reason.into_owned().into_bytes())
                .unwrap_or_default(),
        ),
        Message::Frame(frame) => (FrameKind::Binary, frame.into_data()),
    };
    Frame { kind, payload }
}
