use async_trait::async_trait;
use parking_lot::Mutex;
use retcon_client::{Connection, Frame, Transport, TransportError};
use std::sync::Arc;

/// Call observed by a `ScriptedTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Dial(String),
    Write(String),
    Read,
    Close,
    /// The connection was dropped.
    Dropped,
}

#[derive(Debug, Clone)]
enum Reply {
    Frame(Frame),
    Error(TransportError),
    /// Never resolves.
    Silent,
}

#[derive(Debug, Clone)]
struct Script {
    dial: Option<TransportError>,
    write: Option<TransportError>,
    reply: Reply,
    close: Option<TransportError>,
}

/// Transport that plays back a fixed script and records every call.
///
/// Clones share the call log.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    script: Script,
    calls: Arc<Mutex<Vec<TransportCall>>>,
}

impl ScriptedTransport {
    /// Every step succeeds and the server answers with `frame`.
    pub fn replying(frame: Frame) -> Self {
        Self {
            script: Script {
                dial: None,
                write: None,
                reply: Reply::Frame(frame),
                close: None,
            },
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_dial(message: impl Into<String>) -> Self {
        let mut transport = Self::replying(Frame::text("PONG"));
        transport.script.dial = Some(TransportError::Dial(message.into()));
        transport
    }

    pub fn failing_write(message: impl Into<String>) -> Self {
        let mut transport = Self::replying(Frame::text("PONG"));
        transport.script.write = Some(TransportError::Send(message.into()));
        transport
    }

    pub fn failing_read(error: TransportError) -> Self {
        let mut transport = Self::replying(Frame::text("PONG"));
        transport.script.reply = Reply::Error(error);
        transport
    }

    /// The server never answers.
    pub fn silent() -> Self {
        let mut transport = Self::replying(Frame::text("PONG"));
        transport.script.reply = Reply::Silent;
        transport
    }

    pub fn with_close_error(mut self, message: impl Into<String>) -> Self {
        self.script.close = Some(TransportError::Close(message.into()));
        self
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn dial(&self, url: &str) -> Result<Box<dyn Connection>, TransportError> {
        self.calls.lock().push(TransportCall::Dial(url.to_string()));
        if let Some(err) = self.script.dial.clone() {
            return Err(err);
        }
        Ok(Box::new(ScriptedConnection {
            script: self.script.clone(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct ScriptedConnection {
    script: Script,
    calls: Arc<Mutex<Vec<TransportCall>>>,
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn write_text(&mut self, payload: &str) -> Result<(), TransportError> {
        self.calls
            .lock()
            .push(TransportCall::Write(payload.to_string()));
        match self.script.write.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn read_frame(&mut self) -> Result<Frame, TransportError> {
        self.calls.lock().push(TransportCall::Read);
        match self.script.reply.clone() {
            Reply::Frame(frame) => Ok(frame),
            Reply::Error(err) => Err(err),
            Reply::Silent => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.calls.lock().push(TransportCall::Close);
        match self.script.close.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        self.calls.lock().push(TransportCall::Dropped);
    }
}
