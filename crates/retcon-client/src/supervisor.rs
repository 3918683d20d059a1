//! One-shot connection lifecycle: dial, handshake, single reply, close.

use crate::target::ConnectionTarget;
use crate::transport::{FrameKind, Transport};
use log::{debug, info, warn};
use retcon_config::ConfigRegistry;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Token sent as the first and only client frame.
pub const HANDSHAKE_PAYLOAD: &str = "OK+OK";

/// Lifecycle state of the connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Dialing,
    Connected,
    Exchanging,
    /// Sequence completed, including a failed closing handshake.
    Closed,
    /// Dial, send or receive failed. Terminal.
    Failed,
}

/// Observable step of the attempt; `Display` renders the log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,
    DialFailed(String),
    Sent { payload: String, kind: FrameKind },
    SendFailed(String),
    Received { payload: String, kind: FrameKind },
    ReceiveFailed(String),
    Closed,
    CloseFailed(String),
    /// The connection task ended without reporting.
    Aborted,
}

impl SessionEvent {
    fn is_failure(&self) -> bool {
        matches!(
            self,
            SessionEvent::DialFailed(_)
                | SessionEvent::SendFailed(_)
                | SessionEvent::ReceiveFailed(_)
                | SessionEvent::CloseFailed(_)
                | SessionEvent::Aborted
        )
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Connected => f.write_str("connected"),
            SessionEvent::DialFailed(err) => write!(f, "can not connect: {err}"),
            SessionEvent::Sent { payload, kind } => write!(f, "send: {payload}, type: {kind}"),
            SessionEvent::SendFailed(err) => write!(f, "can not send: {err}"),
            SessionEvent::Received { payload, kind } => {
                write!(f, "receive: {payload}, type: {kind}")
            }
            SessionEvent::ReceiveFailed(err) => write!(f, "can not receive: {err}"),
            SessionEvent::Closed => f.write_str("closed"),
            SessionEvent::CloseFailed(err) => write!(f, "can not close: {err}"),
            SessionEvent::Aborted => f.write_str("connection task aborted"),
        }
    }
}

/// Outcome of a connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// URL that was dialed.
    pub url: String,
    /// Terminal state: `Closed` or `Failed`.
    pub state: SessionState,
    /// Events in the order they happened.
    pub events: Vec<SessionEvent>,
}

impl SessionReport {
    /// Whether the exchange completed (a failed close still counts).
    pub fn succeeded(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// Reply payload, if one was received.
    pub fn reply(&self) -> Option<&str> {
        self.events.iter().find_map(|event| match event {
            SessionEvent::Received { payload, .. } => Some(payload.as_str()),
            _ => None,
        })
    }
}

/// Single-use completion signal for a started supervisor.
///
/// Released exactly once, on every exit path of the attempt. Awaiting it is
/// optional; dropping it does not cancel the attempt.
#[derive(Debug)]
pub struct Completion {
    url: String,
    receiver: oneshot::Receiver<SessionReport>,
}

impl Completion {
    /// URL being dialed.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wait for the attempt to finish.
    pub async fn wait(self) -> SessionReport {
        match self.receiver.await {
            Ok(report) => report,
            Err(_) => {
                warn!("connection task dropped its completion (url={})", self.url);
                SessionReport {
                    url: self.url,
                    state: SessionState::Failed,
                    events: vec![SessionEvent::Aborted],
                }
            }
        }
    }
}

/// Drives one connection attempt against the target derived from a registry.
pub struct ConnectionSupervisor {
    registry: Arc<ConfigRegistry>,
    transport: Arc<dyn Transport>,
}

impl ConnectionSupervisor {
    /// Create a supervisor; nothing is dialed until `start`.
    pub fn new(registry: Arc<ConfigRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Target the supervisor would dial with the current registry contents.
    pub fn target(&self) -> ConnectionTarget {
        ConnectionTarget::from_registry(&self.registry)
    }

    /// Spawn the attempt on the tokio runtime and return its completion.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> Completion {
        let url = self.target().url();
        info!("starting connection attempt (url={})", url);
        let (sender, receiver) = oneshot::channel();
        let transport = self.transport;
        let task_url = url.clone();
        tokio::spawn(async move {
            let report = run_session(transport.as_ref(), task_url).await;
            if sender.send(report).is_err() {
                debug!("completion receiver dropped before report");
            }
        });
        Completion { url, receiver }
    }
}

/// Bookkeeping for one attempt.
struct Session {
    url: String,
    state: SessionState,
    events: Vec<SessionEvent>,
}

impl Session {
    fn new(url: String) -> Self {
        Self {
            url,
            state: SessionState::Idle,
            events: Vec::new(),
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(
            "session state (url={}, from={:?}, to={:?})",
            self.url, self.state, next
        );
        self.state = next;
    }

    fn record(&mut self, event: SessionEvent) {
        if event.is_failure() {
            warn!("{event}");
        } else {
            info!("{event}");
        }
        self.events.push(event);
    }

    fn finish(mut self, state: SessionState) -> SessionReport {
        self.transition(state);
        SessionReport {
            url: self.url,
            state: self.state,
            events: self.events,
        }
    }

    fn fail(mut self, event: SessionEvent) -> SessionReport {
        self.record(event);
        self.finish(SessionState::Failed)
    }
}

async fn run_session(transport: &dyn Transport, url: String) -> SessionReport {
    let mut session = Session::new(url);

    session.transition(SessionState::Dialing);
    let mut connection = match transport.dial(&session.url).await {
        Ok(connection) => connection,
        Err(err) => return session.fail(SessionEvent::DialFailed(err.reason())),
    };
    session.transition(SessionState::Connected);
    session.record(SessionEvent::Connected);

    // On send/receive failure the connection is dropped without a close handshake.
    if let Err(err) = connection.write_text(HANDSHAKE_PAYLOAD).await {
        return session.fail(SessionEvent::SendFailed(err.reason()));
    }
    session.record(SessionEvent::Sent {
        payload: HANDSHAKE_PAYLOAD.to_string(),
        kind: FrameKind::Text,
    });
    session.transition(SessionState::Exchanging);

    let frame = match connection.read_frame().await {
        Ok(frame) => frame,
        Err(err) => return session.fail(SessionEvent::ReceiveFailed(err.reason())),
    };
    session.record(SessionEvent::Received {
        payload: frame.payload_text(),
        kind: frame.kind,
    });

    match connection.close().await {
        Ok(()) => session.record(SessionEvent::Closed),
        Err(err) => session.record(SessionEvent::CloseFailed(err.reason())),
    }
    session.finish(SessionState::Closed)
}
