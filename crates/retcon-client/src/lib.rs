//! One-shot websocket handshake client driven by a `ConfigRegistry`.
//!
//! The supervisor derives its target from registry values, dials once,
//! sends a fixed handshake token, reads a single reply, closes, and
//! reports the outcome through a completion future.

mod error;
mod supervisor;
mod target;
mod transport;

pub use error::TransportError;
pub use supervisor::{
    Completion, ConnectionSupervisor, HANDSHAKE_PAYLOAD, SessionEvent, SessionReport,
    SessionState,
};
pub use target::{
    APP_ID_KEY, ConnectionTarget, DEFAULT_SCHEME, HOST_KEY, SCHEME_KEY, declare_target_keys,
};
pub use transport::{Connection, Frame, FrameKind, Transport, WsTransport};
