//! Connection lifecycle tests against a scripted transport.

use pretty_assertions::assert_eq;
use retcon_client::{
    ConnectionSupervisor, Frame, FrameKind, HANDSHAKE_PAYLOAD, SessionEvent, SessionState,
    TransportError, declare_target_keys,
};
use retcon_config::ConfigRegistry;
use retcon_test_utils::{ScriptedTransport, StaticSource, TransportCall};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn local_registry() -> Arc<ConfigRegistry> {
    let registry = ConfigRegistry::new();
    declare_target_keys(&registry);
    registry.load(&[StaticSource::new(
        "file",
        10,
        json!({ "host": "localhost", "appId": "t1" }),
    )
    .boxed()]);
    Arc::new(registry)
}

fn supervisor(transport: &ScriptedTransport) -> ConnectionSupervisor {
    ConnectionSupervisor::new(local_registry(), Arc::new(transport.clone()))
}

#[tokio::test]
async fn full_exchange_reports_each_step() {
    let transport = ScriptedTransport::replying(Frame::text("PONG"));
    let report = supervisor(&transport).start().wait().await;

    assert_eq!(report.url, "ws://localhost/ws/t1");
    assert_eq!(report.state, SessionState::Closed);
    assert_eq!(
        report.events,
        vec![
            SessionEvent::Connected,
            SessionEvent::Sent {
                payload: HANDSHAKE_PAYLOAD.to_string(),
                kind: FrameKind::Text,
            },
            SessionEvent::Received {
                payload: "PONG".to_string(),
                kind: FrameKind::Text,
            },
            SessionEvent::Closed,
        ]
    );
    assert_eq!(report.reply(), Some("PONG"));
    assert!(report.succeeded());
    assert_eq!(
        transport.calls(),
        vec![
            TransportCall::Dial("ws://localhost/ws/t1".to_string()),
            TransportCall::Write("OK+OK".to_string()),
            TransportCall::Read,
            TransportCall::Close,
            TransportCall::Dropped,
        ]
    );
}

#[tokio::test]
async fn event_lines_match_log_output() {
    let transport = ScriptedTransport::replying(Frame::text("PONG"));
    let report = supervisor(&transport).start().wait().await;
    let lines = report
        .events
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            "connected",
            "send: OK+OK, type: Text",
            "receive: PONG, type: Text",
            "closed",
        ]
    );
}

#[tokio::test]
async fn dial_failure_skips_exchange() {
    let transport = ScriptedTransport::failing_dial("connection refused");
    let report = supervisor(&transport).start().wait().await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(
        report.events,
        vec![SessionEvent::DialFailed("connection refused".to_string())]
    );
    assert_eq!(
        report.events[0].to_string(),
        "can not connect: connection refused"
    );
    assert_eq!(
        transport.calls(),
        vec![TransportCall::Dial("ws://localhost/ws/t1".to_string())]
    );
}

#[tokio::test]
async fn send_failure_drops_connection_without_close() {
    let transport = ScriptedTransport::failing_write("broken pipe");
    let report = supervisor(&transport).start().wait().await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(
        report.events,
        vec![
            SessionEvent::Connected,
            SessionEvent::SendFailed("broken pipe".to_string()),
        ]
    );
    assert_eq!(report.events[1].to_string(), "can not send: broken pipe");
    assert_eq!(
        transport.calls(),
        vec![
            TransportCall::Dial("ws://localhost/ws/t1".to_string()),
            TransportCall::Write("OK+OK".to_string()),
            TransportCall::Dropped,
        ]
    );
}

#[tokio::test]
async fn receive_failure_is_terminal() {
    let transport = ScriptedTransport::failing_read(TransportError::ConnectionClosed);
    let report = supervisor(&transport).start().wait().await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(
        report.events.last(),
        Some(&SessionEvent::ReceiveFailed(
            "connection closed by peer".to_string()
        ))
    );
    assert!(!transport.calls().contains(&TransportCall::Close));
    assert_eq!(report.reply(), None);
}

#[tokio::test]
async fn close_failure_keeps_closed_outcome() {
    let transport = ScriptedTransport::replying(Frame {
        kind: FrameKind::Binary,
        payload: b"raw".to_vec(),
    })
    .with_close_error("reset by peer");
    let report = supervisor(&transport).start().wait().await;

    assert_eq!(report.state, SessionState::Closed);
    assert!(report.succeeded());
    assert_eq!(
        report.events.last(),
        Some(&SessionEvent::CloseFailed("reset by peer".to_string()))
    );
    assert_eq!(
        report.events[2].to_string(),
        "receive: raw, type: Binary"
    );
}

#[tokio::test]
async fn silent_server_keeps_completion_pending() {
    let transport = ScriptedTransport::silent();
    let completion = supervisor(&transport).start();
    let waited = tokio::time::timeout(Duration::from_millis(50), completion.wait()).await;
    assert!(waited.is_err());
    assert_eq!(transport.calls().last(), Some(&TransportCall::Read));
}

#[tokio::test]
async fn dropped_completion_does_not_cancel_attempt() {
    let transport = ScriptedTransport::replying(Frame::text("PONG"));
    drop(supervisor(&transport).start());

    for _ in 0..100 {
        if transport.calls().contains(&TransportCall::Close) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("attempt did not finish: {:?}", transport.calls());
}

#[tokio::test]
async fn missing_target_keys_still_dial_derived_url() {
    let transport = ScriptedTransport::failing_dial("invalid url");
    let registry = Arc::new(ConfigRegistry::new());
    let supervisor = ConnectionSupervisor::new(registry, Arc::new(transport.clone()));
    assert_eq!(supervisor.target().url(), "ws:///ws/");

    let completion = supervisor.start();
    assert_eq!(completion.url(), "ws:///ws/");
    let report = completion.wait().await;
    assert_eq!(report.state, SessionState::Failed);
}
